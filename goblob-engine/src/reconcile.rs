//! Converging a local history onto an authoritative move list.
//!
//! Remote updates carry the whole move list. Only the moves past the longest common
//! prefix are touched: local moves the incoming list does not share are undone, then the
//! incoming tail is replayed.

use crate::error::GoError;
use crate::history::GameHistory;
use crate::turn::Move;

/// How far a reconciliation had to rewind and replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reconciliation {
    pub undone: usize,
    pub replayed: usize,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.undone == 0 && self.replayed == 0
    }
}

/// Length of the longest shared prefix of two move lists.
pub fn common_prefix(a: &[Move], b: &[Move]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Make `local` hold exactly `incoming`.
///
/// A rejected replay move stops the process with `Desynchronized`; `local` then holds the
/// incoming moves up to, not including, the rejected one.
pub fn reconcile(local: &mut GameHistory, incoming: &[Move]) -> Result<Reconciliation, GoError> {
    let common = common_prefix(local.moves(), incoming);
    let undone = local.len() - common;
    for _ in 0..undone {
        local.undo()?;
    }

    for (index, &mv) in incoming.iter().enumerate().skip(common) {
        if let Err(err) = local.play(mv) {
            tracing::warn!(index, %mv, %err, "incoming move rejected, history desynchronized");
            return Err(GoError::Desynchronized { index, mv });
        }
    }

    let result = Reconciliation {
        undone,
        replayed: incoming.len() - common,
    };
    tracing::debug!(
        common,
        undone = result.undone,
        replayed = result.replayed,
        "history reconciled"
    );
    Ok(result)
}
