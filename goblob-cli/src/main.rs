//! Headless driver for the goblob engine.
//!
//! - `goblob suggest <record>` - best move for the player to move in a JSON game record
//! - `goblob selfplay` - play the search against itself and print the final board
//! - `goblob reconcile <local> <incoming>` - merge an incoming record into a local one

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use goblob_engine::{
    BoardSize, GameConfiguration, GameController, GamePhase, GameRecord, GameType, GoError, Player,
    SearchConfig,
};

#[derive(Parser)]
#[command(name = "goblob")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest a move for the player to move in a record (`-` reads stdin)
    Suggest {
        record: PathBuf,
        /// Id of the player on this device
        #[arg(long, default_value = "local")]
        player: String,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Let the search play both colors until the game is scored
    Selfplay {
        #[arg(long, default_value_t = 9)]
        size: u8,
        #[arg(long, default_value_t = 0)]
        handicap: u8,
        #[arg(long, default_value_t = goblob_engine::config::DEFAULT_KOMI)]
        komi: f64,
        /// Print the final record as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Merge an incoming record into a local one and print the result
    Reconcile {
        local: PathBuf,
        incoming: PathBuf,
        /// Id of the player on this device
        #[arg(long)]
        player: String,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Playouts per search, shared by all candidates
    #[arg(long, default_value_t = 1000)]
    iterations: usize,
    #[arg(long)]
    seed: Option<u64>,
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        let mut config = SearchConfig::default();
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goblob_engine=info,goblob_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Suggest {
            record,
            player,
            search,
        } => suggest(&record, &player, &search),
        Commands::Selfplay {
            size,
            handicap,
            komi,
            json,
            search,
        } => selfplay(size, handicap, komi, json, &search),
        Commands::Reconcile {
            local,
            incoming,
            player,
        } => reconcile(&local, &incoming, &player),
    }
}

fn read_record(path: &Path) -> anyhow::Result<GameRecord> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read record from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("invalid record in {}", path.display()))
}

fn suggest(path: &Path, player: &str, search: &SearchArgs) -> anyhow::Result<()> {
    let record = read_record(path)?;
    let controller = GameController::from_record(player, record)?.with_search(search.config());
    let mv = controller.suggest_move(search.iterations)?;
    println!("{mv}");
    Ok(())
}

fn selfplay(
    size: u8,
    handicap: u8,
    komi: f64,
    json: bool,
    search: &SearchArgs,
) -> anyhow::Result<()> {
    let Some(board_size) = BoardSize::from_int(size) else {
        bail!("unsupported board size {size}, expected one of 5, 9, 13, 19");
    };
    let config = GameConfiguration::new(
        board_size,
        GameType::Local,
        Player::new("black", "Black"),
        Player::new("white", "White"),
    )
    .with_handicap(handicap)
    .with_komi(komi);
    let mut game = GameController::new("black", "selfplay", config)?.with_search(search.config());

    while game.mode() == GamePhase::InGame {
        let mv = game.suggest_move(search.iterations)?;
        tracing::info!(turn = game.history().len() + 1, color = %game.current_color(), %mv, "move");
        match game.play_move(mv) {
            Ok(()) => {}
            Err(err @ GoError::HistoryFull { .. }) => {
                bail!("game did not end: {err}");
            }
            Err(err) => return Err(err.into()),
        }
    }

    // Both sides accept an empty marking.
    game.marking_turn_done()?;
    game.marking_turn_done()?;
    let score = game.score()?;

    println!("{}", game.board());
    println!(
        "{} moves, Black {} White {} + {} komi: {}",
        game.history().len(),
        score.black_stones,
        score.white_stones,
        score.komi,
        score.result()
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&game.to_record())?);
    }
    Ok(())
}

fn reconcile(local: &Path, incoming: &Path, player: &str) -> anyhow::Result<()> {
    let mut game = GameController::from_record(player, read_record(local)?)?;
    let result = game
        .reconcile(read_record(incoming)?)
        .context("incoming record does not apply")?;
    eprintln!(
        "undone {} move(s), replayed {} move(s)",
        result.undone, result.replayed
    );
    println!("{}", serde_json::to_string_pretty(&game.to_record())?);
    Ok(())
}
