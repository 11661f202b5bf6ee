use std::{fs::File, path::Path};

use anyhow::Context as _;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use twenty_fourty_eight_engine::{
    Game, GameConfig,
    config::{DEFAULT_DIMENSION, DEFAULT_THRESHOLD},
    terminal::{self, Hud},
};

/// Play 2048 in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Side length of the board
    #[arg(short, long, default_value_t = DEFAULT_DIMENSION)]
    dimension: usize,

    /// Tile value that wins the game
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: u32,

    /// Best score from previous sessions
    #[arg(long, default_value_t = 0)]
    highest_score: u64,

    /// Seed for tile placement, random if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs (filtered by RUST_LOG) to this file. The game owns the terminal, so
    /// nothing is logged without it.
    #[arg(long)]
    log_file: Option<std::path::PathBuf>,
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let config = GameConfig::new(args.dimension, args.threshold, args.highest_score);
    let mut game = Game::new(&config, Hud::default()).context("invalid game settings")?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    log::debug!("starting {config:?}");

    let highest = terminal::play(&mut game, &mut rng).context("terminal session failed")?;
    println!("highest score: {highest}");

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["2048"]).unwrap();
        assert_eq!(args.dimension, DEFAULT_DIMENSION);
        assert_eq!(args.threshold, DEFAULT_THRESHOLD);
        assert_eq!(args.log_file, None);
    }

    #[test]
    fn test_args_log_file() {
        let args = Args::try_parse_from(["2048", "-d", "5", "--log-file", "game.log"]).unwrap();
        assert_eq!(args.dimension, 5);
        assert_eq!(args.log_file.as_deref(), Some(Path::new("game.log")));
    }

    #[test]
    fn test_no_log_file_skips_logger() {
        assert!(init_logging(None).is_ok());
    }
}
