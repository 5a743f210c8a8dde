use super::*;
use clap::Parser;
use std::time::Duration;

/// Command-line flags for the `setgame` binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Real-time set matching with threaded players", long_about = None)]
pub struct Args {
    #[arg(long, default_value_t = 4, help = "Total players")]
    pub players: usize,
    #[arg(long, default_value_t = 0, help = "Players driven by the keyboard, counted from P0")]
    pub humans: usize,
    #[arg(long, default_value_t = TABLE_SIZE, help = "Slots on the board")]
    pub table: usize,
    #[arg(long, default_value_t = DECK_SIZE, help = "Cards in the deck")]
    pub deck: usize,
    #[arg(long, default_value_t = SET_SIZE, help = "Cards per set")]
    pub set: usize,
    #[arg(long, default_value_t = FEATURE_SIZE, help = "Values per card feature")]
    pub feature_size: usize,
    #[arg(long, default_value_t = FEATURE_COUNT, help = "Features per card")]
    pub feature_count: usize,
    #[arg(long, default_value_t = 60_000, help = "Round length in milliseconds")]
    pub timeout_ms: u64,
    #[arg(long, default_value_t = 5_000, help = "Low-time warning threshold in milliseconds")]
    pub warning_ms: u64,
    #[arg(long, default_value_t = 1_000, help = "Freeze after a set, in milliseconds")]
    pub point_ms: u64,
    #[arg(long, default_value_t = 3_000, help = "Freeze after a wrong set, in milliseconds")]
    pub penalty_ms: u64,
    #[arg(long, default_value_t = 100, help = "Pause between card moves, in milliseconds")]
    pub delay_ms: u64,
    #[arg(long, default_value_t = 1_000, help = "Countdown resolution in milliseconds")]
    pub tick_ms: u64,
    #[arg(long, help = "Log the sets on the board after every deal")]
    pub hints: bool,
    #[arg(long, help = "Seed for reproducible shuffles")]
    pub seed: Option<u64>,
}

impl TryFrom<Args> for Config {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> anyhow::Result<Self> {
        let config = Config {
            table_size: args.table,
            deck_size: args.deck,
            set_size: args.set,
            feature_size: args.feature_size,
            feature_count: args.feature_count,
            players: args.players,
            humans: args.humans,
            turn_timeout: Duration::from_millis(args.timeout_ms),
            turn_warning: Duration::from_millis(args.warning_ms),
            point_freeze: Duration::from_millis(args.point_ms),
            penalty_freeze: Duration::from_millis(args.penalty_ms),
            table_delay: Duration::from_millis(args.delay_ms),
            tick: Duration::from_millis(args.tick_ms),
            hints: args.hints,
            seed: args.seed,
        };
        config.validate_classic()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(flags: &[&str]) -> anyhow::Result<Config> {
        let args = Args::try_parse_from(std::iter::once("setgame").chain(flags.iter().copied()))?;
        Config::try_from(args)
    }

    #[test]
    fn defaults_match_config() {
        assert_eq!(parse(&[]).unwrap(), Config::default());
    }
    #[test]
    fn flags_override() {
        let config = parse(&["--players", "2", "--humans", "2", "--tick-ms", "250", "--seed", "9", "--hints"])
            .unwrap();
        assert_eq!(config.players, 2);
        assert_eq!(config.humans, 2);
        assert_eq!(config.tick, Duration::from_millis(250));
        assert_eq!(config.seed, Some(9));
        assert!(config.hints);
    }
    #[test]
    fn rejects_inconsistent_flags() {
        assert!(parse(&["--humans", "5"]).is_err());
        assert!(parse(&["--deck", "82"]).is_err());
        assert!(parse(&["--set", "4"]).is_err());
        assert!(parse(&["--tick-ms", "0"]).is_err());
        assert!(parse(&["--players", "many"]).is_err());
    }
}
