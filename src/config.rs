use super::*;
use std::time::Duration;

/// Values the game core consumes. How they are loaded is up to the caller;
/// the binary fills them from command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Board capacity.
    pub table_size: usize,
    /// Cards dealt from, `0..deck_size`.
    pub deck_size: usize,
    /// Marks that complete a submission.
    pub set_size: usize,
    /// Values per feature for the classic oracle.
    pub feature_size: usize,
    /// Features per card for the classic oracle.
    pub feature_count: usize,
    /// Total agents.
    pub players: usize,
    /// Agents `0..humans` take keyboard input, the rest are autonomous.
    pub humans: usize,
    /// Round length before the board is reshuffled.
    pub turn_timeout: Duration,
    /// Countdown is flagged as low once at or below this.
    pub turn_warning: Duration,
    /// Freeze after a valid set.
    pub point_freeze: Duration,
    /// Freeze after an invalid set.
    pub penalty_freeze: Duration,
    /// Cosmetic pause between card placements and removals.
    pub table_delay: Duration,
    /// Display unit and the longest any blocking wait may last.
    pub tick: Duration,
    /// Log the sets on the board whenever it is dealt.
    pub hints: bool,
    /// Seed for the dealer's shuffles. Random when absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_size: TABLE_SIZE,
            deck_size: DECK_SIZE,
            set_size: SET_SIZE,
            feature_size: FEATURE_SIZE,
            feature_count: FEATURE_COUNT,
            players: 4,
            humans: 0,
            turn_timeout: Duration::from_secs(60),
            turn_warning: Duration::from_secs(5),
            point_freeze: Duration::from_secs(1),
            penalty_freeze: Duration::from_secs(3),
            table_delay: Duration::from_millis(100),
            tick: Duration::from_secs(1),
            hints: false,
            seed: None,
        }
    }
}

impl Config {
    /// Agents whose input comes from a key source.
    pub fn is_human(&self, id: AgentId) -> bool {
        id < self.humans
    }
    /// Size of the deck the classic oracle can describe.
    pub fn universe(&self) -> usize {
        (0..self.feature_count).fold(1usize, |n, _| n.saturating_mul(self.feature_size))
    }
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.set_size > 0, "set size must be positive");
        anyhow::ensure!(
            self.table_size >= self.set_size,
            "table of {} slots cannot hold a set of {}",
            self.table_size,
            self.set_size
        );
        anyhow::ensure!(self.players > 0, "at least one player is required");
        anyhow::ensure!(
            self.humans <= self.players,
            "{} human players exceed {} total",
            self.humans,
            self.players
        );
        anyhow::ensure!(!self.tick.is_zero(), "tick must be positive");
        anyhow::ensure!(!self.turn_timeout.is_zero(), "turn timeout must be positive");
        Ok(())
    }
    /// Checks that the deck fits the classic feature encoding.
    pub fn validate_classic(&self) -> anyhow::Result<()> {
        self.validate()?;
        anyhow::ensure!(
            self.set_size == self.feature_size,
            "classic sets need set size {} to equal feature size {}",
            self.set_size,
            self.feature_size
        );
        anyhow::ensure!(
            self.deck_size <= self.universe(),
            "deck of {} exceeds the {} distinct cards of {} features",
            self.deck_size,
            self.universe(),
            self.feature_count
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn default_is_valid() {
        let config = Config::default();
        assert!(config.validate_classic().is_ok());
        assert_eq!(config.universe(), DECK_SIZE);
    }
    #[test]
    fn rejects_more_humans_than_players() {
        let config = Config {
            humans: 5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
    #[test]
    fn rejects_table_smaller_than_set() {
        let config = Config {
            table_size: 2,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
    #[test]
    fn rejects_zero_tick() {
        let config = Config {
            tick: Duration::ZERO,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
    #[test]
    fn rejects_oversized_classic_deck() {
        let config = Config {
            deck_size: 100,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.validate_classic().is_err());
    }
    #[test]
    fn humans_come_first() {
        let config = Config {
            humans: 2,
            ..Config::default()
        };
        assert!(config.is_human(0));
        assert!(config.is_human(1));
        assert!(!config.is_human(2));
    }
}
