use std::time::Duration;

/// Outcome of judging one submission, delivered to the submitting agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Valid set. The agent scores, then sits out the freeze.
    Point(Duration),
    /// Invalid set. The agent sits out the freeze.
    Penalty(Duration),
    /// Nothing to judge any more. The agent may act again immediately.
    Release,
}

impl Verdict {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Point(d) | Self::Penalty(d) => *d,
            Self::Release => Duration::ZERO,
        }
    }
    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point(_))
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Point(d) => write!(f, "point ({:?} freeze)", d),
            Self::Penalty(d) => write!(f, "penalty ({:?} freeze)", d),
            Self::Release => write!(f, "release"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn release_has_no_duration() {
        assert_eq!(Verdict::Release.duration(), Duration::ZERO);
        assert!(!Verdict::Release.is_point());
    }
    #[test]
    fn point_and_penalty_carry_duration() {
        let d = Duration::from_secs(3);
        assert_eq!(Verdict::Point(d).duration(), d);
        assert_eq!(Verdict::Penalty(d).duration(), d);
        assert!(Verdict::Point(d).is_point());
    }
}
