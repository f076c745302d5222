/// Crawl session lifecycle states
///
/// A session starts `Idle`, becomes `Running` once its frontier is loaded,
/// and ends in exactly one of the terminal states.
use std::fmt;

/// Represents the lifecycle state of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Engine constructed, nothing loaded yet
    Idle,

    /// Session loaded and pages are being processed
    Running,

    // ===== Terminal States =====
    /// Stopped at a checkpoint on request; resumable
    Paused,

    /// Frontier drained; nothing left to crawl
    Exhausted,

    /// Halted by a persistence failure
    Aborted,
}

impl CrawlState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paused | Self::Exhausted | Self::Aborted)
    }

    /// Returns true if the state machine allows `self -> to`
    pub fn can_transition_to(&self, to: CrawlState) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Paused)
                | (Self::Running, Self::Exhausted)
                | (Self::Running, Self::Aborted)
        )
    }

    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Exhausted => "exhausted",
            Self::Aborted => "aborted",
        }
    }

    /// Parses a state from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "running" => Some(Self::Running),
            "paused" => Some(Self::Paused),
            "exhausted" => Some(Self::Exhausted),
            "aborted" => Some(Self::Aborted),
            _ => None,
        }
    }

    /// Returns all possible crawl states
    pub fn all_states() -> [Self; 5] {
        [
            Self::Idle,
            Self::Running,
            Self::Paused,
            Self::Exhausted,
            Self::Aborted,
        ]
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!CrawlState::Idle.is_terminal());
        assert!(!CrawlState::Running.is_terminal());

        assert!(CrawlState::Paused.is_terminal());
        assert!(CrawlState::Exhausted.is_terminal());
        assert!(CrawlState::Aborted.is_terminal());
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(CrawlState::Idle.can_transition_to(CrawlState::Running));
        assert!(CrawlState::Running.can_transition_to(CrawlState::Paused));
        assert!(CrawlState::Running.can_transition_to(CrawlState::Exhausted));
        assert!(CrawlState::Running.can_transition_to(CrawlState::Aborted));
    }

    #[test]
    fn test_forbidden_transitions() {
        assert!(!CrawlState::Idle.can_transition_to(CrawlState::Paused));
        assert!(!CrawlState::Running.can_transition_to(CrawlState::Idle));
        assert!(!CrawlState::Running.can_transition_to(CrawlState::Running));

        for terminal in [CrawlState::Paused, CrawlState::Exhausted, CrawlState::Aborted] {
            for to in CrawlState::all_states() {
                assert!(
                    !terminal.can_transition_to(to),
                    "{} -> {} should be rejected",
                    terminal,
                    to
                );
            }
        }
    }

    #[test]
    fn test_roundtrip_db_string() {
        for state in CrawlState::all_states() {
            assert_eq!(CrawlState::from_db_string(state.to_db_string()), Some(state));
        }
        assert_eq!(CrawlState::from_db_string("finished"), None);
    }
}
