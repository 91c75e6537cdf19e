/// Claim state definitions for tracking a candidate through evaluation
///
/// This module defines the states a reward candidate passes through while
/// the claim machine evaluates it.
use std::fmt;

/// Represents the current state of one candidate in the claim process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimState {
    // ===== Active States =====
    /// Candidate has been discovered but metadata has not been fetched
    Unknown,

    /// Metadata confirms a free reward tier exists
    Valid,

    /// The free tier currently has claimable copies
    Available,

    /// A claim has been submitted and awaits confirmation
    Requested,

    // ===== Terminal States =====
    /// No reward section or no free tier; recorded in the ignore set
    Invalid,

    /// Free tier exists but no copies remain; recorded in the active set
    /// and re-checked on a future run
    Unavailable,

    /// Claim confirmed; the game joined the owned collection
    Claimed,

    /// Claim was submitted but rejected or lost; ignored for this run
    Failed,
}

impl ClaimState {
    /// Returns true if this is a terminal state (evaluation is over)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Invalid | Self::Unavailable | Self::Claimed | Self::Failed
        )
    }

    /// Returns true if the candidate stays eligible for a future run
    ///
    /// Unavailable copies can be restocked by the creator, so those games
    /// stay in the active set rather than the ignore set.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn allows(&self, next: ClaimState) -> bool {
        matches!(
            (self, next),
            (Self::Unknown, Self::Invalid)
                | (Self::Unknown, Self::Valid)
                | (Self::Valid, Self::Available)
                | (Self::Valid, Self::Unavailable)
                | (Self::Available, Self::Requested)
                | (Self::Requested, Self::Claimed)
                | (Self::Requested, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Valid => "valid",
            Self::Available => "available",
            Self::Requested => "requested",
            Self::Invalid => "invalid",
            Self::Unavailable => "unavailable",
            Self::Claimed => "claimed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ClaimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!ClaimState::Unknown.is_terminal());
        assert!(!ClaimState::Valid.is_terminal());
        assert!(!ClaimState::Available.is_terminal());
        assert!(!ClaimState::Requested.is_terminal());

        assert!(ClaimState::Invalid.is_terminal());
        assert!(ClaimState::Unavailable.is_terminal());
        assert!(ClaimState::Claimed.is_terminal());
        assert!(ClaimState::Failed.is_terminal());
    }

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(ClaimState::Unavailable.is_retryable());

        assert!(!ClaimState::Invalid.is_retryable());
        assert!(!ClaimState::Claimed.is_retryable());
        assert!(!ClaimState::Failed.is_retryable());
    }

    #[test]
    fn test_legal_transitions() {
        assert!(ClaimState::Unknown.allows(ClaimState::Invalid));
        assert!(ClaimState::Unknown.allows(ClaimState::Valid));
        assert!(ClaimState::Valid.allows(ClaimState::Available));
        assert!(ClaimState::Valid.allows(ClaimState::Unavailable));
        assert!(ClaimState::Available.allows(ClaimState::Requested));
        assert!(ClaimState::Requested.allows(ClaimState::Claimed));
        assert!(ClaimState::Requested.allows(ClaimState::Failed));
    }

    #[test]
    fn test_illegal_transitions() {
        // Cannot skip the metadata check
        assert!(!ClaimState::Unknown.allows(ClaimState::Claimed));
        assert!(!ClaimState::Unknown.allows(ClaimState::Available));

        // Terminal states allow nothing
        assert!(!ClaimState::Claimed.allows(ClaimState::Requested));
        assert!(!ClaimState::Invalid.allows(ClaimState::Valid));

        // No claim without a request
        assert!(!ClaimState::Available.allows(ClaimState::Claimed));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ClaimState::Unknown), "unknown");
        assert_eq!(format!("{}", ClaimState::Claimed), "claimed");
        assert_eq!(format!("{}", ClaimState::Unavailable), "unavailable");
    }
}
