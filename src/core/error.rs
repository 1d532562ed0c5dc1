use thiserror::Error;

/// Errors produced by the matching core
///
/// Every variant is recoverable by the caller: fix the input, relax the
/// exclusions, or accept that no round can be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("At least 2 participants are required, got {count}")]
    TooFewParticipants { count: usize },

    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(String),

    #[error("A participant cannot be excluded from themselves: {0}")]
    SelfExclusion(String),

    #[error("No valid assignment exists: at most {matched} of {required} givers can be matched")]
    Infeasible { matched: usize, required: usize },
}

impl MatchError {
    /// True for errors caused by malformed input rather than by the constraints
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, MatchError::Infeasible { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_classification() {
        assert!(MatchError::TooFewParticipants { count: 1 }.is_invalid_input());
        assert!(MatchError::DuplicateParticipant("7".into()).is_invalid_input());
        assert!(MatchError::SelfExclusion("7".into()).is_invalid_input());
        assert!(!MatchError::Infeasible { matched: 1, required: 2 }.is_invalid_input());
    }

    #[test]
    fn test_infeasible_message() {
        let err = MatchError::Infeasible { matched: 3, required: 4 };
        assert_eq!(
            err.to_string(),
            "No valid assignment exists: at most 3 of 4 givers can be matched"
        );
    }
}
