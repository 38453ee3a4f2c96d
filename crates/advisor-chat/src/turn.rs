//! Turn state machine with validated transitions.
//!
//! One turn moves Idle -> Sending -> Succeeded/Failed -> Idle.

use crate::error::ChatError;

/// Lifecycle state of the current chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    Sending,
    Succeeded,
    Failed,
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TurnState::Idle => "idle",
            TurnState::Sending => "sending",
            TurnState::Succeeded => "succeeded",
            TurnState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Validate that a turn transition is allowed.
///
/// Valid transitions:
/// - Idle -> Sending
/// - Sending -> Succeeded
/// - Sending -> Failed
/// - Succeeded -> Idle
/// - Failed -> Idle
pub fn validate_transition(from: TurnState, to: TurnState) -> Result<(), ChatError> {
    let valid = matches!(
        (from, to),
        (TurnState::Idle, TurnState::Sending)
            | (TurnState::Sending, TurnState::Succeeded)
            | (TurnState::Sending, TurnState::Failed)
            | (TurnState::Succeeded, TurnState::Idle)
            | (TurnState::Failed, TurnState::Idle)
    );

    if valid {
        Ok(())
    } else {
        Err(ChatError::InvalidTransition(from, to))
    }
}
