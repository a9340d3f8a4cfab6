use serde::Serialize;
use thiserror::Error;

use super::FlowError;

/// `Idle -> Submitting -> Succeeded | Failed`, and `Failed -> Submitting` on
/// resubmit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "value")]
pub enum SubmitState<T> {
    Idle,
    Submitting,
    Succeeded(T),
    Failed(FlowError),
}

impl<T> Default for SubmitState<T> {
    fn default() -> Self {
        SubmitState::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("this form was already submitted")]
    AlreadyCompleted,
}

/// Proof that the holder started the current attempt. Only [`SubmitState::begin`]
/// creates one, and [`SubmitState::finish`] consumes it, so an attempt is
/// resolved exactly once.
#[must_use = "an in-flight attempt must be finished"]
#[derive(Debug)]
pub struct InFlight {
    _private: (),
}

impl<T> SubmitState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_can_start(&self) -> Result<(), TransitionError> {
        match self {
            SubmitState::Idle | SubmitState::Failed(_) => Ok(()),
            SubmitState::Submitting => Err(TransitionError::AlreadySubmitting),
            SubmitState::Succeeded(_) => Err(TransitionError::AlreadyCompleted),
        }
    }

    pub fn begin(&mut self) -> Result<InFlight, TransitionError> {
        self.check_can_start()?;
        *self = SubmitState::Submitting;
        Ok(InFlight { _private: () })
    }

    pub fn finish(&mut self, ticket: InFlight, outcome: Result<T, FlowError>) {
        let InFlight { _private: () } = ticket;
        *self = match outcome {
            Ok(value) => SubmitState::Succeeded(value),
            Err(err) => SubmitState::Failed(err),
        };
    }

    /// Input rejected before any network call.
    pub fn reject(&mut self, err: FlowError) -> Result<(), TransitionError> {
        self.check_can_start()?;
        *self = SubmitState::Failed(err);
        Ok(())
    }

    /// The user edited the input after a failure.
    pub fn reset(&mut self) {
        if let SubmitState::Failed(_) = self {
            *self = SubmitState::Idle;
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmitState::Submitting)
    }

    pub fn error(&self) -> Option<&FlowError> {
        match self {
            SubmitState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            SubmitState::Succeeded(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = SubmitState::<u32>::new();
        let ticket = state.begin().unwrap();
        assert!(state.is_submitting());
        state.finish(ticket, Ok(7));
        assert_eq!(state.value(), Some(&7));
    }

    #[test]
    fn test_double_submit_rejected() {
        let mut state = SubmitState::<u32>::new();
        let ticket = state.begin().unwrap();
        assert_eq!(state.begin().unwrap_err(), TransitionError::AlreadySubmitting);
        assert!(state.is_submitting());
        state.finish(ticket, Ok(1));
    }

    #[test]
    fn test_failure_allows_retry() {
        let mut state = SubmitState::<u32>::new();
        let ticket = state.begin().unwrap();
        state.finish(ticket, Err(FlowError::Other("offline".into())));
        assert_eq!(state.error().map(FlowError::message), Some("offline"));

        let ticket = state.begin().unwrap();
        state.finish(ticket, Ok(2));
        assert_eq!(state, SubmitState::Succeeded(2));
    }

    #[test]
    fn test_success_is_final() {
        let mut state = SubmitState::<u32>::new();
        let ticket = state.begin().unwrap();
        state.finish(ticket, Ok(3));
        assert_eq!(state.begin().unwrap_err(), TransitionError::AlreadyCompleted);
        assert_eq!(
            state.reject(FlowError::validation("x")).unwrap_err(),
            TransitionError::AlreadyCompleted
        );
    }

    #[test]
    fn test_reject_and_reset() {
        let mut state = SubmitState::<u32>::new();
        state.reject(FlowError::validation("name required")).unwrap();
        assert!(matches!(state, SubmitState::Failed(FlowError::Validation(_))));

        state.reset();
        assert_eq!(state, SubmitState::Idle);

        // reset does nothing outside of Failed
        state.reset();
        assert_eq!(state, SubmitState::Idle);
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let state = SubmitState::<u32>::Failed(FlowError::validation("name required"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["value"]["kind"], "validation");
        assert_eq!(json["value"]["message"], "name required");
    }
}
