//! Lifecycle state tracking shared by adapter implementations.

use neighbot_types::adapter::AdapterState;
use neighbot_types::error::AdapterError;

/// Tracks an adapter's state and rejects out-of-order transitions.
#[derive(Debug, Default, Clone)]
pub struct Lifecycle {
    state: AdapterState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// Verify that moving to `to` is allowed from the current state.
    pub fn check(&self, to: AdapterState) -> Result<(), AdapterError> {
        if to.allowed_from().contains(&self.state) {
            Ok(())
        } else {
            Err(AdapterError::InvalidState {
                from: self.state.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Move to `to`, or fail without changing state.
    pub fn advance(&mut self, to: AdapterState) -> Result<(), AdapterError> {
        self.check(to)?;
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let mut lifecycle = Lifecycle::new();
        for state in [
            AdapterState::Configured,
            AdapterState::Initialized,
            AdapterState::Running,
            AdapterState::Stopped,
        ] {
            lifecycle.advance(state).unwrap();
        }
        assert_eq!(lifecycle.state(), AdapterState::Stopped);
    }

    #[test]
    fn test_start_before_initialize_fails() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(AdapterState::Configured).unwrap();
        let err = lifecycle.advance(AdapterState::Running).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidState { .. }));
        assert_eq!(lifecycle.state(), AdapterState::Configured);
    }

    #[test]
    fn test_reconfigure_before_initialize_allowed() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(AdapterState::Configured).unwrap();
        lifecycle.advance(AdapterState::Configured).unwrap();
    }

    #[test]
    fn test_stopped_adapter_cannot_restart() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.advance(AdapterState::Configured).unwrap();
        lifecycle.advance(AdapterState::Initialized).unwrap();
        lifecycle.advance(AdapterState::Running).unwrap();
        lifecycle.advance(AdapterState::Stopped).unwrap();
        assert!(lifecycle.check(AdapterState::Running).is_err());
        assert!(lifecycle.check(AdapterState::Stopped).is_err());
    }
}
