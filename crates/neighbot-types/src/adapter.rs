//! Adapter lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a chat adapter instance.
///
/// `Unconfigured -> Configured -> Initialized -> Running -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterState {
    Unconfigured,
    Configured,
    Initialized,
    Running,
    Stopped,
}

impl AdapterState {
    /// States from which a move to `self` is allowed.
    pub fn allowed_from(self) -> &'static [AdapterState] {
        match self {
            AdapterState::Unconfigured => &[],
            AdapterState::Configured => &[AdapterState::Unconfigured, AdapterState::Configured],
            AdapterState::Initialized => &[AdapterState::Configured],
            AdapterState::Running => &[AdapterState::Initialized],
            AdapterState::Stopped => &[AdapterState::Running],
        }
    }
}

impl Default for AdapterState {
    fn default() -> Self {
        AdapterState::Unconfigured
    }
}

impl fmt::Display for AdapterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterState::Unconfigured => write!(f, "unconfigured"),
            AdapterState::Configured => write!(f, "configured"),
            AdapterState::Initialized => write!(f, "initialized"),
            AdapterState::Running => write!(f, "running"),
            AdapterState::Stopped => write!(f, "stopped"),
        }
    }
}

impl FromStr for AdapterState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unconfigured" => Ok(AdapterState::Unconfigured),
            "configured" => Ok(AdapterState::Configured),
            "initialized" => Ok(AdapterState::Initialized),
            "running" => Ok(AdapterState::Running),
            "stopped" => Ok(AdapterState::Stopped),
            other => Err(format!("invalid adapter state: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_state_roundtrip() {
        for state in [
            AdapterState::Unconfigured,
            AdapterState::Configured,
            AdapterState::Initialized,
            AdapterState::Running,
            AdapterState::Stopped,
        ] {
            let parsed: AdapterState = state.to_string().parse().unwrap();
            assert_eq!(state, parsed);
        }
    }

    #[test]
    fn test_start_requires_initialized() {
        assert_eq!(AdapterState::Running.allowed_from(), &[AdapterState::Initialized]);
        assert!(!AdapterState::Running.allowed_from().contains(&AdapterState::Configured));
    }

    #[test]
    fn test_default_is_unconfigured() {
        assert_eq!(AdapterState::default(), AdapterState::Unconfigured);
    }
}
