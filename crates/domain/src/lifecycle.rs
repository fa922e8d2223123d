//! Lifecycle state machine of a platform instance.
//!
//! ```text
//! Uninitialized --initialize--> Started --start--> Running --configure--> Configured
//!                                                               (configure again: Configured)
//! any state --shutdown--> ShuttingDown --> Stopped
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidTransitionError;

/// The lifecycle position of one platform instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Started,
    Running,
    Configured,
    ShuttingDown,
    Stopped,
}

/// Operations that move a platform between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Initialize,
    Start,
    Configure,
    Shutdown,
}

impl Transition {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Start => "start",
            Self::Configure => "configure",
            Self::Shutdown => "shutdown",
        }
    }
}

impl LifecycleState {
    /// The state reached by applying `transition`.
    ///
    /// Shutdown is accepted from every state and leads to
    /// [`LifecycleState::ShuttingDown`]; the controller finishes it with
    /// [`LifecycleState::Stopped`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransitionError`] when `transition` is not allowed
    /// from `self`.
    pub fn apply(self, transition: Transition) -> Result<Self, InvalidTransitionError> {
        match (self, transition) {
            (Self::Uninitialized, Transition::Initialize) => Ok(Self::Started),
            (Self::Started, Transition::Start) => Ok(Self::Running),
            (Self::Running | Self::Configured, Transition::Configure) => Ok(Self::Configured),
            (_, Transition::Shutdown) => Ok(Self::ShuttingDown),
            (from, transition) => Err(InvalidTransitionError {
                from,
                operation: transition.name(),
            }),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Uninitialized => "uninitialized",
            Self::Started => "started",
            Self::Running => "running",
            Self::Configured => "configured",
            Self::ShuttingDown => "shutting down",
            Self::Stopped => "stopped",
        };
        f.write_str(text)
    }
}
