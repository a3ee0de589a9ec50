//! Session phase state machine.
//!
//! # State Diagram
//!
//! ```text
//! ┌─────────┐  start   ┌──────────┐  guess   ┌─────────┐  finish  ┌──────────┐
//! │  Setup  │─────────▶│ Guessing │─────────▶│ Playing │─────────▶│ Finished │
//! └─────────┘          └──────────┘          └─────────┘          └──────────┘
//!      ▲                     │                    │                     │
//!      └─────────────────────┴──── reset ─────────┴─────────────────────┘
//! ```

use std::fmt;

use super::outcome::Outcome;

/// Where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No board yet
    #[default]
    Setup,
    /// Board received, waiting for the minimum-throws guess
    Guessing,
    /// Tokens on the board
    Playing,
    /// Someone reached the last cell; terminal until reset
    Finished { outcome: Outcome },
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "SETUP",
            Self::Guessing => "GUESSING",
            Self::Playing => "PLAYING",
            Self::Finished { .. } => "FINISHED",
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Check if the phase only leaves through a reset.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    /// Race result, once finished.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Finished { outcome } => Some(*outcome),
            _ => None,
        }
    }

    /// Calculate the phase an event leads to.
    pub fn transition(&self, event: &PhaseEvent) -> Result<Phase, InvalidTransition> {
        use Phase::*;
        use PhaseEvent::*;

        let invalid = |reason: &'static str| InvalidTransition {
            from: *self,
            event: *event,
            reason,
        };

        match (self, event) {
            (Setup, Start) => Ok(Guessing),
            (_, Start) => Err(invalid("Session already started")),

            (Guessing, Guess) => Ok(Playing),
            (Setup, Guess) => Err(invalid("No board yet")),
            (_, Guess) => Err(invalid("Guess already recorded")),

            (Playing, Finish { outcome }) => Ok(Finished { outcome: *outcome }),
            (Finished { .. }, Finish { .. }) => Err(invalid("Already finished")),
            (_, Finish { .. }) => Err(invalid("Not playing")),

            (_, Reset) => Ok(Setup),
        }
    }

    /// Apply an event in place, returning error if invalid.
    pub fn apply_mut(&mut self, event: PhaseEvent) -> Result<(), InvalidTransition> {
        *self = self.transition(&event)?;
        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finished { outcome } => write!(f, "FINISHED({})", outcome),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Phase transition events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Start,
    Guess,
    Finish { outcome: Outcome },
    Reset,
}

/// Error when a phase transition is invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition from {from} via {event:?}: {reason}")]
pub struct InvalidTransition {
    pub from: Phase,
    pub event: PhaseEvent,
    pub reason: &'static str,
}
