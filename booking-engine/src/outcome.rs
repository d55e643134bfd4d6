//! Command outcomes
//!
//! Guard violations are not errors: a refused command leaves state
//! untouched and reports why through [`IgnoredReason`].

use shared::models::BookingStep;
use thiserror::Error;

/// Result of a state-changing command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State changed
    Applied,
    /// Guard refused the command, nothing changed
    Ignored(IgnoredReason),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }

    pub fn reason(&self) -> Option<IgnoredReason> {
        match self {
            CommandOutcome::Applied => None,
            CommandOutcome::Ignored(reason) => Some(*reason),
        }
    }
}

impl From<IgnoredReason> for CommandOutcome {
    fn from(reason: IgnoredReason) -> Self {
        CommandOutcome::Ignored(reason)
    }
}

/// Why a command was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IgnoredReason {
    #[error("command not valid in step {0}")]
    WrongStep(BookingStep),

    #[error("no table selected")]
    NoTableSelected,

    #[error("table not found")]
    TableNotFound,

    #[error("seat is booked or out of range")]
    SeatUnavailable,

    #[error("all seats for the party are already selected")]
    SeatLimitReached,

    #[error("selected seats do not match the party size")]
    SeatCountMismatch,

    #[error("no people in the party")]
    NoPeople,

    #[error("every person needs a name")]
    MissingNames,

    #[error("person not found")]
    PersonNotFound,

    #[error("no matching order line")]
    LineNotFound,

    #[error("target step is not before the current step")]
    NotAnEarlierStep,

    #[error("booking already confirmed")]
    AlreadyConfirmed,

    #[error("category not found")]
    CategoryNotFound,

    #[error("food item not found")]
    FoodItemNotFound,

    #[error("nothing to change")]
    NoChange,
}
