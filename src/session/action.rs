use crate::model::{BinDefinition, BinUpdate};

/// Number of past reports shown when the user doesn't ask for a specific amount.
pub const DEFAULT_HISTORY: usize = 7;

/// Discrete user action handled by the [SessionController](super::SessionController).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Logs a unit of time into a bin, found by name or nice name.
    Log(String),
    Report { history: usize },
    Settings,
    SetTotalHours(f64),
    SetReminderMinutes(f64),
    AddBin(BinDefinition),
    EditBin { key: String, update: BinUpdate },
    DeleteBin(String),
    Help,
    Exit,
}
