//! Domain values shared by storage, the reminder timer and the session.
//!
//!  - [Configuration] holds the length of a working day and the reminder interval.
//!  - [BinSet] is the ordered list of categories time is logged against.
//!  - [Report] counts increments per bin for one calendar day.

pub mod bins;
pub mod config;
pub mod report;

pub use bins::{BinDefinition, BinError, BinSet, BinUpdate};
pub use config::{Configuration, SettingsError};
pub use report::Report;
