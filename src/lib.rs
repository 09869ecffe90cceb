//! Terminal application for binning your working day. Time is logged in units against
//! user-defined bins, every day gets its own report and a background timer reminds to log.
//!

pub mod analysis;
pub mod cli;
pub mod fs;
pub mod model;
pub mod reminder;
pub mod session;
pub mod storage;
pub mod tracker;
pub mod utils;
