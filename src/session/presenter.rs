use std::fmt::Display;

use chrono::NaiveDate;

use crate::{
    analysis::ReportLine,
    model::{BinDefinition, BinSet, Configuration},
    utils::percentage::Percentage,
};

/// Everything the session shows to the user goes through this trait. The session doesn't know
/// whether it talks to a terminal or something else.
pub trait Presenter {
    /// Logged units against the working day.
    fn show_total(&mut self, logged: u64, total_hours: f64, share: Percentage);

    /// The "log your time" prompt.
    fn remind(&mut self);

    fn show_logged(&mut self, bin: &BinDefinition, count: u64);

    fn show_report(
        &mut self,
        date: NaiveDate,
        today: &[ReportLine],
        history: &[(NaiveDate, Vec<ReportLine>)],
    );

    fn show_settings(&mut self, config: &Configuration, bins: &BinSet);

    fn show_message(&mut self, message: &str);

    fn show_error(&mut self, error: &dyn Display);

    fn show_help(&mut self);
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn show_total(&mut self, logged: u64, total_hours: f64, share: Percentage) {
        (**self).show_total(logged, total_hours, share)
    }

    fn remind(&mut self) {
        (**self).remind()
    }

    fn show_logged(&mut self, bin: &BinDefinition, count: u64) {
        (**self).show_logged(bin, count)
    }

    fn show_report(
        &mut self,
        date: NaiveDate,
        today: &[ReportLine],
        history: &[(NaiveDate, Vec<ReportLine>)],
    ) {
        (**self).show_report(date, today, history)
    }

    fn show_settings(&mut self, config: &Configuration, bins: &BinSet) {
        (**self).show_settings(config, bins)
    }

    fn show_message(&mut self, message: &str) {
        (**self).show_message(message)
    }

    fn show_error(&mut self, error: &dyn Display) {
        (**self).show_error(error)
    }

    fn show_help(&mut self) {
        (**self).show_help()
    }
}
