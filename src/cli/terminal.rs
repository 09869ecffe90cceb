use std::fmt::Display;

use ansi_term::{Colour, Style};
use chrono::NaiveDate;
use clap::CommandFactory;

use crate::{
    analysis::ReportLine,
    model::{BinDefinition, BinSet, Configuration},
    session::Presenter,
    utils::percentage::Percentage,
};

use super::input::SessionLine;

const DATE_FORMAT: &str = "%a %d %b %Y";

/// Writes everything to the terminal. Errors go to stderr, the rest to stdout.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn show_bins(&mut self, bins: &BinSet) {
        if bins.is_empty() {
            println!("{}", Style::new().dimmed().paint("No bins defined"));
            return;
        }
        for bin in bins.iter() {
            println!(
                "  {}\t{}\t{}",
                Style::new().bold().paint(&bin.name),
                bin.nice_name,
                Style::new().dimmed().paint(&bin.description)
            );
        }
    }

    fn show_lines(&self, lines: &[ReportLine]) {
        if lines.is_empty() {
            println!("  {}", Style::new().dimmed().paint("nothing logged"));
        }
        for line in lines {
            let label = if line.known {
                Style::new().paint(&line.label)
            } else {
                Style::new().dimmed().paint(&line.label)
            };
            println!("  {label}\t{}", line.count);
        }
    }
}

impl Presenter for TerminalPresenter {
    fn show_total(&mut self, logged: u64, total_hours: f64, share: Percentage) {
        let colour = if *share >= 100. {
            Colour::Green
        } else {
            Colour::Cyan
        };
        println!(
            "{}",
            colour.paint(format!("Logged {logged} of {total_hours} hours ({share})"))
        );
    }

    fn remind(&mut self) {
        println!(
            "{}",
            Colour::Yellow
                .bold()
                .paint("Time to log your time! What bin have you been up to?")
        );
    }

    fn show_logged(&mut self, bin: &BinDefinition, count: u64) {
        println!("{} {count}", Style::new().bold().paint(&bin.nice_name));
    }

    fn show_report(
        &mut self,
        date: NaiveDate,
        today: &[ReportLine],
        history: &[(NaiveDate, Vec<ReportLine>)],
    ) {
        for (date, lines) in history.iter().filter(|v| v.0 != date) {
            println!(
                "{}",
                Style::new().underline().paint(date.format(DATE_FORMAT).to_string())
            );
            self.show_lines(lines);
        }
        println!(
            "{}",
            Style::new()
                .bold()
                .underline()
                .paint(date.format(DATE_FORMAT).to_string())
        );
        self.show_lines(today);
    }

    fn show_settings(&mut self, config: &Configuration, bins: &BinSet) {
        println!("Working day\t{} hours", config.total_hours);
        println!("Reminder\tevery {} minutes", config.reminder_minutes);
        println!("Bins");
        self.show_bins(bins);
    }

    fn show_message(&mut self, message: &str) {
        println!("{message}");
    }

    fn show_error(&mut self, error: &dyn Display) {
        eprintln!("{}", Colour::Red.paint(error.to_string()));
    }

    fn show_help(&mut self) {
        println!("{}", SessionLine::command().render_help());
    }
}
