use std::fmt::Display;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    analysis::{historic, labelled},
    session::Presenter,
    storage::Storage,
    utils::clock::Clock,
};

use super::{terminal::TerminalPresenter, Args};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[arg(
        long,
        short,
        help = "Day of the report. Examples are \"yesterday\", \"2 days ago\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = 0, help = "Number of past reports to show as well")]
    history: usize,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Prints the report for a single day, optionally preceded by the most recent reports.
pub async fn process_report_command(
    ReportCommand {
        date,
        history,
        date_style,
    }: ReportCommand,
    storage: &impl Storage,
    clock: &impl Clock,
) -> Result<()> {
    let today = clock.today();
    let date = match date {
        Some(date) => parse_report_date(&date, date_style, clock)?,
        None => today,
    };

    let bins = storage.load_bins().await?;
    // Only today's report is created on demand, other days are shown as they were stored.
    let report = if date == today {
        storage.load_report(date).await?
    } else {
        storage.find_report(date).await?.unwrap_or_default()
    };
    let history = if history > 0 {
        historic(storage, history)
            .await?
            .into_iter()
            .map(|(date, report)| (date, labelled(&report, &bins)))
            .collect()
    } else {
        Vec::new()
    };

    TerminalPresenter.show_report(date, &labelled(&report, &bins), &history);
    Ok(())
}

fn parse_report_date(value: &str, style: DateStyle, clock: &impl Clock) -> Result<NaiveDate> {
    let now = clock.time().with_timezone(&Local);
    match parse_date_string(value, now, style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate report date {e}"),
            )
            .into()),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        storage::{FileStorage, Storage},
        utils::clock::MockClock,
    };

    use super::{parse_report_date, process_report_command, DateStyle, ReportCommand};

    fn clock_at_noon(day: u32) -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_time()
            .returning(move || Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap());
        clock
            .expect_today()
            .returning(move || NaiveDate::from_ymd_opt(2025, 3, day).unwrap());
        clock
    }

    #[tokio::test]
    async fn test_report_of_another_day_is_not_created() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path())?;
        let clock = clock_at_noon(20);

        let command = ReportCommand {
            date: Some("22/03/2025".into()),
            history: 3,
            date_style: DateStyle::Uk,
        };
        process_report_command(command, &storage, &clock).await?;
        assert!(storage.list_report_dates().await?.is_empty());

        let command = ReportCommand {
            date: None,
            history: 0,
            date_style: DateStyle::Uk,
        };
        process_report_command(command, &storage, &clock).await?;
        assert_eq!(
            storage.list_report_dates().await?,
            [NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()]
        );
        Ok(())
    }

    #[test]
    fn test_parse_report_date_styles() {
        let clock = clock_at_noon(20);

        assert_eq!(
            parse_report_date("15/03/2025", DateStyle::Uk, &clock).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert_eq!(
            parse_report_date("03/15/2025", DateStyle::Us, &clock).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert!(parse_report_date("someday", DateStyle::Uk, &clock).is_err());
    }
}
