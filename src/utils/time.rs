use chrono::NaiveDate;

const REPORT_NAME_FORMAT: &str = "%y-%m-%d";

/// This is the standard way of converting a date to a report file stem in whatubinup.
pub fn date_to_report_name(date: NaiveDate) -> String {
    date.format(REPORT_NAME_FORMAT).to_string()
}

/// Inverse of [date_to_report_name]. Returns `None` for names that don't belong to a report.
pub fn report_name_to_date(name: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(name, REPORT_NAME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_to_report_name, report_name_to_date};

    #[test]
    fn test_report_name_uses_short_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(date_to_report_name(date), "24-03-07");
        assert_eq!(report_name_to_date("24-03-07"), Some(date));
    }

    #[test]
    fn test_report_name_rejects_foreign_files() {
        assert_eq!(report_name_to_date("24-03-07.json.tmp"), None);
        assert_eq!(report_name_to_date("notes"), None);
    }
}
