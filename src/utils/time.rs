use chrono::{Local, NaiveDate};

/// This is the standard way of converting a date to a string in workwise.
/// It matches the `date` query parameter the API expects.
pub fn date_to_api_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns `count` consecutive dates ending at `end` (inclusive), in ascending order.
pub fn dates_ending_at(end: NaiveDate, count: u32) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count as usize);
    for back in (0..count as i64).rev() {
        dates.push(end - chrono::Duration::days(back));
    }
    dates
}

/// Label for an aggregated span of days, `"{earliest}..{latest}"`.
pub fn range_label(dates: &[NaiveDate]) -> String {
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => {
            format!("{}..{}", date_to_api_string(*first), date_to_api_string(*last))
        }
        _ => String::new(),
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_to_api_string, dates_ending_at, range_label};

    #[test]
    fn test_api_string() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(date_to_api_string(date), "2025-03-09");
    }

    #[test]
    fn test_dates_ending_at() {
        let end = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let dates = dates_ending_at(end, 3);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 2, 27).unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
                end,
            ]
        );
    }

    #[test]
    fn test_dates_ending_at_single() {
        let end = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(dates_ending_at(end, 1), vec![end]);
    }

    #[test]
    fn test_range_label() {
        let end = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let dates = dates_ending_at(end, 7);
        assert_eq!(range_label(&dates), "2025-02-23..2025-03-01");
    }
}
