use crate::utils::error::{AeError, Result};
use chrono::{Datelike, Duration, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    Year,
}

impl FromStr for Period {
    type Err = AeError;

    fn from_str(source: &str) -> Result<Self> {
        match source {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(AeError::InvalidPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        })
    }
}

impl Period {
    pub fn next(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Year => date.checked_add_months(Months::new(12)),
            Period::Month => date.checked_add_months(Months::new(1)),
            Period::Week => date.checked_add_signed(Duration::days(7)),
        }
        .unwrap_or(NaiveDate::MAX)
    }

    pub fn previous(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Year => date.checked_sub_months(Months::new(12)),
            Period::Month => date.checked_sub_months(Months::new(1)),
            Period::Week => date.checked_sub_signed(Duration::days(7)),
        }
        .unwrap_or(NaiveDate::MIN)
    }

    /// 該日期所在期間的第一天 (週一、月初、年初)
    pub fn start_of(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Week => date - Duration::days(date.weekday().num_days_from_monday() as i64),
            Period::Month => date.with_day(1).unwrap_or(date),
            Period::Year => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// strftime 格式，用於 style 名稱
    pub fn name_format_style(self) -> &'static str {
        match self {
            Period::Year => "%Y",
            Period::Month => "%Y-%m",
            Period::Week => "%Y-%m-%d",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RangeEnd {
    AfterLast(NaiveDate),
    LastInclusive(NaiveDate),
}

#[derive(Debug, Clone)]
pub struct TimeSeriesRange {
    period: Period,
    first: NaiveDate,
    after_last: NaiveDate,
}

impl TimeSeriesRange {
    /// 起點與終點都對齊到期間的第一天，區間因此不會因月底日期而漂移
    pub fn new(first: NaiveDate, end: RangeEnd, period: Period) -> Self {
        let first = period.start_of(first);
        let after_last = match end {
            RangeEnd::AfterLast(date) if period.start_of(date) == date => date,
            RangeEnd::AfterLast(date) | RangeEnd::LastInclusive(date) => period.next(period.start_of(date)),
        };
        Self {
            period,
            first,
            after_last,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn next(&self, date: NaiveDate) -> NaiveDate {
        self.period.next(date)
    }

    pub fn previous(&self, date: NaiveDate) -> NaiveDate {
        self.period.previous(date)
    }

    pub fn begins(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.begin_end().map(|(begin, _)| begin)
    }

    /// 半開區間 [begin, end)
    pub fn begin_end(&self) -> impl Iterator<Item = (NaiveDate, NaiveDate)> + '_ {
        let mut current = self.first;
        std::iter::from_fn(move || {
            if current >= self.after_last {
                return None;
            }
            let next = self.period.next(current);
            let interval = (current, next);
            current = next;
            Some(interval)
        })
    }

    pub fn front(&self) -> NaiveDate {
        self.first
    }

    pub fn back(&self) -> NaiveDate {
        self.previous(self.after_last)
    }

    pub fn after_last(&self) -> NaiveDate {
        self.after_last
    }

    pub fn front_ymd(&self) -> String {
        self.front().format("%Y-%m-%d").to_string()
    }

    pub fn back_ymd(&self) -> String {
        self.back().format("%Y-%m-%d").to_string()
    }

    pub fn after_last_ymd(&self) -> String {
        self.after_last.format("%Y-%m-%d").to_string()
    }

    pub fn name_format_style(&self) -> &'static str {
        self.period.name_format_style()
    }
}

impl fmt::Display for TimeSeriesRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeSeries[{}, {}]", self.front_ymd(), self.back_ymd())
    }
}

/// 以期間起點對齊的連續半開區間，其聯集涵蓋 [first, last_inclusive]
pub fn time_series(first: NaiveDate, last_inclusive: NaiveDate, period: Period) -> Vec<(NaiveDate, NaiveDate)> {
    if last_inclusive < first {
        return Vec::new();
    }
    let range = TimeSeriesRange::new(
        period.start_of(first),
        RangeEnd::AfterLast(period.next(period.start_of(last_inclusive))),
        period,
    );
    range.begin_end().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_monthly_series_is_contiguous_and_covers_range() {
        let first = date(2022, 6, 15);
        let last = date(2023, 1, 2);
        let series = time_series(first, last, Period::Month);

        assert_eq!(series.len(), 8);
        assert_eq!(series[0], (date(2022, 6, 1), date(2022, 7, 1)));
        assert_eq!(series[7], (date(2023, 1, 1), date(2023, 2, 1)));
        for pair in series.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
            assert!(pair[0].0 < pair[0].1);
        }
        assert!(series[0].0 <= first);
        assert!(series.last().unwrap().1 > last);
    }

    #[test]
    fn test_week_range_starts_on_monday() {
        // 2022-06-01 是星期三
        let range = TimeSeriesRange::new(date(2022, 6, 1), RangeEnd::LastInclusive(date(2022, 6, 20)), Period::Week);
        assert_eq!(range.front(), date(2022, 5, 30));
        let begins: Vec<NaiveDate> = range.begins().collect();
        assert_eq!(begins.len(), 4);
        assert_eq!(begins[3], date(2022, 6, 20));
        assert_eq!(range.to_string(), "TimeSeries[2022-05-30, 2022-06-20]");
    }

    #[test]
    fn test_month_range_from_end_of_month_stays_aligned() {
        let range = TimeSeriesRange::new(date(2022, 1, 31), RangeEnd::LastInclusive(date(2022, 5, 31)), Period::Month);
        let intervals: Vec<(NaiveDate, NaiveDate)> = range.begin_end().collect();
        assert_eq!(intervals.len(), 5);
        assert_eq!(intervals[0], (date(2022, 1, 1), date(2022, 2, 1)));
        assert_eq!(intervals[1], (date(2022, 2, 1), date(2022, 3, 1)));
        assert_eq!(intervals[4], (date(2022, 5, 1), date(2022, 6, 1)));
        assert_eq!(range.after_last(), date(2022, 6, 1));

        let unaligned = TimeSeriesRange::new(date(2022, 1, 31), RangeEnd::AfterLast(date(2022, 3, 15)), Period::Month);
        assert_eq!(unaligned.after_last_ymd(), "2022-04-01");
        assert_eq!(unaligned.begins().count(), 3);
    }

    #[test]
    fn test_year_after_last() {
        let range = TimeSeriesRange::new(date(2019, 1, 1), RangeEnd::AfterLast(date(2022, 1, 1)), Period::Year);
        assert_eq!(range.begins().count(), 3);
        assert_eq!(range.back_ymd(), "2021-01-01");
        assert_eq!(range.after_last_ymd(), "2022-01-01");
    }

    #[test]
    fn test_invalid_period() {
        assert!("day".parse::<Period>().is_err());
        assert_eq!("month".parse::<Period>().unwrap(), Period::Month);
    }

    #[test]
    fn test_empty_when_last_before_first() {
        assert!(time_series(date(2022, 2, 1), date(2022, 1, 1), Period::Month).is_empty());
    }
}
