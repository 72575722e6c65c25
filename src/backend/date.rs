use crate::domain::parsing::DateFormatOptions;
use crate::utils::error::{AeError, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static YMD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})$|^(\d{4})(\d{2})(\d{2})$").expect("static regex")
});
static DMY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})([-/.])(\d{1,2})[-/.](\d{2}|\d{4})$").expect("static regex"));
static NAMED_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[- ]([A-Za-z]{3})[A-Za-z]*[- ](\d{4})$").expect("static regex")
});
static YM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})[-/]?(\d{2})$").expect("static regex"));
static MY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{4})$").expect("static regex"));
static Y_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})$").expect("static regex"));

const MONTHS: [&str; 12] = ["JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC"];

/// 轉成 `YYYY-MM-DD`；允許不完整時可回傳 `YYYY-MM` 或 `YYYY`
pub fn format(source: &str, options: DateFormatOptions) -> Result<String> {
    let text = source.trim();
    if text.is_empty() {
        return Err(invalid(source, "empty date"));
    }

    if let Some(c) = YMD_RE.captures(text) {
        let group = |separated: usize, compact: usize| {
            c.get(separated).or_else(|| c.get(compact)).map_or(0, |m| number(m.as_str()))
        };
        return full_date(source, group(1, 4), group(2, 5), group(3, 6));
    }
    if let Some(c) = DMY_RE.captures(text) {
        let (first, second) = (number(&c[1]), number(&c[3]));
        let year = expand_two_digit_year(&c[4]);
        // 只有斜線才可能是美式月/日
        let (month, day) = if options.month_first && &c[2] == "/" {
            (first, second)
        } else {
            (second, first)
        };
        return full_date(source, year, month, day);
    }
    if let Some(c) = NAMED_MONTH_RE.captures(text) {
        let abbreviation = c[2].to_uppercase();
        let month = MONTHS
            .iter()
            .position(|name| *name == abbreviation)
            .ok_or_else(|| invalid(source, "unknown month name"))?;
        return full_date(source, number(&c[3]), month as u32 + 1, number(&c[1]));
    }

    let incomplete = if let Some(c) = YM_RE.captures(text) {
        Some(year_month(source, number(&c[1]), number(&c[2]))?)
    } else if let Some(c) = MY_RE.captures(text) {
        Some(year_month(source, number(&c[2]), number(&c[1]))?)
    } else {
        Y_RE.captures(text).map(|c| c[1].to_string())
    };

    match incomplete {
        Some(date) if options.allow_incomplete => Ok(date),
        Some(_) => Err(invalid(source, "incomplete date")),
        None => Err(invalid(source, "unrecognized date format")),
    }
}

fn number(text: &str) -> u32 {
    text.parse().unwrap_or(0)
}

fn expand_two_digit_year(text: &str) -> u32 {
    let year = number(text);
    if text.len() == 2 {
        let current = chrono::Datelike::year(&chrono::Utc::now()) as u32 % 100;
        if year <= current {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

fn full_date(source: &str, year: u32, month: u32, day: u32) -> Result<String> {
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| invalid(source, "no such day"))
}

fn year_month(source: &str, year: u32, month: u32) -> Result<String> {
    if (1..=12).contains(&month) {
        Ok(format!("{:04}-{:02}", year, month))
    } else {
        Err(invalid(source, "month out of range"))
    }
}

fn invalid(source: &str, reason: &str) -> AeError {
    AeError::InvalidDate {
        value: source.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> DateFormatOptions {
        DateFormatOptions::default()
    }

    #[test]
    fn test_full_dates() {
        assert_eq!(format("2020-3-7", complete()).unwrap(), "2020-03-07");
        assert_eq!(format("20200307", complete()).unwrap(), "2020-03-07");
        assert_eq!(format("07.03.2020", complete()).unwrap(), "2020-03-07");
        assert_eq!(format("7-Mar-2020", complete()).unwrap(), "2020-03-07");
    }

    #[test]
    fn test_month_first() {
        let options = DateFormatOptions {
            month_first: true,
            ..DateFormatOptions::default()
        };
        assert_eq!(format("03/07/2020", options).unwrap(), "2020-03-07");
        assert_eq!(format("03/07/2020", complete()).unwrap(), "2020-07-03");
    }

    #[test]
    fn test_incomplete_dates() {
        let options = DateFormatOptions {
            allow_incomplete: true,
            ..DateFormatOptions::default()
        };
        assert_eq!(format("2020-03", options).unwrap(), "2020-03");
        assert_eq!(format("2020", options).unwrap(), "2020");
        assert!(format("2020", complete()).is_err());
    }

    #[test]
    fn test_invalid_dates() {
        assert!(format("2020-02-30", complete()).is_err());
        assert!(format("yesterday", complete()).is_err());
        assert!(format("", complete()).is_err());
    }
}
