use crate::chart::Chart;
use crate::utils::error::{AeError, Result};
use chrono::NaiveDate;

/// 解析 YYYY-MM-DD, YYYYMMDD, YYYY, YYYY-MM, YYYYMM
pub fn parse_date_with_defaults(source: &str, default_month: u32, default_day: u32) -> Result<NaiveDate> {
    let invalid = |reason: &str| AeError::InvalidDate {
        value: source.to_string(),
        reason: reason.to_string(),
    };
    let number = |text: &str| -> Result<u32> { text.parse::<u32>().map_err(|_| invalid("not a number")) };
    let year = |text: &str| -> Result<i32> { text.parse::<i32>().map_err(|_| invalid("invalid year")) };

    if !source.is_ascii() {
        return Err(invalid("unrecognized format"));
    }
    let (y, m, d) = match source.len() {
        4 => (year(source)?, default_month, default_day),
        6 => (year(&source[..4])?, number(&source[4..])?, default_day),
        7 if &source[4..5] == "-" => (year(&source[..4])?, number(&source[5..])?, default_day),
        8 => (year(&source[..4])?, number(&source[4..6])?, number(&source[6..])?),
        10 => {
            return NaiveDate::parse_from_str(source, "%Y-%m-%d").map_err(|err| invalid(&err.to_string()));
        }
        _ => return Err(invalid("unrecognized format")),
    };
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| invalid("out of range"))
}

pub fn parse_date(source: &str) -> Result<NaiveDate> {
    parse_date_with_defaults(source, 1, 1)
}

/// 圖表中測試抗原的日期範圍，可由 first/last 覆寫
pub fn get_antigen_date_range(
    chart: &Chart,
    first: Option<&str>,
    last: Option<&str>,
    limit_by_chart: bool,
) -> Result<(NaiveDate, NaiveDate)> {
    let (chart_first, chart_last) = chart.antigen_date_range(true).ok_or_else(|| AeError::ChartError {
        message: "no dated test antigens in the chart".to_string(),
    })?;
    let chart_first = parse_date(&chart_first)?;
    let chart_last = parse_date(&chart_last)?;

    let first = match first.filter(|text| !text.is_empty()) {
        None => chart_first,
        Some(text) => {
            let date = parse_date(text)?;
            if limit_by_chart && date < chart_first {
                chart_first
            } else {
                date
            }
        }
    };
    let last = match last.filter(|text| !text.is_empty()) {
        None => chart_last,
        Some(text) => {
            let date = parse_date(text)?;
            if limit_by_chart && date > chart_last {
                chart_last
            } else {
                date
            }
        }
    };
    tracing::debug!("antigen date range {} {} -- chart: {} {}", first, last, chart_first, chart_last);
    Ok((first, last))
}
