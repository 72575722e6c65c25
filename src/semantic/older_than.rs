use crate::chart::{AntigenSerum, Chart, Modifier, Only, Selector};
use crate::semantic::{StyleNames, DEFAULT_STYLE_PRIORITY};
use chrono::{Datelike, Months, NaiveDate};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

const ATTRIBUTES: [&str; 2] = ["o6m", "o12m"];

/// 會議當月一日往前 6 個月
pub fn older_6_months_date(conference_date: NaiveDate) -> NaiveDate {
    let first = first_of_month(conference_date);
    first.checked_sub_months(Months::new(6)).unwrap_or(first)
}

/// 會議前一年同月一日
pub fn older_12_months_date(conference_date: NaiveDate) -> NaiveDate {
    let first = first_of_month(conference_date);
    first.checked_sub_months(Months::new(12)).unwrap_or(first)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// 早於期限的抗原設定 `"o6m"`、`"o12m"`；回傳各屬性的計數與期限
pub fn attributes(chart: &mut Chart, conference_date: NaiveDate) -> BTreeMap<String, Value> {
    let mut counts = BTreeMap::new();
    for (attribute, last_date) in [
        ("o6m", older_6_months_date(conference_date)),
        ("o12m", older_12_months_date(conference_date)),
    ] {
        let last_date = last_date.format("%Y-%m-%d").to_string();
        let (mut older, mut newer) = (0usize, 0usize);
        for antigen in chart.antigens_mut() {
            if antigen.date.as_str() < last_date.as_str() {
                antigen.set_semantic(attribute, Value::Bool(true));
                older += 1;
            } else {
                newer += 1;
            }
        }
        counts.insert(attribute.to_string(), Value::from(older));
        counts.insert(format!("!{}", attribute), Value::from(newer));
        counts.insert(format!("{}-last", attribute), Value::from(last_date));
    }
    info!("🕰️ Older than: {}", serde_json::to_string(&counts).unwrap_or_default());
    counts
}

/// `-o6m-grey` 與 `-o12m-grey`：把較舊的抗原畫成灰色並放到下層
pub fn style(chart: &mut Chart) -> StyleNames {
    let mut names = StyleNames::new();
    for attribute in ATTRIBUTES {
        let style_name = format!("-{}-grey", attribute);
        chart
            .style_mut(&style_name)
            .set_priority(DEFAULT_STYLE_PRIORITY)
            .add_modifier(
                Modifier::new()
                    .selector(Selector::new().attribute(attribute, true))
                    .outline("grey")
                    .fill("grey")
                    .lower()
                    .only(Only::Antigens),
            );
        names.insert(style_name);
    }
    names
}

fn month_year_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

pub fn since_6m_label(conference_date: NaiveDate) -> String {
    month_year_label(older_6_months_date(conference_date))
}

pub fn since_12m_label(conference_date: NaiveDate) -> String {
    month_year_label(older_12_months_date(conference_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::test_chart::sample;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_limit_dates() {
        assert_eq!(older_6_months_date(date(2021, 9, 20)), date(2021, 3, 1));
        assert_eq!(older_6_months_date(date(2022, 2, 14)), date(2021, 8, 1));
        assert_eq!(older_12_months_date(date(2022, 2, 14)), date(2021, 2, 1));
        assert_eq!(since_6m_label(date(2022, 2, 14)), "August 2021");
        assert_eq!(since_12m_label(date(2022, 2, 14)), "February 2021");
    }

    #[test]
    fn test_older_than_attributes() {
        let mut chart = sample();
        let counts = attributes(&mut chart, date(2021, 9, 20));
        assert_eq!(counts["o6m"], Value::from(2));
        assert_eq!(counts["!o6m"], Value::from(1));
        assert_eq!(counts["o6m-last"], Value::from("2021-03-01"));
        assert_eq!(counts["o12m"], Value::from(1));
        assert_eq!(chart.antigens()[1].semantic_get("o12m"), Some(&Value::Bool(true)));
        assert_eq!(chart.antigens()[2].semantic_get("o6m"), None);
    }

    #[test]
    fn test_grey_styles() {
        let mut chart = sample();
        let names = style(&mut chart);
        assert_eq!(names.len(), 2);
        let grey = &chart.styles()["-o6m-grey"];
        assert_eq!(grey.priority, DEFAULT_STYLE_PRIORITY);
        assert_eq!(grey.modifiers[0].fill.as_deref(), Some("grey"));
    }
}
