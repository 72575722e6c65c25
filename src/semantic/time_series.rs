use crate::chart::{Chart, Modifier, Only, Selector};
use crate::semantic::{StyleNames, DEFAULT_STYLE_PRIORITY};
use crate::utils::datetime::get_antigen_date_range;
use crate::utils::error::Result;
use crate::utils::time_series::{time_series, Period};
use tracing::debug;

pub const DEFAULT_PREFIX: &str = "-ts-";

/// 每個期間一個樣式 `{prefix}{期間起點}`，隱藏區間外的測試抗原
pub fn style(
    chart: &mut Chart,
    prefix: &str,
    first: Option<&str>,
    last: Option<&str>,
    period: Period,
) -> Result<StyleNames> {
    let (first, last) = get_antigen_date_range(chart, first, last, false)?;
    let mut names = StyleNames::new();
    for (begin, end) in time_series(first, last, period) {
        let style_name = format!("{}{}", prefix, begin.format(period.name_format_style()));
        let begin_ymd = begin.format("%Y-%m-%d").to_string();
        let end_ymd = end.format("%Y-%m-%d").to_string();
        let hidden = |selector: Selector| Modifier::new().selector(selector).hide(true).only(Only::Antigens);
        chart
            .style_mut(&style_name)
            .set_priority(DEFAULT_STYLE_PRIORITY)
            .add_modifier(hidden(Selector::new().attribute("R", false).date_range("", &begin_ymd)))
            .add_modifier(hidden(Selector::new().attribute("R", false).date_range(&end_ymd, "")));
        names.insert(style_name);
    }
    debug!("📅 {} time series styles ({}) from {} to {}", names.len(), period, first, last);
    Ok(names)
}
