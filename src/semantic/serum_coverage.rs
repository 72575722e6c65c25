use crate::chart::{Chart, Modifier, Only, Selector};
use crate::semantic::StyleNames;
use serde_json::{json, Value};

/// 血清涵蓋範圍樣式；半徑由檢視器計算
#[derive(Debug, Clone)]
pub struct SerumCoverageOptions {
    pub fold: f64,
    pub theoretical: bool,
    pub within: Value,
    pub outside: Value,
}

impl Default for SerumCoverageOptions {
    fn default() -> Self {
        Self {
            fold: 2.0,
            theoretical: false,
            within: json!({"outline": "pink", "fill": ":bright", "outline_width": 3}),
            outside: json!({"outline": "black", "fill": ":bright", "outline_width": 3}),
        }
    }
}

pub fn style(
    chart: &mut Chart,
    style_name: &str,
    serum_no: usize,
    priority: i64,
    options: &SerumCoverageOptions,
) -> StyleNames {
    chart.style_mut(style_name).set_priority(priority).add_modifier(
        Modifier::new()
            .selector(Selector::index(serum_no))
            .only(Only::Sera)
            .extra(
                "serum_coverage",
                json!({
                    "fold": options.fold,
                    "theoretical": options.theoretical,
                    "within": options.within,
                    "outside": options.outside,
                }),
            ),
    );
    StyleNames::from([style_name.to_string()])
}
