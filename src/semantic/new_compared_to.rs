use crate::chart::{AntigenSerum, Chart};
use serde_json::Value;
use tracing::debug;

/// 前一張圖中沒有的抗原設定 `"new"`，回傳標記數量
pub fn attributes(chart: &mut Chart, previous: &Chart, new_attribute_value: i64) -> usize {
    let new_antigens = chart.select_new_antigens(previous);
    for antigen_no in &new_antigens {
        chart.antigens_mut()[*antigen_no].set_semantic("new", Value::from(new_attribute_value));
    }
    debug!("🆕 {} new antigens compared to {}", new_antigens.len(), previous.name());
    new_antigens.len()
}
