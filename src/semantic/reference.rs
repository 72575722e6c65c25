use crate::chart::{AntigenSerum, Chart};
use serde_json::Value;

/// 參考抗原設定 `"R": true`
pub fn attributes(chart: &mut Chart) {
    for antigen_no in chart.reference_antigen_indexes() {
        chart.antigens_mut()[antigen_no].set_semantic("R", Value::Bool(true));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::test_chart::sample;

    #[test]
    fn test_reference_attribute() {
        let mut chart = sample();
        attributes(&mut chart);
        assert_eq!(chart.antigens()[0].semantic_get("R"), Some(&Value::Bool(true)));
        assert_eq!(chart.antigens()[1].semantic_get("R"), None);
    }
}
