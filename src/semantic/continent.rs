use crate::chart::{AntigenSerum, Chart};
use crate::domain::ports::VirusNameParser;
use serde_json::Value;

fn set_location<P: VirusNameParser + ?Sized>(parser: &P, entry: &mut dyn AntigenSerum) {
    let parsed = parser.parse_name(entry.name(), None);
    if !parsed.parts.continent.is_empty() {
        entry.set_semantic("C9", Value::from(parsed.parts.continent));
    }
    if !parsed.parts.country.is_empty() {
        entry.set_semantic("c9", Value::from(parsed.parts.country));
    }
}

/// 依名稱中的地點設定洲 `"C9"` 與國家 `"c9"`
pub fn attributes<P: VirusNameParser + ?Sized>(chart: &mut Chart, parser: &P) {
    for antigen in chart.antigens_mut() {
        set_location(parser, antigen);
    }
    for serum in chart.sera_mut() {
        set_location(parser, serum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BuiltinBackend, LocationDb};
    use crate::chart::test_chart::sample;
    use crate::domain::parsing::LocationInfo;
    use serde_json::json;

    #[test]
    fn test_continent_attributes() {
        let mut locdb = LocationDb::default();
        locdb.insert(
            "DARWIN",
            LocationInfo {
                country: "AUSTRALIA".to_string(),
                continent: "AUSTRALIA-OCEANIA".to_string(),
                ..LocationInfo::default()
            },
        );
        let mut chart = sample();
        attributes(&mut chart, &BuiltinBackend::with_locdb(locdb));
        assert_eq!(chart.antigens()[0].semantic_get("C9"), Some(&json!("AUSTRALIA-OCEANIA")));
        assert_eq!(chart.sera()[0].semantic_get("c9"), Some(&json!("AUSTRALIA")));
        // 地點表中沒有 KANSAS
        assert_eq!(chart.antigens()[1].semantic_get("C9"), None);
    }
}
