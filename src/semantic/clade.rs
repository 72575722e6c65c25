use crate::chart::{AntigenSerum, Chart, Modifier, Only, Selector};
use crate::semantic::DEFAULT_STYLE_PRIORITY;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::warn;

/// 一個分支的樣式設定；有 `aa` 時建立 `"{clade} {aa}"` 子分支
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CladeEntry {
    #[serde(default)]
    pub clade: String,
    #[serde(default)]
    pub aa: Option<String>,
    pub fill: String,
    #[serde(default)]
    pub legend: String,
}

pub fn default_modifier() -> Modifier {
    Modifier::new().outline("black").raise().only(Only::Antigens)
}

/// 建立 `-{style_name}` 樣式，每個分支一個填色修飾器，圖例優先度由 99 遞減
pub fn clades(
    chart: &mut Chart,
    style_name: &str,
    entries: &[CladeEntry],
    modifier: &Modifier,
    add_counter: bool,
) -> String {
    let mut extra_clades: BTreeMap<String, (String, String)> = BTreeMap::new();
    let style_name = format!("-{}", style_name);
    let style = chart.style_mut(&style_name);
    style.set_priority(DEFAULT_STYLE_PRIORITY);
    for (entry_no, entry) in entries.iter().enumerate() {
        let legend_priority = 99 - entry_no as i64;
        if entry.clade.is_empty() {
            warn!("⚠️ clades: unsupported entry in \"{}\": {:?}", style_name, entry);
            continue;
        }
        let clade = match &entry.aa {
            Some(aa) => {
                let extra_clade = format!("{} {}", entry.clade, aa);
                extra_clades.insert(extra_clade.clone(), (entry.clade.clone(), aa.clone()));
                extra_clade
            }
            None => entry.clade.clone(),
        };
        style.add_modifier(
            modifier
                .clone()
                .selector(Selector::new().attribute("C", clade))
                .fill(&entry.fill)
                .legend(&entry.legend, legend_priority),
        );
    }
    style.legend.add_counter = Some(add_counter);

    for (clade_name, (base_clade, aa)) in &extra_clades {
        for antigen in chart.antigens_mut() {
            if antigen.has_clade(base_clade) && antigen.matches_aa(aa) {
                antigen.add_clade(clade_name);
            }
        }
        for serum in chart.sera_mut() {
            if serum.has_clade(base_clade) && serum.matches_aa(aa) {
                serum.add_clade(clade_name);
            }
        }
    }
    style_name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::test_chart::sample;
    use serde_json::json;

    #[test]
    fn test_clade_styles_and_sub_clades() {
        let mut chart = sample();
        chart.antigens_mut()[1].add_clade("3C.2A");
        chart.antigens_mut()[2].add_clade("3C.2A");
        let entries: Vec<CladeEntry> = serde_json::from_value(json!([
            {"clade": "3C.2A", "fill": "red", "legend": "3C.2A"},
            {"clade": "3C.2A", "aa": "2K", "fill": "blue", "legend": "3C.2A 2K"},
            {"fill": "green"}
        ]))
        .unwrap();
        let name = clades(&mut chart, "clades", &entries, &default_modifier(), true);
        assert_eq!(name, "-clades");

        let style = &chart.styles()["-clades"];
        assert_eq!(style.modifiers.len(), 2);
        assert_eq!(style.modifiers[0].legend.as_ref().unwrap().priority, 99);
        assert_eq!(style.modifiers[1].legend.as_ref().unwrap().priority, 98);
        assert_eq!(style.modifiers[1].selector, Some(Selector::new().attribute("C", "3C.2A 2K")));
        assert_eq!(style.legend.add_counter, Some(true));

        // 只有抗原 1 有序列 QKIPG
        assert!(chart.antigens()[1].has_clade("3C.2A 2K"));
        assert!(!chart.antigens()[2].has_clade("3C.2A 2K"));
    }
}
