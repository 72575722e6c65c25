use crate::chart::{AntigenSerum, Chart, Modifier, Only, Selector};
use crate::domain::ports::Backend;
use crate::semantic::find::{format_found, report_layout, select_by_name_and_passage, FoundAntigen, FoundByPassage};
use crate::semantic::{PassageKind, DEFAULT_STYLE_PRIORITY};
use crate::virus::add_subtype_prefix;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const VACCINES_STYLE_NAME: &str = "-vaccines";

/// 一個疫苗株；passage 未指定時 cell、egg、reassortant 都找
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VaccineEntry {
    pub name: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub passage: Option<PassageKind>,
    #[serde(default)]
    pub surrogate: bool,
}

#[derive(Debug, Clone)]
struct VaccineData {
    year: String,
    surrogate: bool,
    found: FoundByPassage,
}

/// 找到的疫苗抗原，依年份排列輸出
#[derive(Debug, Clone, Default)]
pub struct VaccineReport {
    data: BTreeMap<String, VaccineData>,
    antigen_no_width: usize,
    has_layers: bool,
}

impl VaccineReport {
    pub fn new(chart: &Chart) -> Self {
        let (antigen_no_width, has_layers) = report_layout(chart);
        Self {
            data: BTreeMap::new(),
            antigen_no_width,
            has_layers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn report(&self) -> String {
        let mut names: Vec<&String> = self.data.keys().collect();
        names.sort_by_key(|name| &self.data[*name].year);
        names
            .into_iter()
            .map(|name| self.format_entry(name, &self.data[name]))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_entry(&self, name: &str, data: &VaccineData) -> String {
        let subentries = data
            .found
            .iter()
            .map(|(kind, antigens)| format_found(*kind, antigens, self.antigen_no_width, self.has_layers))
            .collect::<Vec<_>>()
            .join("\n  ");
        format!(
            "Vaccine {}{} [{}]\n  {}",
            name,
            if data.surrogate { " surrogate" } else { "" },
            data.year,
            subentries
        )
    }
}

/// 標記疫苗抗原 `"V" = 年份 (+ "s" 代表替代株)`，每種繼代只標層數最多的一個
pub fn vaccine<B: Backend + ?Sized>(chart: &mut Chart, backend: &B, entry: &VaccineEntry, report: &mut VaccineReport) {
    let vaccine_name = add_subtype_prefix(&chart.type_subtype(), &entry.name);
    let year = entry.year.clone().unwrap_or_default();
    let value = format!("{}{}", year, if entry.surrogate { "s" } else { "" });
    let mut found = FoundByPassage::new();
    for kind in PassageKind::selected(entry.passage) {
        let antigens = select_by_name_and_passage(chart, backend, &vaccine_name, kind, false);
        if let Some(first) = antigens.first() {
            chart.antigens_mut()[*first].set_semantic("V", Value::from(value.as_str()));
            let found_antigens = antigens.iter().map(|no| FoundAntigen::new(chart, *no)).collect();
            found.insert(kind, found_antigens);
        }
    }
    if found.is_empty() {
        debug!("💉 vaccine {} not found", vaccine_name);
        return;
    }
    report.data.insert(
        entry.name.clone(),
        VaccineData {
            year,
            surrogate: entry.surrogate,
            found,
        },
    );
}

pub fn vaccines<B: Backend + ?Sized>(chart: &mut Chart, backend: &B, entries: &[VaccineEntry]) -> VaccineReport {
    let mut report = VaccineReport::new(chart);
    for entry in entries {
        vaccine(chart, backend, entry, &mut report);
    }
    report
}

pub fn default_modifier() -> Modifier {
    Modifier::new().outline("black").raise().size(70.0).only(Only::Antigens)
}

/// 找不到任何疫苗時不建立樣式
pub fn vaccines_and_plot_style<B: Backend + ?Sized>(
    chart: &mut Chart,
    backend: &B,
    entries: &[VaccineEntry],
    modifier: &Modifier,
) -> Option<(String, VaccineReport)> {
    let report = vaccines(chart, backend, entries);
    if report.is_empty() {
        return None;
    }
    chart
        .style_mut(VACCINES_STYLE_NAME)
        .set_priority(DEFAULT_STYLE_PRIORITY)
        .add_modifier(modifier.clone().selector(Selector::new().attribute("V", "")));
    info!("💉 {} vaccines marked", report.len());
    Some((VACCINES_STYLE_NAME.to_string(), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BuiltinBackend;
    use crate::chart::test_chart::sample;
    use serde_json::json;

    fn entries() -> Vec<VaccineEntry> {
        serde_json::from_value(json!([
            {"name": "DARWIN/6/2021", "year": "2022"},
            {"name": "KANSAS/14/2017", "year": "2019", "passage": "cell", "surrogate": true},
            {"name": "PERTH/16/2009", "year": "2010"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_vaccine_attributes() {
        let mut chart = sample();
        let report = vaccines(&mut chart, &BuiltinBackend::new(), &entries());
        assert_eq!(report.len(), 2);
        assert_eq!(chart.antigens()[0].semantic_get("V"), Some(&json!("2022")));
        assert_eq!(chart.antigens()[1].semantic_get("V"), Some(&json!("2019s")));
        // 抗原 2 未相連
        assert_eq!(chart.antigens()[2].semantic_get("V"), None);
        assert_eq!(
            report.report(),
            "Vaccine KANSAS/14/2017 surrogate [2019]\n  cel AG 1 A(H3N2)/KANSAS/14/2017 SIAT1\n\
             Vaccine DARWIN/6/2021 [2022]\n  rea AG 0 A(H3N2)/DARWIN/6/2021 IVR-227 E2"
        );
    }

    #[test]
    fn test_vaccines_style() {
        let mut chart = sample();
        let (name, _) =
            vaccines_and_plot_style(&mut chart, &BuiltinBackend::new(), &entries(), &default_modifier()).unwrap();
        assert_eq!(name, VACCINES_STYLE_NAME);
        assert_eq!(chart.styles()[VACCINES_STYLE_NAME].modifiers[0].size, Some(70.0));

        let mut empty = sample();
        let missing: Vec<VaccineEntry> = serde_json::from_value(json!([{"name": "PERTH/16/2009"}])).unwrap();
        assert!(vaccines_and_plot_style(&mut empty, &BuiltinBackend::new(), &missing, &default_modifier()).is_none());
    }
}
