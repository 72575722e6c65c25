use crate::chart::{Antigen, AntigenSerum, Chart, LabelStyle, Modifier, Selector};
use crate::domain::ports::Backend;
use crate::semantic::find::{format_found, report_layout, select_by_name_and_passage, FoundAntigen, FoundByPassage};
use crate::semantic::name_generator::NameGenerator;
use crate::semantic::{PassageKind, StyleNames, DEFAULT_STYLE_PRIORITY};
use crate::virus::add_subtype_prefix;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// `{"name": "Wisconsin/588/2019", "passage": "cell", ...}`，其他欄位原樣保留給屬性值
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamePassageEntry {
    pub name: String,
    #[serde(default)]
    pub passage: Option<PassageKind>,
    #[serde(flatten)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct NamePassageReport {
    data: BTreeMap<String, FoundByPassage>,
    antigen_no_width: usize,
    has_layers: bool,
}

impl NamePassageReport {
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

    /// 依名稱排序
    pub fn report(&self, header_prefix: &str) -> String {
        self.data
            .iter()
            .map(|(name, found)| {
                let subentries = found
                    .iter()
                    .map(|(kind, antigens)| format_found(*kind, antigens, self.antigen_no_width, self.has_layers))
                    .collect::<Vec<_>>()
                    .join("\n  ");
                format!("{}{}\n  {}", header_prefix, name, subentries)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 對每個名稱與繼代種類標記層數最多的抗原 `semantic_key = make_value(entry, antigen)`
pub fn attributes<B, F>(
    chart: &mut Chart,
    backend: &B,
    semantic_key: &str,
    entries: &[NamePassageEntry],
    make_value: F,
) -> NamePassageReport
where
    B: Backend + ?Sized,
    F: Fn(&NamePassageEntry, &Antigen) -> Value,
{
    let mut report = NamePassageReport::new(chart);
    let type_subtype = chart.type_subtype();
    for entry in entries {
        let antigen_name = add_subtype_prefix(&type_subtype, &entry.name.to_uppercase());
        let mut found = FoundByPassage::new();
        for kind in PassageKind::selected(entry.passage) {
            let antigens = select_by_name_and_passage(chart, backend, &antigen_name, kind, false);
            if let Some(first) = antigens.first() {
                let value = make_value(entry, &chart.antigens()[*first]);
                chart.antigens_mut()[*first].set_semantic(semantic_key, value);
                found.insert(kind, antigens.iter().map(|no| FoundAntigen::new(chart, *no)).collect());
            }
        }
        if !found.is_empty() {
            report.data.insert(entry.name.clone(), found);
        }
    }
    report
}

/// 有 semantic_key 的抗原套用 point_style，另外每個抗原加上 `DAR/21-egg` 形式的標籤
pub fn style<B: Backend + ?Sized>(
    chart: &mut Chart,
    backend: &B,
    style_name: &str,
    semantic_key: &str,
    point_style: &Modifier,
    label_style: &LabelStyle,
) -> StyleNames {
    let generator = NameGenerator::new(backend);
    let labels: Vec<(usize, String)> = chart
        .antigens()
        .iter()
        .enumerate()
        .filter(|(_, antigen)| antigen.semantic_get(semantic_key).is_some_and(is_truthy))
        .map(|(no, antigen)| (no, generator.location_year2_passage_type(antigen)))
        .collect();

    let style = chart.style_mut(style_name);
    style
        .set_priority(DEFAULT_STYLE_PRIORITY)
        .add_modifier(point_style.clone().selector(Selector::new().attribute(semantic_key, true)));
    for (antigen_no, text) in labels {
        let label = LabelStyle {
            text: Some(text),
            ..label_style.clone()
        };
        style.add_modifier(Modifier::new().selector(Selector::index(antigen_no)).outline_width(4.0).label(label));
    }
    StyleNames::from([style_name.to_string()])
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BuiltinBackend;
    use crate::chart::test_chart::sample;
    use serde_json::json;

    #[test]
    fn test_attributes_and_report() {
        let mut chart = sample();
        let backend = BuiltinBackend::new();
        let entries: Vec<NamePassageEntry> = serde_json::from_value(json!([
            {"name": "Kansas/14/2017", "passage": "cell", "color": "red"},
            {"name": "Darwin/6/2021"}
        ]))
        .unwrap();
        let report = attributes(&mut chart, &backend, "serology", &entries, |entry, _| {
            entry.args.get("color").cloned().unwrap_or(Value::Bool(true))
        });
        assert_eq!(chart.antigens()[1].semantic_get("serology"), Some(&json!("red")));
        assert_eq!(chart.antigens()[0].semantic_get("serology"), Some(&json!(true)));
        assert_eq!(
            report.report("> "),
            "> Darwin/6/2021\n  rea AG 0 A(H3N2)/DARWIN/6/2021 IVR-227 E2\n\
             > Kansas/14/2017\n  cel AG 1 A(H3N2)/KANSAS/14/2017 SIAT1"
        );
    }

    #[test]
    fn test_label_style() {
        let mut chart = sample();
        chart.antigens_mut()[1].set_semantic("serology", Value::Bool(true));
        let backend = BuiltinBackend::new();
        style(
            &mut chart,
            &backend,
            "-serology",
            "serology",
            &Modifier::new().outline("black"),
            &LabelStyle {
                size: Some(36.0),
                ..LabelStyle::default()
            },
        );
        let modifiers = &chart.styles()["-serology"].modifiers;
        assert_eq!(modifiers.len(), 2);
        let label = modifiers[1].label.as_ref().unwrap();
        assert_eq!(label.text.as_deref(), Some("KANSAS/17-cell"));
        assert_eq!(label.size, Some(36.0));
    }

    #[test]
    fn test_truthy() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!({"a": 1})));
    }
}
