use crate::chart::{AntigenSerum, Chart, LabelStyle, Modifier, Only, Selector};
use crate::domain::ports::Backend;
use crate::semantic::find::{AntigenFinder, FoundByPassage};
use crate::semantic::name_generator::NameGenerator;
use crate::semantic::name_passage::is_truthy;
use crate::semantic::{PassageKind, StyleNames};
use crate::utils::error::Result;
use crate::utils::org::{dict_to_org_table, org_table_to_dict};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write;
use tracing::info;

pub const SEROLOGY_KEY: &str = "serology";

/// 血清學資料中的一個抗原名稱
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SerologySource {
    pub name: String,
    #[serde(default)]
    pub passage: Option<PassageKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SerologyAntigens {
    pub name: String,
    pub found: FoundByPassage,
}

/// 依輸入順序回傳有找到的名稱
pub fn find<B: Backend + ?Sized>(chart: &Chart, backend: &B, sources: &[SerologySource]) -> Vec<SerologyAntigens> {
    let finder = AntigenFinder::new(chart, backend);
    let data: Vec<SerologyAntigens> = sources
        .iter()
        .map(|source| SerologyAntigens {
            name: source.name.clone(),
            found: finder.find(&source.name, source.passage),
        })
        .filter(|entry| !entry.found.is_empty())
        .collect();
    info!("🧪 Serology: {} of {} names found", data.len(), sources.len());
    data
}

pub fn report(data: &[SerologyAntigens]) -> String {
    let mut text = String::from(">>> Serology\n");
    for entry in data {
        let _ = writeln!(text, "{}", entry.name);
        for (kind, antigens) in &entry.found {
            for (index, found) in antigens.iter().enumerate() {
                let prefix = if index == 0 { &kind.as_str()[..4.min(kind.as_str().len())] } else { "" };
                let _ = writeln!(
                    text,
                    "  {:<4}  {:4} {} (layers: {})",
                    prefix,
                    found.no,
                    found.designation,
                    found.layers.len()
                );
            }
        }
        text.push('\n');
    }
    text
}

/// 圖上一個血清學抗原的點與標籤設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerologyPoint {
    pub no: usize,
    pub designation: String,
    /// 標籤位移
    pub lox: f64,
    pub loy: f64,
    pub fill: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_width: Option<f64>,
}

pub fn default_field_order() -> &'static [&'static str] {
    &["no", "designation", "lox", "loy", "fill", "label", "label_size", "size", "outline_width"]
}

/// 收集有 `"serology"` 屬性的抗原，依 designation 排序
pub fn collect_data_for_styles<B: Backend + ?Sized>(chart: &Chart, backend: &B) -> Vec<SerologyPoint> {
    let generator = NameGenerator::new(backend);
    let mut data: Vec<SerologyPoint> = chart
        .antigens()
        .iter()
        .enumerate()
        .filter(|(_, antigen)| antigen.semantic_get(SEROLOGY_KEY).is_some_and(is_truthy))
        .map(|(no, antigen)| SerologyPoint {
            no,
            designation: antigen.designation(),
            lox: 0.0,
            loy: 1.0,
            fill: "orange".to_string(),
            label: generator.location_isolation_year2_passage_type(antigen),
            label_size: None,
            size: None,
            outline_width: None,
        })
        .collect();
    data.sort_by(|a, b| a.designation.cmp(&b.designation));
    data
}

/// 供人工編輯的 org 表格
pub fn to_org(data: &[SerologyPoint]) -> Result<String> {
    let records = data
        .iter()
        .map(|point| -> Result<Map<String, Value>> {
            match serde_json::to_value(point)? {
                Value::Object(map) => Ok(map),
                _ => Ok(Map::new()),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(dict_to_org_table(&records, default_field_order(), true))
}

/// 讀回編輯過的 org 表格，數值欄位由文字轉回
pub fn from_org(text: &str) -> Result<Vec<SerologyPoint>> {
    org_table_to_dict(text)
        .into_iter()
        .map(|record| -> Result<SerologyPoint> {
            let map: Map<String, Value> = record
                .into_iter()
                .map(|(key, value)| {
                    let value = match key.as_str() {
                        "no" => value.parse::<u64>().map(Value::from).unwrap_or(Value::String(value)),
                        "lox" | "loy" | "label_size" | "size" | "outline_width" => {
                            value.parse::<f64>().map(Value::from).unwrap_or(Value::String(value))
                        }
                        _ => Value::String(value),
                    };
                    (key, value)
                })
                .collect();
            Ok(serde_json::from_value(Value::Object(map))?)
        })
        .collect()
}

fn point_modifier(point: &SerologyPoint, label_modifier: &LabelStyle) -> Modifier {
    let mut modifier = Modifier::new().fill(&point.fill);
    if let Some(size) = point.size {
        modifier = modifier.size(size);
    }
    if let Some(outline_width) = point.outline_width {
        modifier = modifier.outline_width(outline_width);
    }
    modifier.label(LabelStyle {
        offset: Some([point.lox, point.loy]),
        text: Some(point.label.clone()),
        size: point.label_size.or(label_modifier.size),
        ..label_modifier.clone()
    })
}

/// 所有血清學抗原套用 common_modifier，再逐一加上點與標籤
pub fn style(
    chart: &mut Chart,
    style_name: &str,
    data: &[SerologyPoint],
    common_modifier: &Modifier,
    label_modifier: &LabelStyle,
    priority: i64,
) -> StyleNames {
    let style = chart.style_mut(style_name);
    style.set_priority(priority).add_modifier(
        common_modifier
            .clone()
            .selector(Selector::new().attribute(SEROLOGY_KEY, true))
            .only(Only::Antigens)
            .raise(),
    );
    for point in data {
        style.add_modifier(
            point_modifier(point, label_modifier)
                .selector(Selector::index(point.no))
                .only(Only::Antigens),
        );
    }
    StyleNames::from([style_name.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BuiltinBackend;
    use crate::chart::test_chart::sample;

    #[test]
    fn test_find_keeps_order_and_drops_missing() {
        let chart = sample();
        let sources: Vec<SerologySource> = serde_json::from_value(serde_json::json!([
            {"name": "KANSAS/14/2017"},
            {"name": "PERTH/16/2009"},
            {"name": "DARWIN/6/2021", "passage": "reassortant"}
        ]))
        .unwrap();
        let data = find(&chart, &BuiltinBackend::new(), &sources);
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].name, "KANSAS/14/2017");
        let text = report(&data);
        assert!(text.contains("  cell     1 A(H3N2)/KANSAS/14/2017 SIAT1 (layers: 1)"));
        assert!(text.contains("  reas     0 A(H3N2)/DARWIN/6/2021 IVR-227 E2 (layers: 1)"));
    }

    #[test]
    fn test_collect_style_and_org_round_trip() {
        let mut chart = sample();
        let backend = BuiltinBackend::new();
        chart.antigens_mut()[1].set_semantic(SEROLOGY_KEY, Value::Bool(true));
        let data = collect_data_for_styles(&chart, &backend);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].label, "KANSAS/14/17-cell");

        let org = to_org(&data).unwrap();
        assert_eq!(from_org(&org).unwrap(), data);

        style(
            &mut chart,
            "-serology",
            &data,
            &Modifier::new().outline("black").fill(":bright"),
            &LabelStyle {
                size: Some(26.0),
                ..LabelStyle::default()
            },
            1000,
        );
        let modifiers = &chart.styles()["-serology"].modifiers;
        assert_eq!(modifiers.len(), 2);
        let label = modifiers[1].label.as_ref().unwrap();
        assert_eq!(label.offset, Some([0.0, 1.0]));
        assert_eq!(label.size, Some(26.0));
        assert_eq!(modifiers[1].fill.as_deref(), Some("orange"));
    }
}
