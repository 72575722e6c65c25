use crate::chart::{Antigen, AntigenSerum, Chart, LabelStyle, Modifier, Only, Selector, Serum};
use crate::utils::org::dict_to_org_table;
use serde_json::{json, Map, Value};
use tracing::debug;

pub fn default_modifier() -> Modifier {
    Modifier::new()
        .size(30.0)
        .raise()
        .fill("orange")
        .outline("black")
        .label(LabelStyle {
            size: Some(10.0),
            ..LabelStyle::default()
        })
}

/// 標籤沒有文字時以 designation 代替
fn with_label(modifier: &Modifier, entry: &dyn AntigenSerum) -> Modifier {
    let mut modifier = modifier.clone();
    if let Some(label) = modifier.label.as_mut() {
        if label.text.is_none() {
            label.text = Some(entry.designation());
        }
    }
    modifier
}

fn selected_record(kind: &str, no: usize, designation: String) -> Map<String, Value> {
    match json!({"ag": kind, "no": no, "designation": designation}) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// 逐點標示選到的抗原/血清，回傳選取結果的 org 表格
pub fn style(
    chart: &mut Chart,
    style_name: &str,
    antigen_selector: Option<&dyn Fn(usize, &Antigen) -> bool>,
    serum_selector: Option<&dyn Fn(usize, &Serum) -> bool>,
    priority: i64,
    modifier: &Modifier,
) -> String {
    let mut modifiers = Vec::new();
    let mut selected = Vec::new();
    if let Some(selector) = antigen_selector {
        for antigen_no in chart.select_antigens(|no, antigen| selector(no, antigen)) {
            let antigen = &chart.antigens()[antigen_no];
            modifiers.push(
                with_label(modifier, antigen)
                    .selector(Selector::index(antigen_no))
                    .only(Only::Antigens),
            );
            selected.push(selected_record("AG", antigen_no, antigen.designation()));
        }
    }
    if let Some(selector) = serum_selector {
        for serum_no in chart.select_sera(|no, serum| selector(no, serum)) {
            let serum = &chart.sera()[serum_no];
            modifiers.push(
                with_label(modifier, serum)
                    .selector(Selector::index(serum_no))
                    .only(Only::Sera),
            );
            selected.push(selected_record("SR", serum_no, serum.designation()));
        }
    }

    let style = chart.style_mut(style_name);
    style.set_priority(priority);
    for modifier in modifiers {
        style.add_modifier(modifier);
    }
    let table = dict_to_org_table(&selected, &["ag", "no", "designation"], false);
    debug!("🎯 {} points marked in {}\n{}", selected.len(), style_name, table);
    table
}
