use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 只擷取第一個表格，表格前後的其他行一律忽略
pub fn org_table_to_dict(data: &str) -> Vec<BTreeMap<String, String>> {
    let mut result = Vec::new();
    let mut field_names: Vec<String> = Vec::new();

    for line in data.lines() {
        if line.starts_with("|-") {
            continue;
        } else if line.starts_with('|') {
            let cells: Vec<&str> = line.split('|').collect();
            let fields: Vec<String> = cells[1..cells.len().saturating_sub(1).max(1)]
                .iter()
                .map(|field| field.trim().to_string())
                .collect();
            if field_names.is_empty() {
                field_names = fields;
            } else {
                let record = field_names
                    .iter()
                    .zip(fields)
                    .filter(|(_, value)| !value.is_empty())
                    .map(|(key, value)| (key.clone(), value))
                    .collect();
                result.push(record);
            }
        } else if !field_names.is_empty() {
            break;
        }
    }

    result
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn dict_to_org_table(
    data: &[Map<String, Value>],
    field_order: &[&str],
    add_org_mode_wrapper: bool,
) -> String {
    let mut fields: Vec<String> = field_order.iter().map(|field| field.to_string()).collect();
    let mut field_size: BTreeMap<String, usize> = fields
        .iter()
        .map(|field| (field.clone(), field.chars().count()))
        .collect();

    for record in data {
        for (field, value) in record {
            let width = field.chars().count().max(cell_text(value).chars().count());
            let size = field_size.entry(field.clone()).or_insert(0);
            if !fields.contains(field) {
                fields.push(field.clone());
            }
            *size = (*size).max(width);
        }
    }

    let width_of = |field: &String| field_size.get(field).copied().unwrap_or(0);

    let mut lines = Vec::with_capacity(data.len() + 4);
    if add_org_mode_wrapper {
        lines.push("# -*- Org -*-".to_string());
    }
    lines.push(format!(
        "| {} |",
        fields
            .iter()
            .map(|field| format!("{:<width$}", field, width = width_of(field)))
            .collect::<Vec<_>>()
            .join(" | ")
    ));
    lines.push(format!(
        "|{}|",
        fields
            .iter()
            .map(|field| "-".repeat(width_of(field) + 2))
            .collect::<Vec<_>>()
            .join("+")
    ));
    for record in data {
        let mut line = String::from("|");
        for field in &fields {
            let value = record.get(field).unwrap_or(&Value::Null);
            let text = cell_text(value);
            let width = width_of(field);
            if value.is_number() || value.is_boolean() {
                line.push_str(&format!(" {:>width$} |", text, width = width));
            } else {
                line.push_str(&format!(" {:<width$} |", text, width = width));
            }
        }
        lines.push(line);
    }
    if add_org_mode_wrapper {
        lines.push("# -*-".to_string());
    }
    lines.join("\n")
}
