use crate::domain::model::Metadata;
use crate::domain::ports::Backend;
use crate::sequences::source::context::Context;
use crate::sequences::source::gisaid::GISAID_SEPARATOR;
use crate::sequences::source::parse::{parse_date, parse_name};
use crate::utils::error::{AeError, Result};
use serde_json::Value;

const NAOMI_SEPARATOR: char = '|';
const NAOMI_LAB: &str = "CRICK";

/// `name|date|passage[|lab_id]`；不含 `|` 時回傳 `Ok(None)`
pub fn naomi_name_parser<B: Backend + ?Sized>(
    name: &str,
    context: &mut Context<'_>,
    backend: &B,
) -> Result<Option<Metadata>> {
    if !name.contains(NAOMI_SEPARATOR) || name.contains(GISAID_SEPARATOR) {
        return Ok(None);
    }
    let fields: Vec<&str> = name.split(NAOMI_SEPARATOR).map(str::trim).collect();
    if fields.len() != 3 && fields.len() != 4 {
        return Err(AeError::InvalidNaomiName {
            fields: fields.len(),
            name: name.to_string(),
        });
    }

    let mut metadata = Metadata::new();
    metadata.insert("lab".to_string(), Value::String(NAOMI_LAB.to_string()));
    let parsed_name = parse_name(fields[0], &metadata, context, backend);
    metadata.insert("name".to_string(), Value::String(parsed_name));
    let date = parse_date(fields[1], &metadata, context, backend);
    if !date.is_empty() {
        metadata.insert("date".to_string(), Value::String(date));
    }

    if !fields[2].is_empty() {
        let passage = backend.parse_passage(fields[2]);
        if passage.good() {
            metadata.insert("passage".to_string(), Value::String(passage.passage().to_string()));
        } else {
            for message in &passage.messages {
                context.message("passage", fields[2], message.to_string(), Some(message.clone()));
            }
            metadata.insert("passage".to_string(), Value::String(fields[2].to_string()));
        }
    }

    if let Some(lab_id) = fields.get(3).filter(|lab_id| !lab_id.is_empty()) {
        metadata.insert("lab_id".to_string(), Value::String(lab_id.to_string()));
    }
    Ok(Some(metadata))
}
