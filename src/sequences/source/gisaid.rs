use crate::domain::model::Metadata;
use crate::domain::ports::Backend;
use crate::sequences::source::context::Context;
use crate::sequences::source::parse::parse_date;
use crate::utils::error::{AeError, Result};
use serde_json::Value;

pub const GISAID_SEPARATOR: &str = "_|_";
const GISAID_FIELD_COUNT: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldParser {
    Plain,
    Subtype,
    Date,
}

/// GISAID 匯出時以單一字母標示的欄位
fn field_key(key: &str) -> Option<(&'static str, FieldParser)> {
    let entry = match key {
        "a" => ("isolate_id", FieldParser::Plain),
        "b" => ("type_subtype", FieldParser::Subtype),
        "c" => ("passage", FieldParser::Plain),
        "d" => ("lineage", FieldParser::Plain),
        "e" => ("date", FieldParser::Date),
        "f" => ("submitter", FieldParser::Plain),
        "g" => ("sample_id_by_sample_provider", FieldParser::Plain),
        "h" => ("lab_id", FieldParser::Plain),
        "i" => ("gisaid_last_modified", FieldParser::Date),
        "j" => ("originating_lab", FieldParser::Plain),
        "k" => ("lab", FieldParser::Plain),
        "l" => ("gisaid_segment", FieldParser::Plain),
        "m" => ("gisaid_segment_number", FieldParser::Plain),
        "n" => ("gisaid_identifier", FieldParser::Plain),
        "o" => ("gisaid_dna_accession_no", FieldParser::Plain),
        "p" => ("gisaid_dna_insdc", FieldParser::Plain),
        _ => return None,
    };
    Some(entry)
}

/// 非 GISAID 名稱回傳 `Ok(None)`；欄位數不符或欄位無法辨識時回傳錯誤
pub fn gisaid_name_parser<B: Backend + ?Sized>(
    name: &str,
    context: &mut Context<'_>,
    backend: &B,
) -> Result<Option<Metadata>> {
    let fields: Vec<&str> = name.split(GISAID_SEPARATOR).collect();
    if fields.len() == 1 {
        return Ok(None);
    }
    if fields.len() != GISAID_FIELD_COUNT || !fields[GISAID_FIELD_COUNT - 1].is_empty() {
        return Err(AeError::InvalidGisaidName {
            fields: fields.len(),
            name: name.to_string(),
        });
    }

    let mut metadata = Metadata::new();
    metadata.insert("name".to_string(), Value::String(fields[0].to_string()));
    for field in &fields[1..GISAID_FIELD_COUNT - 1] {
        let invalid_field = || AeError::InvalidGisaidField {
            field: field.to_string(),
            name: name.to_string(),
        };
        let (key, value) = field.split_once('=').ok_or_else(invalid_field)?;
        let (field_name, parser) = field_key(key).ok_or_else(invalid_field)?;
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let parsed = match parser {
            FieldParser::Plain => value.to_string(),
            FieldParser::Subtype => value.to_uppercase(),
            FieldParser::Date => parse_date(value, &metadata, context, backend),
        };
        metadata.insert(field_name.to_string(), Value::String(parsed));
    }
    Ok(Some(metadata))
}
