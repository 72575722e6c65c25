use crate::domain::model::Metadata;
use crate::domain::ports::Backend;
use crate::sequences::source::context::Context;
use crate::sequences::source::parse::parse_name;
use serde_json::Value;

/// 一般 FASTA 名稱：只有病毒名稱，實驗室由呼叫端提示
pub fn regular_name_parser<B: Backend + ?Sized>(
    name: &str,
    lab_hint: Option<&str>,
    context: &mut Context<'_>,
    backend: &B,
) -> Metadata {
    let mut metadata = Metadata::new();
    if let Some(lab) = lab_hint {
        metadata.insert("lab".to_string(), Value::String(lab.to_string()));
    }
    let parsed = parse_name(name.trim(), &metadata, context, backend);
    metadata.insert("name".to_string(), Value::String(parsed));
    metadata
}
