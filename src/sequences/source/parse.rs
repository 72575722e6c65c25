use crate::config::directory_config::NO_PARSE_PREFIX;
use crate::domain::model::Metadata;
use crate::domain::parsing::{unrecognized_locations, DateFormatOptions};
use crate::domain::ports::Backend;
use crate::sequences::source::context::Context;
use tracing::warn;

/// 解析病毒名稱；失敗時記錄訊息並回傳原始名稱
pub fn parse_name<B: Backend + ?Sized>(
    name: &str,
    metadata: &Metadata,
    context: &mut Context<'_>,
    backend: &B,
) -> String {
    let preprocessed = context.preprocess_virus_name(name, metadata);
    if let Some(unparsed) = preprocessed.strip_prefix(NO_PARSE_PREFIX) {
        return unparsed.to_string();
    }

    let result = backend.parse_name(&preprocessed, None);
    if result.good() {
        return result.parts.name();
    }

    let value = if preprocessed != name {
        format!("{} (original: {})", preprocessed, name)
    } else {
        name.to_string()
    };
    for message in &result.messages {
        context.message("name", value.clone(), message.to_string(), Some(message.clone()));
    }
    context.unrecognized_locations(unrecognized_locations(&result.messages));
    name.to_string()
}

/// 解析日期為 `YYYY-MM-DD`（允許不完整）；CDC 的日期為月在前
pub fn parse_date<B: Backend + ?Sized>(
    date: &str,
    metadata: &Metadata,
    context: &mut Context<'_>,
    backend: &B,
) -> String {
    let preprocessed = context.preprocess_date(date, metadata);
    if preprocessed.is_empty() {
        return preprocessed;
    }

    let options = DateFormatOptions {
        allow_incomplete: true,
        month_first: metadata.get("lab").and_then(|lab| lab.as_str()) == Some("CDC"),
    };
    match backend.format_date(&preprocessed, options) {
        Ok(formatted) => formatted,
        Err(e) => {
            let value = if preprocessed != date {
                format!("{} (original: {})", preprocessed, date)
            } else {
                date.to_string()
            };
            warn!("⚠️ Date not parsed: {} @@ {}:{}", value, context.filename().display(), context.line_no());
            context.message("date", value, e.to_string(), None);
            date.to_string()
        }
    }
}
