use crate::domain::parsing::ParserMessage;
use crate::utils::org::dict_to_org_table;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// 讀取來源時遇到的非致命問題
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub field: String,
    pub value: String,
    pub message: String,
    pub message_raw: Option<ParserMessage>,
    pub filename: PathBuf,
    pub line_no: usize,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: [{}] {}: {}",
            self.filename.display(),
            self.line_no,
            self.field,
            self.value,
            self.message
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageCollector {
    pub messages: Vec<Message>,
    pub unrecognized_locations: BTreeSet<String>,
}

impl MessageCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn add_unrecognized_locations(&mut self, locations: BTreeSet<String>) {
        self.unrecognized_locations.extend(locations);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.unrecognized_locations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// org-mode 報表：訊息表格，其後列出無法辨識的地點
    pub fn report_org(&self) -> String {
        report_org(&self.messages, &self.unrecognized_locations)
    }
}

pub fn report_org(messages: &[Message], unrecognized_locations: &BTreeSet<String>) -> String {
    let rows: Vec<Map<String, Value>> = messages
        .iter()
        .map(|message| {
            let mut row = Map::new();
            row.insert("file".to_string(), json!(message.filename.display().to_string()));
            row.insert("line".to_string(), json!(message.line_no));
            row.insert("field".to_string(), json!(message.field));
            row.insert("value".to_string(), json!(message.value));
            row.insert("message".to_string(), json!(message.message));
            row
        })
        .collect();

    let mut report = String::from("# -*- Org -*-\n\n* Messages\n\n");
    if rows.is_empty() {
        report.push_str("none\n");
    } else {
        report.push_str(&dict_to_org_table(&rows, &["file", "line", "field", "value", "message"], false));
        report.push('\n');
    }
    if !unrecognized_locations.is_empty() {
        report.push_str(&format!("\n* Unrecognized locations ({})\n\n", unrecognized_locations.len()));
        for location in unrecognized_locations {
            report.push_str(&format!("- {}\n", location));
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message {
            field: "date".to_string(),
            value: "31/31/2020".to_string(),
            message: "no such day".to_string(),
            message_raw: None,
            filename: PathBuf::from("in/seq.fas"),
            line_no: 7,
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(message().to_string(), "in/seq.fas:7: [date] 31/31/2020: no such day");
    }

    #[test]
    fn test_report_org() {
        let mut collector = MessageCollector::new();
        collector.push(message());
        collector.add_unrecognized_locations(BTreeSet::from(["ATLANTIS".to_string()]));
        let report = collector.report_org();
        assert!(report.starts_with("# -*- Org -*-"));
        assert!(report.contains("| in/seq.fas |"));
        assert!(report.contains("* Unrecognized locations (1)"));
        assert!(report.contains("- ATLANTIS"));
    }
}
