use crate::sequences::source::messages::Message;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type Metadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sequence: String,
}

impl SequenceRecord {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|value| value.as_str())
    }
}

/// 讀取階段的產出：紀錄與過程中收集的訊息
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub records: Vec<SequenceRecord>,
    pub messages: Vec<Message>,
    pub unrecognized_locations: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub records: Vec<SequenceRecord>,
    pub messages: Vec<Message>,
    pub unrecognized_locations: BTreeSet<String>,
    /// 依 subtype 統計的紀錄數
    pub summary: BTreeMap<String, usize>,
}
