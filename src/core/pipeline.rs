use crate::config::directory_config::DirectoryPreprocessors;
use crate::domain::model::{Extracted, ImportResult, SequenceRecord};
use crate::domain::ports::{Backend, ConfigProvider, Pipeline, SourceKind, Storage};
use crate::sequences::source::messages::report_org;
use crate::sequences::source::{read_fasta, MessageCollector, NcbiReader};
use crate::utils::error::Result;
use crate::utils::json::{dumps, DumpOptions};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const MESSAGES_REPORT_SUFFIX: &str = ".messages.org";

/// 序列匯入：讀取來源 → 整理紀錄 → 寫出 JSON 與訊息報表
pub struct SequenceImportPipeline<S: Storage, C: ConfigProvider, B: Backend> {
    storage: S,
    config: C,
    backend: Arc<B>,
    preprocessors: DirectoryPreprocessors,
}

impl<S: Storage, C: ConfigProvider, B: Backend> SequenceImportPipeline<S, C, B> {
    pub fn new(storage: S, config: C, backend: Arc<B>) -> Self {
        Self {
            storage,
            config,
            backend,
            preprocessors: DirectoryPreprocessors::new(),
        }
    }
}

fn subtype_of(record: &SequenceRecord) -> String {
    ["type_subtype", "subtype"]
        .iter()
        .filter_map(|key| record.field(key))
        .find(|value| !value.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, B: Backend> Pipeline for SequenceImportPipeline<S, C, B> {
    async fn extract(&self) -> Result<Extracted> {
        let mut collector = MessageCollector::new();
        let mut records = Vec::new();
        for input in self.config.inputs() {
            debug!("Reading {}", input.display());
            match self.config.source_kind() {
                SourceKind::Fasta => records.extend(read_fasta(
                    input,
                    self.config.lab_hint(),
                    self.backend.as_ref(),
                    &self.preprocessors,
                    &mut collector,
                )?),
                SourceKind::Ncbi => records.extend(
                    NcbiReader::new(self.backend.as_ref(), &self.preprocessors).read(input, &mut collector)?,
                ),
            }
        }
        Ok(Extracted {
            records,
            messages: collector.messages,
            unrecognized_locations: collector.unrecognized_locations,
        })
    }

    async fn transform(&self, data: Extracted) -> Result<ImportResult> {
        let mut result = ImportResult {
            messages: data.messages,
            unrecognized_locations: data.unrecognized_locations,
            ..ImportResult::default()
        };
        for mut record in data.records {
            if record.field("name").map_or(true, str::is_empty) {
                warn!("⚠️ Record without name dropped: {:?}", record.metadata);
                continue;
            }
            record.sequence = record
                .sequence
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| c.to_ascii_uppercase())
                .collect();
            *result.summary.entry(subtype_of(&record)).or_default() += 1;
            result.records.push(record);
        }
        Ok(result)
    }

    async fn load(&self, result: ImportResult) -> Result<String> {
        let output_path = self.config.output_path();
        let records = serde_json::to_value(&result.records)?;
        let text = dumps(&records, &DumpOptions::indented(1))?;
        self.storage.write_file(output_path, text.as_bytes()).await?;
        info!("💾 {} records written to {}", result.records.len(), output_path);

        if !result.messages.is_empty() || !result.unrecognized_locations.is_empty() {
            let report_path = match self.config.report_path() {
                Some(path) => path.to_string(),
                None => format!("{}{}", output_path, MESSAGES_REPORT_SUFFIX),
            };
            let report = report_org(&result.messages, &result.unrecognized_locations);
            self.storage.write_file(&report_path, report.as_bytes()).await?;
            warn!(
                "⚠️ {} messages, {} unrecognized locations, see {}",
                result.messages.len(),
                result.unrecognized_locations.len(),
                report_path
            );
        }
        for (subtype, count) in &result.summary {
            info!("   {:<12} {}", subtype, count);
        }
        Ok(output_path.to_string())
    }
}
