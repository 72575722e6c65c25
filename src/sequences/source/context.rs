use crate::config::directory_config::DirectoryPreprocessors;
use crate::domain::model::Metadata;
use crate::domain::parsing::ParserMessage;
use crate::sequences::source::messages::{Message, MessageCollector};
use std::collections::BTreeSet;
use std::path::Path;

/// 單筆紀錄的解析情境：訊息會標上檔名與行號
pub struct Context<'a> {
    collector: &'a mut MessageCollector,
    preprocessors: &'a DirectoryPreprocessors,
    filename: &'a Path,
    line_no: usize,
}

impl<'a> Context<'a> {
    pub fn new(
        collector: &'a mut MessageCollector,
        preprocessors: &'a DirectoryPreprocessors,
        filename: &'a Path,
        line_no: usize,
    ) -> Self {
        Self {
            collector,
            preprocessors,
            filename,
            line_no,
        }
    }

    pub fn filename(&self) -> &Path {
        self.filename
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn message(
        &mut self,
        field: &str,
        value: impl Into<String>,
        message: impl Into<String>,
        message_raw: Option<ParserMessage>,
    ) {
        self.collector.push(Message {
            field: field.to_string(),
            value: value.into(),
            message: message.into(),
            message_raw,
            filename: self.filename.to_path_buf(),
            line_no: self.line_no,
        });
    }

    pub fn unrecognized_locations(&mut self, locations: BTreeSet<String>) {
        self.collector.add_unrecognized_locations(locations);
    }

    pub fn preprocess_virus_name(&self, name: &str, metadata: &Metadata) -> String {
        match self.preprocessors.for_file(self.filename) {
            Some(preprocessor) => preprocessor.preprocess_virus_name(name, metadata),
            None => name.to_string(),
        }
    }

    pub fn preprocess_date(&self, date: &str, metadata: &Metadata) -> String {
        match self.preprocessors.for_file(self.filename) {
            Some(preprocessor) => preprocessor.preprocess_date(date, metadata),
            None => date.to_string(),
        }
    }
}
