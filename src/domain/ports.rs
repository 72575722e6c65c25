use crate::domain::model::{Extracted, ImportResult};
use crate::domain::parsing::{
    DateFormatOptions, LocationInfo, NameParsingResult, PassageParsingResult, PassageType,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 序列來源的種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Fasta,
    Ncbi,
}

pub trait ConfigProvider: Send + Sync {
    fn source_kind(&self) -> SourceKind;
    fn inputs(&self) -> &[PathBuf];
    fn output_path(&self) -> &str;
    fn lab_hint(&self) -> Option<&str>;
    /// 未指定時寫到 `{output_path}.messages.org`
    fn report_path(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Extracted>;
    async fn transform(&self, data: Extracted) -> Result<ImportResult>;
    async fn load(&self, result: ImportResult) -> Result<String>;
}

// ----------------------------------------------------------------------
// 解析後端：名稱、繼代 (passage)、日期與地點資料庫

pub trait VirusNameParser {
    fn parse_name(&self, source: &str, type_subtype: Option<&str>) -> NameParsingResult;
}

pub trait PassageParser {
    fn parse_passage(&self, source: &str) -> PassageParsingResult;
    fn passage_type(&self, passage: &str) -> PassageType;
    fn without_date<'a>(&self, passage: &'a str) -> &'a str;

    fn is_egg(&self, passage: &str) -> bool {
        self.passage_type(passage) == PassageType::Egg
    }

    fn is_cell(&self, passage: &str) -> bool {
        self.passage_type(passage) == PassageType::Cell
    }
}

pub trait DateFormatter {
    fn format_date(&self, source: &str, options: DateFormatOptions) -> Result<String>;
}

pub trait LocationLookup {
    fn location(&self, name: &str) -> Option<LocationInfo>;

    fn abbreviation(&self, name: &str) -> String {
        self.location(name)
            .map(|info| info.abbreviation)
            .filter(|abbreviation| !abbreviation.is_empty())
            .unwrap_or_else(|| name.to_string())
    }
}

pub trait Backend: VirusNameParser + PassageParser + DateFormatter + LocationLookup + Send + Sync {}

impl<T> Backend for T where T: VirusNameParser + PassageParser + DateFormatter + LocationLookup + Send + Sync {}
