// 內建解析後端：以 regex 與 chrono 實作名稱、繼代、日期解析與地點查詢

pub mod date;
pub mod locdb;
pub mod name;
pub mod passage;

pub use locdb::LocationDb;

use crate::domain::parsing::{
    DateFormatOptions, LocationInfo, NameParsingResult, PassageParsingResult, PassageType,
};
use crate::domain::ports::{DateFormatter, LocationLookup, PassageParser, VirusNameParser};
use crate::utils::error::Result;

#[derive(Debug, Clone, Default)]
pub struct BuiltinBackend {
    locdb: LocationDb,
}

impl BuiltinBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locdb(locdb: LocationDb) -> Self {
        Self { locdb }
    }

    pub fn locdb(&self) -> &LocationDb {
        &self.locdb
    }
}

impl VirusNameParser for BuiltinBackend {
    fn parse_name(&self, source: &str, type_subtype: Option<&str>) -> NameParsingResult {
        name::parse(source, type_subtype, &self.locdb)
    }
}

impl PassageParser for BuiltinBackend {
    fn parse_passage(&self, source: &str) -> PassageParsingResult {
        passage::parse(source)
    }

    fn passage_type(&self, source: &str) -> PassageType {
        passage::passage_type(source)
    }

    fn without_date<'a>(&self, source: &'a str) -> &'a str {
        passage::without_date(source)
    }
}

impl DateFormatter for BuiltinBackend {
    fn format_date(&self, source: &str, options: DateFormatOptions) -> Result<String> {
        date::format(source, options)
    }
}

impl LocationLookup for BuiltinBackend {
    fn location(&self, name: &str) -> Option<LocationInfo> {
        self.locdb.get(name).cloned()
    }
}
