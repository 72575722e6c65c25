use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    UnrecognizedLocation,
    InvalidYear,
    InvalidSubtype,
    InvalidStructure,
    InvalidPassage,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MessageKind::UnrecognizedLocation => "unrecognized-location",
            MessageKind::InvalidYear => "invalid-year",
            MessageKind::InvalidSubtype => "invalid-subtype",
            MessageKind::InvalidStructure => "invalid-structure",
            MessageKind::InvalidPassage => "invalid-passage",
        })
    }
}

/// 解析器回報的訊息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserMessage {
    pub kind: MessageKind,
    pub value: String,
    pub context: String,
}

impl ParserMessage {
    pub fn new(kind: MessageKind, value: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            context: context.into(),
        }
    }
}

impl fmt::Display for ParserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} -- {}", self.kind, self.value, self.context)
    }
}

pub fn unrecognized_locations(messages: &[ParserMessage]) -> BTreeSet<String> {
    messages
        .iter()
        .filter(|message| message.kind == MessageKind::UnrecognizedLocation)
        .map(|message| message.value.clone())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameParts {
    pub type_subtype: String,
    pub host: String,
    pub location: String,
    pub isolation: String,
    pub year: String,
    pub reassortant: String,
    pub extra: String,
    pub country: String,
    pub continent: String,
}

impl NameParts {
    pub fn host_location_isolation_year(&self) -> String {
        let mut fields: Vec<&str> = Vec::with_capacity(4);
        if !self.host.is_empty() {
            fields.push(&self.host);
        }
        fields.push(&self.location);
        if !self.isolation.is_empty() {
            fields.push(&self.isolation);
        }
        fields.push(&self.year);
        fields.join("/")
    }

    pub fn name(&self) -> String {
        let mut name = if self.type_subtype.is_empty() {
            self.host_location_isolation_year()
        } else {
            format!("{}/{}", self.type_subtype, self.host_location_isolation_year())
        };
        for suffix in [&self.reassortant, &self.extra] {
            if !suffix.is_empty() {
                name.push(' ');
                name.push_str(suffix);
            }
        }
        name
    }

    /// 供 name_format 使用的欄位查詢
    pub fn field(&self, key: &str) -> Option<String> {
        let value = match key {
            "name" => self.name(),
            "host_location_isolation_year" => self.host_location_isolation_year(),
            "type_subtype" => self.type_subtype.clone(),
            "host" => self.host.clone(),
            "location" => self.location.clone(),
            "isolation" => self.isolation.clone(),
            "year" => self.year.clone(),
            "year2" => self.year.get(2..).unwrap_or_default().to_string(),
            "reassortant" => self.reassortant.clone(),
            "extra" => self.extra.clone(),
            "country" => self.country.clone(),
            "continent" => self.continent.clone(),
            _ => return None,
        };
        Some(value)
    }

    pub const FIELDS: &'static [&'static str] = &[
        "continent",
        "country",
        "extra",
        "host",
        "host_location_isolation_year",
        "isolation",
        "location",
        "name",
        "reassortant",
        "type_subtype",
        "year",
        "year2",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParsingResult {
    pub parts: NameParts,
    pub messages: Vec<ParserMessage>,
}

impl NameParsingResult {
    pub fn good(&self) -> bool {
        self.messages.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassageParsingResult {
    pub passage: String,
    pub messages: Vec<ParserMessage>,
}

impl PassageParsingResult {
    pub fn good(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn passage(&self) -> &str {
        &self.passage
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassageType {
    Egg,
    Cell,
    Unknown,
}

impl PassageType {
    pub fn as_str(self) -> &'static str {
        match self {
            PassageType::Egg => "egg",
            PassageType::Cell => "cell",
            PassageType::Unknown => "",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateFormatOptions {
    pub allow_incomplete: bool,
    pub month_first: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub continent: String,
    #[serde(default)]
    pub abbreviation: String,
}
