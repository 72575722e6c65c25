// 語意屬性 (T) 標記與對應的繪圖樣式 (R)

pub mod clade;
pub mod continent;
pub mod find;
pub mod front_style;
pub mod name_generator;
pub mod name_passage;
pub mod new_compared_to;
pub mod older_than;
pub mod pale;
pub mod passage;
pub mod reference;
pub mod select_mark;
pub mod serology;
pub mod serum_circle;
pub mod serum_coverage;
pub mod style;
pub mod time_series;
pub mod vaccine;

use crate::chart::AntigenSerum;
use crate::domain::ports::PassageParser;
use crate::utils::error::AeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 樣式函式回傳的樣式名稱集合
pub type StyleNames = BTreeSet<String>;

pub const DEFAULT_STYLE_PRIORITY: i64 = 1000;

/// 尋找疫苗株等抗原時使用的繼代分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassageKind {
    Cell,
    Egg,
    Reassortant,
}

impl PassageKind {
    pub const ALL: [PassageKind; 3] = [PassageKind::Cell, PassageKind::Egg, PassageKind::Reassortant];

    pub fn as_str(self) -> &'static str {
        match self {
            PassageKind::Cell => "cell",
            PassageKind::Egg => "egg",
            PassageKind::Reassortant => "reassortant",
        }
    }

    /// 指定時只找該種，否則三種都找
    pub fn selected(passage: Option<PassageKind>) -> Vec<PassageKind> {
        match passage {
            Some(kind) => vec![kind],
            None => Self::ALL.to_vec(),
        }
    }
}

impl fmt::Display for PassageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassageKind {
    type Err = AeError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source {
            "cell" => Ok(PassageKind::Cell),
            "egg" => Ok(PassageKind::Egg),
            "reassortant" => Ok(PassageKind::Reassortant),
            other => Err(AeError::InvalidConfigValueError {
                field: "passage".to_string(),
                value: other.to_string(),
                reason: "expected cell, egg or reassortant".to_string(),
            }),
        }
    }
}

/// reassortant 優先；有 reassortant 的不算 egg
pub fn passage_is<P, E>(parser: &P, entry: &E, kind: PassageKind) -> bool
where
    P: PassageParser + ?Sized,
    E: AntigenSerum + ?Sized,
{
    let reassortant = !entry.reassortant().is_empty();
    match kind {
        PassageKind::Reassortant => reassortant,
        PassageKind::Egg => !reassortant && parser.is_egg(entry.passage()),
        PassageKind::Cell => !reassortant && parser.is_cell(entry.passage()),
    }
}

/// 十進位位數，0 視為 1 位
pub fn num_digits(value: usize) -> usize {
    value.checked_ilog10().map_or(1, |digits| digits as usize + 1)
}
