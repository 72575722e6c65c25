use crate::chart::styles::PlotStyle;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const ACE_VERSION: &str = "acmacs-ace-v1";

fn ace_version() -> String {
    ACE_VERSION.to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// ace 檔案最外層；未知欄位原樣保留
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AceDocument {
    #[serde(rename = "  version", default = "ace_version")]
    pub version: String,
    #[serde(rename = "c", default)]
    pub chart: ChartData,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AceDocument {
    fn default() -> Self {
        Self {
            version: ace_version(),
            chart: ChartData::default(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(rename = "i", default)]
    pub info: Info,
    #[serde(rename = "a", default)]
    pub antigens: Vec<Antigen>,
    #[serde(rename = "s", default)]
    pub sera: Vec<Serum>,
    #[serde(rename = "t", default)]
    pub titers: Titers,
    #[serde(rename = "C", default, skip_serializing_if = "Vec::is_empty")]
    pub forced_column_bases: Vec<f64>,
    #[serde(rename = "P", default, skip_serializing_if = "Vec::is_empty")]
    pub projections: Vec<Projection>,
    #[serde(rename = "R", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<String, PlotStyle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(rename = "v", default, skip_serializing_if = "String::is_empty")]
    pub virus: String,
    #[serde(rename = "V", default, skip_serializing_if = "String::is_empty")]
    pub type_subtype: String,
    #[serde(rename = "A", default, skip_serializing_if = "String::is_empty")]
    pub assay: String,
    #[serde(rename = "D", default, skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(rename = "N", default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "l", default, skip_serializing_if = "String::is_empty")]
    pub lab: String,
    #[serde(rename = "r", default, skip_serializing_if = "String::is_empty")]
    pub rbc: String,
    #[serde(rename = "s", default, skip_serializing_if = "String::is_empty")]
    pub subset: String,
    #[serde(rename = "T", default, skip_serializing_if = "String::is_empty")]
    pub table_type: String,
    #[serde(rename = "S", default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Info>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Info {
    /// 使用者指定的名稱，否則由 lab/subtype/assay/rbc/日期組成
    pub fn make_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        let lab = self.field_or_sources(|info| &info.lab);
        let type_subtype = self.field_or_sources(|info| &info.type_subtype);
        let assay = self.field_or_sources(|info| &info.assay);
        let rbc = self.field_or_sources(|info| &info.rbc);
        let date = if !self.date.is_empty() {
            self.date.clone()
        } else {
            let mut dates: Vec<&str> = self
                .sources
                .iter()
                .map(|source| source.date.as_str())
                .filter(|date| !date.is_empty())
                .collect();
            dates.sort_unstable();
            match (dates.first(), dates.last()) {
                (Some(first), Some(last)) if first != last => format!("{}-{}", first, last),
                (Some(first), _) => first.to_string(),
                _ => String::new(),
            }
        };
        [lab, type_subtype, assay, rbc, date]
            .into_iter()
            .filter(|field| !field.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn field_or_sources(&self, field: impl Fn(&Info) -> &String) -> String {
        let own = field(self);
        if !own.is_empty() {
            return own.clone();
        }
        self.sources
            .iter()
            .map(&field)
            .find(|value| !value.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Antigen {
    #[serde(rename = "N", default)]
    pub name: String,
    #[serde(rename = "a", default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    #[serde(rename = "D", default, skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(rename = "L", default, skip_serializing_if = "String::is_empty")]
    pub lineage: String,
    #[serde(rename = "P", default, skip_serializing_if = "String::is_empty")]
    pub passage: String,
    #[serde(rename = "R", default, skip_serializing_if = "String::is_empty")]
    pub reassortant: String,
    #[serde(rename = "l", default, skip_serializing_if = "Vec::is_empty")]
    pub lab_ids: Vec<String>,
    #[serde(rename = "A", default, skip_serializing_if = "String::is_empty")]
    pub aa: String,
    #[serde(rename = "B", default, skip_serializing_if = "String::is_empty")]
    pub nuc: String,
    #[serde(rename = "T", default, skip_serializing_if = "Map::is_empty")]
    pub semantic: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Serum {
    #[serde(rename = "N", default)]
    pub name: String,
    #[serde(rename = "a", default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    #[serde(rename = "s", default, skip_serializing_if = "String::is_empty")]
    pub serum_species: String,
    #[serde(rename = "L", default, skip_serializing_if = "String::is_empty")]
    pub lineage: String,
    #[serde(rename = "P", default, skip_serializing_if = "String::is_empty")]
    pub passage: String,
    #[serde(rename = "R", default, skip_serializing_if = "String::is_empty")]
    pub reassortant: String,
    #[serde(rename = "I", default, skip_serializing_if = "String::is_empty")]
    pub serum_id: String,
    #[serde(rename = "A", default, skip_serializing_if = "String::is_empty")]
    pub aa: String,
    #[serde(rename = "B", default, skip_serializing_if = "String::is_empty")]
    pub nuc: String,
    #[serde(rename = "T", default, skip_serializing_if = "Map::is_empty")]
    pub semantic: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 抗原與血清共通的存取介面
pub trait AntigenSerum {
    fn name(&self) -> &str;
    fn annotations(&self) -> &[String];
    fn passage(&self) -> &str;
    fn reassortant(&self) -> &str;
    fn lineage(&self) -> &str;
    fn aa(&self) -> &str;
    fn nuc(&self) -> &str;
    fn semantic(&self) -> &Map<String, Value>;
    fn semantic_mut(&mut self) -> &mut Map<String, Value>;
    fn designation(&self) -> String;

    fn distinct(&self) -> bool {
        self.annotations().iter().any(|annotation| annotation == "DISTINCT")
    }

    fn semantic_get(&self, key: &str) -> Option<&Value> {
        self.semantic().get(key)
    }

    fn set_semantic(&mut self, key: &str, value: Value) {
        self.semantic_mut().insert(key.to_string(), value);
    }

    /// `T.C` 為分支 (clade) 清單
    fn clades(&self) -> Vec<&str> {
        self.semantic()
            .get("C")
            .and_then(Value::as_array)
            .map(|clades| clades.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn has_clade(&self, clade: &str) -> bool {
        self.clades().contains(&clade)
    }

    fn add_clade(&mut self, clade: &str) {
        if self.has_clade(clade) {
            return;
        }
        let entry = self
            .semantic_mut()
            .entry("C".to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = Value::Array(Vec::new());
        }
        if let Value::Array(clades) = entry {
            clades.push(Value::String(clade.to_string()));
        }
    }

    /// 1 起算的胺基酸位置
    fn aa_at(&self, pos1: usize) -> Option<char> {
        pos1.checked_sub(1).and_then(|index| self.aa().chars().nth(index))
    }

    fn nuc_at(&self, pos1: usize) -> Option<char> {
        pos1.checked_sub(1).and_then(|index| self.nuc().chars().nth(index))
    }

    /// `"193S 156K"` 形式的胺基酸條件，全部符合才成立
    fn matches_aa(&self, aa_spec: &str) -> bool {
        aa_spec.split_whitespace().all(|item| {
            let digits: String = item.chars().take_while(char::is_ascii_digit).collect();
            let expected = item[digits.len()..].chars().next();
            match (digits.parse::<usize>().ok(), expected) {
                (Some(pos), Some(expected)) => self.aa_at(pos) == Some(expected),
                _ => false,
            }
        })
    }
}

fn join_designation(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

macro_rules! impl_antigen_serum_common {
    () => {
        fn name(&self) -> &str {
            &self.name
        }
        fn annotations(&self) -> &[String] {
            &self.annotations
        }
        fn passage(&self) -> &str {
            &self.passage
        }
        fn reassortant(&self) -> &str {
            &self.reassortant
        }
        fn lineage(&self) -> &str {
            &self.lineage
        }
        fn aa(&self) -> &str {
            &self.aa
        }
        fn nuc(&self) -> &str {
            &self.nuc
        }
        fn semantic(&self) -> &Map<String, Value> {
            &self.semantic
        }
        fn semantic_mut(&mut self) -> &mut Map<String, Value> {
            &mut self.semantic
        }
    };
}

impl AntigenSerum for Antigen {
    impl_antigen_serum_common!();

    fn designation(&self) -> String {
        let mut parts = vec![self.name.as_str(), self.reassortant.as_str()];
        parts.extend(self.annotations.iter().map(String::as_str));
        parts.push(&self.passage);
        join_designation(&parts)
    }
}

impl AntigenSerum for Serum {
    impl_antigen_serum_common!();

    fn designation(&self) -> String {
        let mut parts = vec![self.name.as_str(), self.reassortant.as_str()];
        parts.extend(self.annotations.iter().map(String::as_str));
        parts.push(&self.serum_id);
        join_designation(&parts)
    }
}

/// 稠密 (`l`) 或稀疏 (`d`) 的力價表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TiterTable {
    Dense(Vec<Vec<String>>),
    Sparse(Vec<BTreeMap<String, String>>),
}

pub const DONT_CARE: &str = "*";

impl TiterTable {
    pub fn titer(&self, antigen_no: usize, serum_no: usize) -> &str {
        let titer = match self {
            TiterTable::Dense(rows) => rows.get(antigen_no).and_then(|row| row.get(serum_no)),
            TiterTable::Sparse(rows) => rows
                .get(antigen_no)
                .and_then(|row| row.get(&serum_no.to_string())),
        };
        titer.map_or(DONT_CARE, String::as_str)
    }

    pub fn has_antigen(&self, antigen_no: usize) -> bool {
        match self {
            TiterTable::Dense(rows) => rows
                .get(antigen_no)
                .is_some_and(|row| row.iter().any(|titer| titer != DONT_CARE)),
            TiterTable::Sparse(rows) => rows
                .get(antigen_no)
                .is_some_and(|row| row.values().any(|titer| titer != DONT_CARE)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Titers {
    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    pub dense: Option<Vec<Vec<String>>>,
    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    pub sparse: Option<Vec<BTreeMap<String, String>>>,
    #[serde(rename = "L", default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<TiterTable>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Titers {
    pub fn titer(&self, antigen_no: usize, serum_no: usize) -> &str {
        if let Some(rows) = &self.dense {
            return rows
                .get(antigen_no)
                .and_then(|row| row.get(serum_no))
                .map_or(DONT_CARE, String::as_str);
        }
        if let Some(rows) = &self.sparse {
            return rows
                .get(antigen_no)
                .and_then(|row| row.get(&serum_no.to_string()))
                .map_or(DONT_CARE, String::as_str);
        }
        DONT_CARE
    }

    pub fn number_of_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn layers_with_antigen(&self, antigen_no: usize) -> Vec<usize> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.has_antigen(antigen_no))
            .map(|(layer_no, _)| layer_no)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(rename = "c", default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// 斷開的點為空陣列或含 null
    #[serde(rename = "l", default)]
    pub layout: Vec<Vec<Option<f64>>>,
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<f64>,
    #[serde(rename = "m", default, skip_serializing_if = "String::is_empty")]
    pub minimum_column_basis: String,
    #[serde(rename = "C", default, skip_serializing_if = "Vec::is_empty")]
    pub forced_column_bases: Vec<f64>,
    #[serde(rename = "U", default, skip_serializing_if = "Vec::is_empty")]
    pub unmovable: Vec<usize>,
    #[serde(rename = "D", default, skip_serializing_if = "Vec::is_empty")]
    pub disconnected: Vec<usize>,
    #[serde(rename = "u", default, skip_serializing_if = "Vec::is_empty")]
    pub unmovable_in_the_last_dimension: Vec<usize>,
    #[serde(rename = "d", default, skip_serializing_if = "is_false")]
    pub dodgy_titer_is_regular: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Projection {
    pub fn connected(&self, point_no: usize) -> bool {
        if self.disconnected.contains(&point_no) {
            return false;
        }
        self.layout.get(point_no).is_some_and(|coordinates| {
            !coordinates.is_empty()
                && coordinates
                    .iter()
                    .all(|coordinate| coordinate.is_some_and(f64::is_finite))
        })
    }

    pub fn minimum_column_basis(&self) -> &str {
        if self.minimum_column_basis.is_empty() {
            "none"
        } else {
            &self.minimum_column_basis
        }
    }
}
