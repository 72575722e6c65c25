use crate::utils::error::Result;
use crate::whocc::extractor::{ExtractedAntigen, ExtractedSerum};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// 修正表格資料的規則檔名，放在 `{tables_dir}/{subtype-assay-lab}/`
pub const DATA_FIX_FILENAME: &str = "ae-whocc-data-fix.toml";

/// 各實驗室/亞型的資料修正點，預設不做任何修改
pub trait DataFix {
    fn lab(&self, lab: String) -> String {
        lab
    }

    fn assay(&self, assay: String) -> String {
        assay
    }

    fn subtype(&self, subtype: String) -> String {
        subtype
    }

    fn rbc(&self, rbc: String) -> String {
        rbc
    }

    fn lineage(&self, lineage: String) -> String {
        lineage
    }

    fn antigen(&self, antigen: ExtractedAntigen, _antigen_no: usize) -> ExtractedAntigen {
        antigen
    }

    fn serum(&self, serum: ExtractedSerum, _serum_no: usize) -> ExtractedSerum {
        serum
    }

    fn titer(&self, titer: String, _antigen_no: usize, _serum_no: usize) -> String {
        titer
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDataFix;

impl DataFix for NoDataFix {}

/// 一條 regex 取代規則；replacement 使用 `$1`/`${name}` 語法
#[derive(Debug, Clone)]
pub struct FieldFix {
    regex: Regex,
    replacement: String,
}

impl FieldFix {
    /// 不分大小寫
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            regex: RegexBuilder::new(pattern).case_insensitive(true).build()?,
            replacement: replacement.to_string(),
        })
    }
}

/// 依序套用所有規則，有變更時記錄
pub fn fix_antigen_serum_field(source: &str, field_name: &str, ag_sr: &str, no: usize, table: &[FieldFix]) -> String {
    let fixed = table.iter().fold(source.to_string(), |text, fix| {
        fix.regex.replace_all(&text, fix.replacement.as_str()).into_owned()
    });
    if fixed != source {
        info!("🔧 {} {:3} {} \"{}\" <- \"{}\"", ag_sr, no, field_name, fixed, source);
    }
    fixed
}

#[derive(Debug, Deserialize)]
struct RuleEntry {
    pattern: String,
    replacement: String,
}

#[derive(Debug, Default, Deserialize)]
struct RuleFile {
    #[serde(default)]
    lab: Option<String>,
    #[serde(default)]
    assay: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    rbc: Option<String>,
    #[serde(default)]
    lineage: Option<String>,
    #[serde(default)]
    antigen_name: Vec<RuleEntry>,
    #[serde(default)]
    antigen_passage: Vec<RuleEntry>,
    #[serde(default)]
    antigen_date: Vec<RuleEntry>,
    #[serde(default)]
    serum_name: Vec<RuleEntry>,
    #[serde(default)]
    serum_passage: Vec<RuleEntry>,
    #[serde(default)]
    serum_id: Vec<RuleEntry>,
    #[serde(default)]
    titer: Vec<RuleEntry>,
}

fn compile(entries: &[RuleEntry]) -> Result<Vec<FieldFix>> {
    entries
        .iter()
        .map(|entry| FieldFix::new(&entry.pattern, &entry.replacement))
        .collect()
}

/// 以 TOML 規則檔描述的修正：表頭欄位直接覆寫，名稱/繼代/力價以 regex 取代
#[derive(Debug, Clone, Default)]
pub struct RuleDataFix {
    lab: Option<String>,
    assay: Option<String>,
    subtype: Option<String>,
    rbc: Option<String>,
    lineage: Option<String>,
    antigen_name: Vec<FieldFix>,
    antigen_passage: Vec<FieldFix>,
    antigen_date: Vec<FieldFix>,
    serum_name: Vec<FieldFix>,
    serum_passage: Vec<FieldFix>,
    serum_id: Vec<FieldFix>,
    titer: Vec<FieldFix>,
}

impl RuleDataFix {
    pub fn from_toml(text: &str) -> Result<Self> {
        let rules: RuleFile = toml::from_str(text)?;
        Ok(Self {
            antigen_name: compile(&rules.antigen_name)?,
            antigen_passage: compile(&rules.antigen_passage)?,
            antigen_date: compile(&rules.antigen_date)?,
            serum_name: compile(&rules.serum_name)?,
            serum_passage: compile(&rules.serum_passage)?,
            serum_id: compile(&rules.serum_id)?,
            titer: compile(&rules.titer)?,
            lab: rules.lab,
            assay: rules.assay,
            subtype: rules.subtype,
            rbc: rules.rbc,
            lineage: rules.lineage,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }
}

impl DataFix for RuleDataFix {
    fn lab(&self, lab: String) -> String {
        self.lab.clone().unwrap_or(lab)
    }

    fn assay(&self, assay: String) -> String {
        self.assay.clone().unwrap_or(assay)
    }

    fn subtype(&self, subtype: String) -> String {
        self.subtype.clone().unwrap_or(subtype)
    }

    fn rbc(&self, rbc: String) -> String {
        self.rbc.clone().unwrap_or(rbc)
    }

    fn lineage(&self, lineage: String) -> String {
        self.lineage.clone().unwrap_or(lineage)
    }

    fn antigen(&self, antigen: ExtractedAntigen, antigen_no: usize) -> ExtractedAntigen {
        ExtractedAntigen {
            name: fix_antigen_serum_field(&antigen.name, "name", "AG", antigen_no, &self.antigen_name),
            passage: fix_antigen_serum_field(&antigen.passage, "passage", "AG", antigen_no, &self.antigen_passage),
            date: fix_antigen_serum_field(&antigen.date, "date", "AG", antigen_no, &self.antigen_date),
            ..antigen
        }
    }

    fn serum(&self, serum: ExtractedSerum, serum_no: usize) -> ExtractedSerum {
        ExtractedSerum {
            name: fix_antigen_serum_field(&serum.name, "name", "SR", serum_no, &self.serum_name),
            passage: fix_antigen_serum_field(&serum.passage, "passage", "SR", serum_no, &self.serum_passage),
            serum_id: fix_antigen_serum_field(&serum.serum_id, "serum_id", "SR", serum_no, &self.serum_id),
            ..serum
        }
    }

    fn titer(&self, titer: String, antigen_no: usize, _serum_no: usize) -> String {
        fix_antigen_serum_field(&titer, "titer", "AG", antigen_no, &self.titer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_field_with_groups() {
        let table = vec![FieldFix::new(r"/IRE/(87733/(?:20)?19|84630/(?:20)?18)", "/IRELAND/$1").unwrap()];
        assert_eq!(
            fix_antigen_serum_field("A/ire/84630/2018", "name", "AG", 3, &table),
            "A/IRELAND/84630/2018"
        );
        assert_eq!(fix_antigen_serum_field("A/PERTH/16/2009", "name", "AG", 4, &table), "A/PERTH/16/2009");
    }

    #[test]
    fn test_rule_data_fix() {
        let fix = RuleDataFix::from_toml(
            r#"
rbc = "turkey"

[[serum_name]]
pattern = "^A/HK/"
replacement = "A/HONG KONG/"

[[titer]]
pattern = "^5$"
replacement = "<10"
"#,
        )
        .unwrap();
        assert_eq!(fix.rbc("TRBC".to_string()), "turkey");
        assert_eq!(fix.lab("CDC".to_string()), "CDC");
        let serum = fix.serum(
            ExtractedSerum {
                name: "A/HK/45/2019".to_string(),
                serum_id: "F2".to_string(),
                ..ExtractedSerum::default()
            },
            1,
        );
        assert_eq!(serum.name, "A/HONG KONG/45/2019");
        assert_eq!(serum.serum_id, "F2");
        assert_eq!(fix.titer("5".to_string(), 0, 0), "<10");
        assert_eq!(fix.titer("50".to_string(), 0, 0), "50");
    }

    #[test]
    fn test_bad_rule_is_error() {
        let result = RuleDataFix::from_toml("[[titer]]\npattern = \"(\"\nreplacement = \"\"\n");
        assert!(result.is_err());
    }
}
