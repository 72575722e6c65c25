use crate::utils::error::{AeError, Result};
use crate::utils::open_file;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAntigen {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub passage: String,
    #[serde(default)]
    pub lab_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSerum {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub passage: String,
    #[serde(default)]
    pub serum_id: String,
    #[serde(default)]
    pub conc: String,
    #[serde(default)]
    pub dilut: String,
    #[serde(default)]
    pub boosted: bool,
}

/// 從實驗室力價表 (xlsx 等) 萃取出的資料；萃取本身在外部完成
pub trait TableExtractor {
    fn lab(&self) -> &str;
    fn assay(&self) -> &str;
    fn subtype_without_lineage(&self) -> &str;
    fn lineage(&self) -> &str;
    fn rbc(&self) -> &str;
    fn table_date(&self) -> NaiveDate;
    fn number_of_antigens(&self) -> usize;
    fn number_of_sera(&self) -> usize;
    fn antigen(&self, antigen_no: usize) -> ExtractedAntigen;
    fn serum(&self, serum_no: usize) -> ExtractedSerum;
    fn titer(&self, antigen_no: usize, serum_no: usize) -> String;

    /// `h3`、`h1pdm`、`bvic` 等目錄名稱用的簡寫
    fn virus_type_lineage(&self) -> String {
        match (self.subtype_without_lineage(), self.lineage().to_uppercase().as_str()) {
            ("A(H1N1)", _) => "h1".to_string(),
            ("A(H1N1)PDM09", _) => "h1pdm".to_string(),
            ("A(H3N2)", _) => "h3".to_string(),
            ("B", "VICTORIA") => "bvic".to_string(),
            ("B", "YAMAGATA") => "byam".to_string(),
            ("B", _) => "b".to_string(),
            (other, _) => other.to_string(),
        }
    }

    /// HI 時附上紅血球種類，例如 `hi-turkey`
    fn assay_low_rbc(&self) -> String {
        if self.assay() == "HI" {
            format!("hi-{}", self.rbc().to_lowercase())
        } else {
            self.assay().to_lowercase()
        }
    }

    /// 代換 `{virus_type_lineage}`、`{assay_low_rbc}`、`{lab_low}`、`{table_date:%Y%m%d}` 等欄位
    fn format_assay_data(&self, format: &str) -> String {
        let date = self.table_date();
        [
            ("{virus_type_lineage}", self.virus_type_lineage()),
            ("{virus_type}", self.subtype_without_lineage().to_string()),
            ("{lineage}", self.lineage().to_string()),
            ("{assay_low_rbc}", self.assay_low_rbc()),
            ("{assay_low}", self.assay().to_lowercase()),
            ("{assay}", self.assay().to_string()),
            ("{lab_low}", self.lab().to_lowercase()),
            ("{lab}", self.lab().to_string()),
            ("{rbc}", self.rbc().to_string()),
            ("{table_date:%Y%m%d}", date.format("%Y%m%d").to_string()),
            ("{table_date:%Y-%m-%d}", date.format("%Y-%m-%d").to_string()),
            ("{table_date}", date.format("%Y-%m-%d").to_string()),
        ]
        .iter()
        .fold(format.to_string(), |text, (key, value)| text.replace(key, value))
    }
}

/// 已萃取表格的 JSON 輸出
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonTableExtractor {
    pub lab: String,
    pub assay: String,
    pub subtype: String,
    #[serde(default)]
    pub lineage: String,
    #[serde(default)]
    pub rbc: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub antigens: Vec<ExtractedAntigen>,
    #[serde(default)]
    pub sera: Vec<ExtractedSerum>,
    /// titers[antigen][serum]
    #[serde(default)]
    pub titers: Vec<Vec<String>>,
}

impl JsonTableExtractor {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = open_file::read_to_string(path)?;
        let extractor: Self = serde_json::from_str(&text)?;
        extractor.check()?;
        debug!(
            "📋 Read extracted table {}: {} {} {}:{}",
            path.display(),
            extractor.lab,
            extractor.assay,
            extractor.antigens.len(),
            extractor.sera.len()
        );
        Ok(extractor)
    }

    fn check(&self) -> Result<()> {
        if self.titers.len() != self.antigens.len() {
            return Err(AeError::ChartError {
                message: format!(
                    "extracted table: {} titer rows for {} antigens",
                    self.titers.len(),
                    self.antigens.len()
                ),
            });
        }
        if let Some((row_no, row)) = self.titers.iter().enumerate().find(|(_, row)| row.len() != self.sera.len()) {
            return Err(AeError::ChartError {
                message: format!(
                    "extracted table: titer row {} has {} columns for {} sera",
                    row_no,
                    row.len(),
                    self.sera.len()
                ),
            });
        }
        Ok(())
    }
}

impl TableExtractor for JsonTableExtractor {
    fn lab(&self) -> &str {
        &self.lab
    }

    fn assay(&self) -> &str {
        &self.assay
    }

    fn subtype_without_lineage(&self) -> &str {
        &self.subtype
    }

    fn lineage(&self) -> &str {
        &self.lineage
    }

    fn rbc(&self) -> &str {
        &self.rbc
    }

    fn table_date(&self) -> NaiveDate {
        self.date
    }

    fn number_of_antigens(&self) -> usize {
        self.antigens.len()
    }

    fn number_of_sera(&self) -> usize {
        self.sera.len()
    }

    fn antigen(&self, antigen_no: usize) -> ExtractedAntigen {
        self.antigens.get(antigen_no).cloned().unwrap_or_default()
    }

    fn serum(&self, serum_no: usize) -> ExtractedSerum {
        self.sera.get(serum_no).cloned().unwrap_or_default()
    }

    fn titer(&self, antigen_no: usize, serum_no: usize) -> String {
        self.titers
            .get(antigen_no)
            .and_then(|row| row.get(serum_no))
            .cloned()
            .unwrap_or_else(|| "*".to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::test_table::{sample, SAMPLE_TABLE};
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_assay_data() {
        let table = sample();
        assert_eq!(
            table.format_assay_data("{virus_type_lineage}-{assay_low_rbc}-{lab_low}-{table_date:%Y%m%d}"),
            "h3-hi-turkey-cdc-20210421"
        );
        assert_eq!(table.format_assay_data("{table_date:%Y-%m-%d}"), "2021-04-21");
    }

    #[test]
    fn test_virus_type_lineage_for_b() {
        let table = JsonTableExtractor {
            subtype: "B".to_string(),
            lineage: "Victoria".to_string(),
            assay: "HINT".to_string(),
            ..sample()
        };
        assert_eq!(table.virus_type_lineage(), "bvic");
        assert_eq!(table.assay_low_rbc(), "hint");
    }

    #[test]
    fn test_from_file_checks_shape() -> anyhow::Result<()> {
        let file = NamedTempFile::new()?;
        std::fs::write(file.path(), SAMPLE_TABLE)?;
        let table = JsonTableExtractor::from_file(file.path())?;
        assert_eq!(table.titer(1, 0), "160/320");
        assert_eq!(table.titer(5, 0), "*");

        std::fs::write(file.path(), SAMPLE_TABLE.replace(r#", "<10"]"#, "]"))?;
        assert!(JsonTableExtractor::from_file(file.path()).is_err());
        Ok(())
    }
}
