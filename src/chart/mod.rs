// ace 圖表資料模型與文字報表

pub mod ace;
pub mod info;
pub mod styles;
pub mod text;

pub use ace::{AceDocument, Antigen, AntigenSerum, Info, Projection, Serum, Titers};
pub use styles::{LabelStyle, Modifier, Only, PlotStyle, Selector};

use crate::utils::error::{AeError, Result};
use crate::utils::open_file;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// 一張抗原圖 (ace 文件)
#[derive(Debug, Clone, Default)]
pub struct Chart {
    document: AceDocument,
}

impl Chart {
    pub fn new(document: AceDocument) -> Self {
        Self { document }
    }

    /// 讀取 .ace（gzip 或純 JSON）
    pub fn read(path: &Path) -> Result<Self> {
        let text = open_file::read_to_string(path)?;
        let chart = Self::from_json_str(&text).map_err(|e| AeError::ChartError {
            message: format!("{}: {}", path.display(), e),
        })?;
        debug!(
            "📈 Read chart {} {}:{}",
            path.display(),
            chart.number_of_antigens(),
            chart.number_of_sera()
        );
        Ok(chart)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.document)?)
    }

    /// `.gz` 結尾時壓縮輸出
    pub fn write(&self, path: &Path) -> Result<()> {
        open_file::write_string(path, &self.to_json_string()?)
    }

    pub fn document(&self) -> &AceDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut AceDocument {
        &mut self.document
    }

    pub fn info(&self) -> &Info {
        &self.document.chart.info
    }

    pub fn info_mut(&mut self) -> &mut Info {
        &mut self.document.chart.info
    }

    pub fn name(&self) -> String {
        self.info().make_name()
    }

    /// 圖表本身沒有 subtype 時取第一個來源表的
    pub fn type_subtype(&self) -> String {
        let info = self.info();
        if !info.type_subtype.is_empty() {
            return info.type_subtype.clone();
        }
        info.sources
            .iter()
            .map(|source| source.type_subtype.as_str())
            .find(|type_subtype| !type_subtype.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    pub fn antigens(&self) -> &[Antigen] {
        &self.document.chart.antigens
    }

    pub fn antigens_mut(&mut self) -> &mut [Antigen] {
        &mut self.document.chart.antigens
    }

    pub fn sera(&self) -> &[Serum] {
        &self.document.chart.sera
    }

    pub fn sera_mut(&mut self) -> &mut [Serum] {
        &mut self.document.chart.sera
    }

    pub fn number_of_antigens(&self) -> usize {
        self.antigens().len()
    }

    pub fn number_of_sera(&self) -> usize {
        self.sera().len()
    }

    pub fn serum_point_no(&self, serum_no: usize) -> usize {
        self.number_of_antigens() + serum_no
    }

    pub fn titers(&self) -> &Titers {
        &self.document.chart.titers
    }

    pub fn forced_column_bases(&self) -> &[f64] {
        &self.document.chart.forced_column_bases
    }

    pub fn projections(&self) -> &[Projection] {
        &self.document.chart.projections
    }

    pub fn number_of_projections(&self) -> usize {
        self.projections().len()
    }

    pub fn projection(&self, projection_no: usize) -> Option<&Projection> {
        self.projections().get(projection_no)
    }

    /// 沒有投影時所有點都視為相連
    pub fn point_connected(&self, point_no: usize) -> bool {
        self.projection(0).map_or(true, |projection| projection.connected(point_no))
    }

    pub fn styles(&self) -> &BTreeMap<String, PlotStyle> {
        &self.document.chart.styles
    }

    pub fn styles_mut(&mut self) -> &mut BTreeMap<String, PlotStyle> {
        &mut self.document.chart.styles
    }

    /// 取得（必要時新增）指定名稱的樣式
    pub fn style_mut(&mut self, name: &str) -> &mut PlotStyle {
        self.styles_mut().entry(name.to_string()).or_default()
    }

    /// 與某個血清同名、同 reassortant、同註記的抗原即為參考抗原
    pub fn reference_antigen_indexes(&self) -> Vec<usize> {
        let serum_keys: HashSet<(&str, &str, &[String])> = self
            .sera()
            .iter()
            .map(|serum| (serum.name.as_str(), serum.reassortant.as_str(), serum.annotations.as_slice()))
            .collect();
        self.antigens()
            .iter()
            .enumerate()
            .filter(|(_, antigen)| {
                serum_keys.contains(&(
                    antigen.name.as_str(),
                    antigen.reassortant.as_str(),
                    antigen.annotations.as_slice(),
                ))
            })
            .map(|(no, _)| no)
            .collect()
    }

    pub fn test_antigen_indexes(&self) -> Vec<usize> {
        let references: HashSet<usize> = self.reference_antigen_indexes().into_iter().collect();
        (0..self.number_of_antigens())
            .filter(|no| !references.contains(no))
            .collect()
    }

    /// 有日期的抗原之最早與最晚日期；test_only 時排除參考抗原
    pub fn antigen_date_range(&self, test_only: bool) -> Option<(String, String)> {
        let indexes = if test_only {
            self.test_antigen_indexes()
        } else {
            (0..self.number_of_antigens()).collect()
        };
        let mut dates = indexes
            .into_iter()
            .map(|no| self.antigens()[no].date.as_str())
            .filter(|date| !date.is_empty());
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(min, max), date| (min.min(date), max.max(date)));
        Some((min.to_string(), max.to_string()))
    }

    /// 前一張圖中沒有的抗原（以 designation 比對）
    pub fn select_new_antigens(&self, previous: &Chart) -> Vec<usize> {
        let known: HashSet<String> = previous.antigens().iter().map(AntigenSerum::designation).collect();
        self.antigens()
            .iter()
            .enumerate()
            .filter(|(_, antigen)| !known.contains(&antigen.designation()))
            .map(|(no, _)| no)
            .collect()
    }

    pub fn select_antigens(&self, mut predicate: impl FnMut(usize, &Antigen) -> bool) -> Vec<usize> {
        self.antigens()
            .iter()
            .enumerate()
            .filter(|(no, antigen)| predicate(*no, antigen))
            .map(|(no, _)| no)
            .collect()
    }

    pub fn select_sera(&self, mut predicate: impl FnMut(usize, &Serum) -> bool) -> Vec<usize> {
        self.sera()
            .iter()
            .enumerate()
            .filter(|(no, serum)| predicate(*no, serum))
            .map(|(no, _)| no)
            .collect()
    }

    /// 依出現的層數由多到少排序（穩定排序）
    pub fn sort_by_number_of_layers_descending(&self, antigen_indexes: &mut [usize]) {
        let titers = self.titers();
        antigen_indexes.sort_by_key(|no| std::cmp::Reverse(titers.layers_with_antigen(*no).len()));
    }
}

#[cfg(test)]
pub(crate) mod test_chart {
    use super::*;

    /// 3 個抗原、2 個血清；抗原 0 為參考抗原
    pub(crate) const SAMPLE_ACE: &str = r#"{
  "  version": "acmacs-ace-v1",
  "c": {
    "i": {"V": "A(H3N2)", "A": "HINT", "l": "CDC", "D": "20210421"},
    "a": [
      {"N": "A(H3N2)/DARWIN/6/2021", "P": "E2", "D": "2021-01-10", "R": "IVR-227"},
      {"N": "A(H3N2)/KANSAS/14/2017", "P": "SIAT1", "D": "2017-12-14", "A": "QKIPG"},
      {"N": "A(H3N2)/DARWIN/6/2021", "P": "MDCK1/SIAT2", "D": "2021-06-01"}
    ],
    "s": [
      {"N": "A(H3N2)/DARWIN/6/2021", "R": "IVR-227", "I": "F1", "P": "E2", "s": "FERRET"},
      {"N": "A(H3N2)/HONG KONG/45/2019", "I": "F2", "P": "SIAT3"}
    ],
    "t": {"l": [["1280", "40"], ["160", "*"], ["640", "<10"]]},
    "C": [10.0, 7.0],
    "P": [{"l": [[0.0, 1.0], [2.0, 3.0], [], [1.0, 1.0], [0.5, 0.5]], "s": 12.345678, "m": "none", "c": "best", "D": [2]}]
  }
}"#;

    pub(crate) fn sample() -> Chart {
        Chart::from_json_str(SAMPLE_ACE).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_chart::sample;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_accessors() {
        let chart = sample();
        assert_eq!(chart.name(), "CDC A(H3N2) HINT 20210421");
        assert_eq!(chart.type_subtype(), "A(H3N2)");
        assert_eq!(chart.titers().titer(2, 1), "<10");
        assert_eq!(chart.reference_antigen_indexes(), vec![0]);
        assert!(chart.point_connected(0));
        assert!(!chart.point_connected(2));
        assert_eq!(chart.serum_point_no(1), 4);
    }

    #[test]
    fn test_antigen_date_range() {
        let chart = sample();
        assert_eq!(
            chart.antigen_date_range(true),
            Some(("2017-12-14".to_string(), "2021-06-01".to_string()))
        );
        assert_eq!(
            chart.antigen_date_range(false),
            Some(("2017-12-14".to_string(), "2021-06-01".to_string()))
        );
        assert_eq!(Chart::default().antigen_date_range(true), None);
    }

    #[test]
    fn test_select_new_antigens() {
        let chart = sample();
        let mut previous = sample();
        previous.document_mut().chart.antigens.truncate(2);
        assert_eq!(chart.select_new_antigens(&previous), vec![2]);
    }

    #[test]
    fn test_write_and_read_gzip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.ace.gz");
        let mut chart = sample();
        chart.style_mut("-pale").set_priority(1000);
        chart.write(&path).unwrap();
        let back = Chart::read(&path).unwrap();
        assert_eq!(back.styles()["-pale"].priority, 1000);
        assert_eq!(back.number_of_antigens(), 3);
    }
}
