use crate::utils::error::{AeError, Result};
use crate::whocc::data_fix::DATA_FIX_FILENAME;
use crate::whocc::extractor::TableExtractor;
use std::path::{Path, PathBuf};

pub const TABLES_DIR_ENV: &str = "WHOCC_TABLES_DIR";

const OUTPUT_DIR_FORMAT: &str = "{virus_type_lineage}-{assay_low_rbc}-{lab_low}";
const STEM_FORMAT: &str = "{virus_type_lineage}-{assay_low_rbc}-{lab_low}-{table_date:%Y%m%d}";

fn require_dir(description: &str, dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(AeError::ConfigError {
            message: format!("{} \"{}\" does not exist", description, dir.display()),
        })
    }
}

/// WHO CC 力價表目錄的路徑規則
#[derive(Debug, Clone)]
pub struct TableDir {
    root: PathBuf,
}

impl TableDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 由 `WHOCC_TABLES_DIR` 取得
    pub fn from_env() -> Result<Self> {
        match std::env::var(TABLES_DIR_ENV) {
            Ok(root) if !root.is_empty() => Ok(Self::new(root)),
            _ => Err(AeError::MissingConfigError {
                field: TABLES_DIR_ENV.to_string(),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output_dir<E: TableExtractor + ?Sized>(&self, extractor: &E) -> PathBuf {
        self.root.join(extractor.format_assay_data(OUTPUT_DIR_FORMAT))
    }

    pub fn stem<E: TableExtractor + ?Sized>(&self, extractor: &E) -> String {
        extractor.format_assay_data(STEM_FORMAT)
    }

    pub fn torg_pathname<E: TableExtractor + ?Sized>(&self, extractor: &E, torg_dir: Option<&Path>) -> Result<PathBuf> {
        let torg_dir = torg_dir.map_or_else(|| self.output_dir(extractor).join("torg"), Path::to_path_buf);
        require_dir("Torg output dir", &torg_dir)?;
        Ok(torg_dir.join(format!("{}.torg", self.stem(extractor))))
    }

    pub fn xlsx_pathname<E: TableExtractor + ?Sized>(&self, extractor: &E, xlsx_dir: Option<&Path>) -> Result<PathBuf> {
        let xlsx_dir = xlsx_dir.map_or_else(|| self.output_dir(extractor).join("xlsx"), Path::to_path_buf);
        require_dir("Xlsx output dir", &xlsx_dir)?;
        Ok(xlsx_dir.join(format!("{}.xlsx", self.stem(extractor))))
    }

    /// 回傳 ace 路徑，prn_read 時另外回傳 `prn-read/` 下的路徑
    pub fn ace_pathname<E: TableExtractor + ?Sized>(
        &self,
        extractor: &E,
        prn_read: bool,
        ace_dir: Option<&Path>,
    ) -> Result<(PathBuf, Option<PathBuf>)> {
        let output_dir = ace_dir.map_or_else(|| self.output_dir(extractor), Path::to_path_buf);
        require_dir("ace output dir", &output_dir)?;
        let ace_filename = format!("{}.ace", self.stem(extractor));
        let prn_read_pathname = if prn_read {
            let prn_read_dir = match ace_dir {
                Some(dir) => dir.to_path_buf(),
                None => output_dir.join("prn-read"),
            };
            require_dir("prn_read_dir", &prn_read_dir)?;
            Some(prn_read_dir.join(&ace_filename))
        } else {
            None
        };
        Ok((output_dir.join(ace_filename), prn_read_pathname))
    }

    pub fn data_fix_pathname<E: TableExtractor + ?Sized>(&self, extractor: &E) -> PathBuf {
        self.output_dir(extractor).join(DATA_FIX_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whocc::extractor::test_table::sample;
    use tempfile::TempDir;

    #[test]
    fn test_pathnames() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let table_dir = TableDir::new(root.path());
        let extractor = sample();
        let output_dir = root.path().join("h3-hi-turkey-cdc");
        assert_eq!(table_dir.output_dir(&extractor), output_dir);

        assert!(table_dir.torg_pathname(&extractor, None).is_err());
        std::fs::create_dir_all(output_dir.join("torg"))?;
        assert_eq!(
            table_dir.torg_pathname(&extractor, None)?,
            output_dir.join("torg").join("h3-hi-turkey-cdc-20210421.torg")
        );

        let (ace, prn_read) = table_dir.ace_pathname(&extractor, false, None)?;
        assert_eq!(ace, output_dir.join("h3-hi-turkey-cdc-20210421.ace"));
        assert!(prn_read.is_none());
        assert!(table_dir.ace_pathname(&extractor, true, None).is_err());
        assert_eq!(table_dir.data_fix_pathname(&extractor), output_dir.join(DATA_FIX_FILENAME));
        Ok(())
    }
}
