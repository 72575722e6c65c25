use crate::config::toml_config::ImportConfig;
use crate::domain::ports::{ConfigProvider, SourceKind, Storage};
use crate::utils::error::Result;
use crate::utils::time_series::Period;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_IMPORT_OUTPUT: &str = "sequences.json";

#[derive(Debug, Clone, Parser)]
#[command(name = "ae")]
#[command(about = "Antigenic evolution tools: sequence import, ace charts, WHO CC tables, kateri viewer")]
pub struct Cli {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log in JSON format")]
    pub log_json: bool,

    #[arg(long, global = true, help = "Log system resource usage")]
    pub monitor: bool,

    #[arg(long, short = 'c', global = true, help = "Tools config file (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Location database (JSON, may be gzipped)")]
    pub locdb: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 讀取 FASTA 或 NCBI 目錄，輸出序列 metadata
    ImportSequences(ImportArgs),
    /// org-mode 表格轉 JSON
    OrgToJson {
        input: PathBuf,
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// JSON 陣列轉 org-mode 表格
    JsonToOrg {
        input: PathBuf,
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
        #[arg(long, help = "Do not wrap the table with the \"# -*- Org -*-\" header and \"# -*-\" footer")]
        no_wrapper: bool,
    },
    /// 依抗原日期列出時間區間
    TimeSeries {
        chart: PathBuf,
        #[arg(long, default_value = "month")]
        period: Period,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
    },
    /// 以精簡縮排重新輸出 JSON
    FormatJson {
        input: PathBuf,
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[arg(long, default_value = "1")]
        indent: usize,
        #[arg(long, default_value = "200")]
        width: usize,
    },
    /// 圖表摘要
    ChartInfo {
        chart: PathBuf,
        #[arg(long, help = "Show projections, sources and forced column bases")]
        all: bool,
    },
    /// 圖表力價表
    ChartText { chart: PathBuf },
    /// 正規化 ace 內的抗原與血清名稱
    FixAce {
        input: PathBuf,
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[arg(long, help = "Also normalize passages")]
        passages: bool,
    },
    /// 加上語意屬性與樣式
    Semantic(SemanticArgs),
    /// WHO CC 表格轉 torg
    Torg {
        table: PathBuf,
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[arg(long, help = "Data fix rules (TOML)")]
        data_fix: Option<PathBuf>,
    },
    /// 在 kateri 中顯示圖表
    Kateri(KateriArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[arg(long, help = "Inputs are NCBI directories")]
    pub ncbi: bool,

    #[arg(long)]
    pub lab: Option<String>,

    #[arg(long, short = 'o')]
    pub output: Option<String>,

    #[arg(long, help = "Messages report (org), defaults to <output>.messages.org")]
    pub report: Option<String>,
}

impl ImportArgs {
    /// 命令列未指定的值由設定檔補上
    pub fn apply_defaults(&mut self, defaults: &ImportConfig) {
        if self.lab.is_none() {
            self.lab = defaults.lab_hint.clone();
        }
        if self.output.is_none() {
            self.output = defaults.output_path.clone();
        }
    }
}

impl ConfigProvider for ImportArgs {
    fn source_kind(&self) -> SourceKind {
        if self.ncbi {
            SourceKind::Ncbi
        } else {
            SourceKind::Fasta
        }
    }

    fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    fn output_path(&self) -> &str {
        self.output.as_deref().unwrap_or(DEFAULT_IMPORT_OUTPUT)
    }

    fn lab_hint(&self) -> Option<&str> {
        self.lab.as_deref()
    }

    fn report_path(&self) -> Option<&str> {
        self.report.as_deref()
    }
}

#[derive(Debug, Clone, Args)]
pub struct SemanticArgs {
    pub chart: PathBuf,

    #[arg(long, short = 'o', help = "Output chart, defaults to overwriting the input")]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub passage: bool,

    #[arg(long)]
    pub continent: bool,

    #[arg(long)]
    pub reference: bool,

    #[arg(long, help = "Mark antigens not found in this chart as new")]
    pub new_compared_to: Option<PathBuf>,

    #[arg(long, help = "Conference date (YYYY-MM-DD) for older-than marks")]
    pub older_than: Option<String>,

    #[arg(long)]
    pub pale: bool,

    #[arg(long, help = "Clade styles (JSON array of {clade, aa, fill, legend})")]
    pub clades: Option<PathBuf>,

    #[arg(long, default_value = "clades")]
    pub clades_style: String,

    #[arg(long, help = "Vaccines (JSON array of {name, year, passage, surrogate})")]
    pub vaccines: Option<PathBuf>,

    #[arg(long, help = "Add time series styles")]
    pub time_series: Option<Period>,
}

#[derive(Debug, Clone, Args)]
pub struct KateriArgs {
    pub chart: PathBuf,

    #[arg(long)]
    pub style: Option<String>,

    #[arg(long, help = "Export a PDF to this file and quit")]
    pub pdf: Option<PathBuf>,

    #[arg(long, default_value = "800")]
    pub width: f64,

    #[arg(long, help = "Open the PDF after export")]
    pub open: bool,
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_import_command() {
        let cli = Cli::parse_from(["ae", "--verbose", "import-sequences", "a.fas", "b.fas", "--lab", "CDC"]);
        assert!(cli.verbose);
        let Command::ImportSequences(mut args) = cli.command else {
            panic!("expected import-sequences");
        };
        args.apply_defaults(&ImportConfig {
            lab_hint: Some("CRICK".to_string()),
            output_path: Some("out.json".to_string()),
        });
        assert_eq!(args.inputs().len(), 2);
        assert_eq!(args.source_kind(), SourceKind::Fasta);
        assert_eq!(args.lab_hint(), Some("CDC"));
        assert_eq!(args.output_path(), "out.json");
        assert_eq!(args.report_path(), None);

        let cli = Cli::parse_from(["ae", "import-sequences", "a.fas", "--report", "import.org"]);
        let Command::ImportSequences(args) = cli.command else {
            panic!("expected import-sequences");
        };
        assert_eq!(args.report_path(), Some("import.org"));
    }

    #[test]
    fn test_parse_time_series_period() {
        let cli = Cli::parse_from(["ae", "time-series", "chart.ace", "--period", "year"]);
        assert!(matches!(cli.command, Command::TimeSeries { period: Period::Year, .. }));
        assert!(Cli::try_parse_from(["ae", "time-series", "chart.ace", "--period", "decade"]).is_err());
    }

    #[tokio::test]
    async fn test_local_storage() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().into_owned());
        storage.write_file("nested/out.json", b"[]").await.unwrap();
        assert_eq!(storage.read_file("nested/out.json").await.unwrap(), b"[]");
    }
}
