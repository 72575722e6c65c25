use crate::utils::error::{AeError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, validate_socket_path, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

pub const CONFIG_FILENAME_ENV: &str = "AE_TOOLS_CONFIG";

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"));

/// 工具共用設定檔
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub kateri: KateriConfig,
    #[serde(default)]
    pub whocc: WhoccConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub locdb: LocdbConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KateriConfig {
    #[serde(default = "default_kateri_executable")]
    pub executable: String,
    #[serde(default = "default_kateri_socket")]
    pub socket: String,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
}

impl Default for KateriConfig {
    fn default() -> Self {
        Self {
            executable: default_kateri_executable(),
            socket: default_kateri_socket(),
            connect_timeout_seconds: default_connect_timeout_seconds(),
        }
    }
}

impl KateriConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

fn default_kateri_executable() -> String {
    crate::kateri::KATERI_EXE.to_string()
}

fn default_kateri_socket() -> String {
    std::env::temp_dir()
        .join(format!("ae-kateri-{}.socket", std::process::id()))
        .to_string_lossy()
        .into_owned()
}

fn default_connect_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhoccConfig {
    pub tables_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    pub lab_hint: Option<String>,
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocdbConfig {
    pub path: Option<String>,
}

impl ToolsConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        debug!("⚙️ Loading config from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        toml::from_str(&processed_content).map_err(|e| AeError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 依序使用指定的檔案、環境變數指定的檔案；都沒有時使用預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_FILENAME_ENV).map(PathBuf::from));
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${WHOCC_TABLES_DIR})，未定義的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn tables_dir(&self) -> Option<PathBuf> {
        self.whocc.tables_dir.as_deref().map(PathBuf::from)
    }

    pub fn locdb_path(&self) -> Option<PathBuf> {
        self.locdb.path.as_deref().map(PathBuf::from)
    }
}

impl Validate for ToolsConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("kateri.executable", &self.kateri.executable)?;
        validate_socket_path("kateri.socket", &self.kateri.socket)?;
        validate_range("kateri.connect_timeout_seconds", self.kateri.connect_timeout_seconds, 1, 600)?;
        if let Some(tables_dir) = &self.whocc.tables_dir {
            validate_path("whocc.tables_dir", tables_dir)?;
        }
        if let Some(output_path) = &self.import.output_path {
            validate_path("import.output_path", output_path)?;
        }
        if let Some(lab_hint) = &self.import.lab_hint {
            validate_non_empty_string("import.lab_hint", lab_hint)?;
        }
        if let Some(path) = &self.locdb.path {
            validate_path("locdb.path", path)?;
        }
        Ok(())
    }
}
