use crate::domain::model::Metadata;
use crate::utils::error::{AeError, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub const DIRECTORY_CONFIG_FILENAME: &str = "ae.toml";

/// 前處理產出以此開頭時，名稱不再經過解析器
pub const NO_PARSE_PREFIX: &str = "<no-parse>";

#[derive(Debug, Clone, Default, Deserialize)]
struct DirectoryConfigFile {
    #[serde(default)]
    virus_name: Vec<RuleSpec>,
    #[serde(default)]
    date: Vec<RuleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct RuleSpec {
    pattern: String,
    replacement: String,
    lab: Option<String>,
}

#[derive(Debug, Clone)]
struct RewriteRule {
    regex: Regex,
    replacement: String,
    lab: Option<String>,
}

impl RewriteRule {
    fn compile(spec: RuleSpec) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(&spec.pattern)?,
            replacement: spec.replacement,
            lab: spec.lab.map(|lab| lab.to_uppercase()),
        })
    }

    fn applies_to(&self, metadata: &Metadata) -> bool {
        match &self.lab {
            None => true,
            Some(lab) => metadata
                .get("lab")
                .and_then(|value| value.as_str())
                .is_some_and(|value| value.eq_ignore_ascii_case(lab)),
        }
    }
}

/// 一個目錄的改寫規則；第一條符合的規則生效
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    virus_name: Vec<RewriteRule>,
    date: Vec<RewriteRule>,
}

impl Preprocessor {
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: DirectoryConfigFile = toml::from_str(text)?;
        Ok(Self {
            virus_name: file.virus_name.into_iter().map(RewriteRule::compile).collect::<Result<_>>()?,
            date: file.date.into_iter().map(RewriteRule::compile).collect::<Result<_>>()?,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|e| AeError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })
    }

    pub fn preprocess_virus_name(&self, name: &str, metadata: &Metadata) -> String {
        apply(&self.virus_name, name, metadata)
    }

    pub fn preprocess_date(&self, date: &str, metadata: &Metadata) -> String {
        apply(&self.date, date, metadata)
    }
}

fn apply(rules: &[RewriteRule], source: &str, metadata: &Metadata) -> String {
    rules
        .iter()
        .find(|rule| rule.applies_to(metadata) && rule.regex.is_match(source))
        .map(|rule| rule.regex.replace(source, rule.replacement.as_str()).into_owned())
        .unwrap_or_else(|| source.to_string())
}

/// 依目錄快取的前處理器；目錄內沒有 `ae.toml` 時記錄為 None
#[derive(Debug, Default)]
pub struct DirectoryPreprocessors {
    loaded: Mutex<HashMap<PathBuf, Option<Arc<Preprocessor>>>>,
}

impl DirectoryPreprocessors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_directory(&self, directory: &Path) -> Option<Arc<Preprocessor>> {
        let mut loaded = match self.loaded.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(cached) = loaded.get(directory) {
            return cached.clone();
        }

        let path = directory.join(DIRECTORY_CONFIG_FILENAME);
        let preprocessor = if path.is_file() {
            match Preprocessor::from_file(&path) {
                Ok(preprocessor) => {
                    debug!("📂 Loaded directory preprocessor {}", path.display());
                    Some(Arc::new(preprocessor))
                }
                Err(e) => {
                    warn!("⚠️ Ignoring directory preprocessor: {}", e);
                    None
                }
            }
        } else {
            None
        };
        loaded.insert(directory.to_path_buf(), preprocessor.clone());
        preprocessor
    }

    pub fn for_file(&self, filename: &Path) -> Option<Arc<Preprocessor>> {
        self.for_directory(filename.parent().unwrap_or_else(|| Path::new(".")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const RULES: &str = r#"
[[virus_name]]
pattern = "^A/SWINE/(.*)$"
replacement = "<no-parse>A(H1N1)/SWINE/$1"

[[virus_name]]
pattern = "^B/VIC/(.*)$"
replacement = "B/VICTORIA/$1"
lab = "cdc"

[[date]]
pattern = "^(\\d{4})(\\d{2})$"
replacement = "$1-$2"
"#;

    #[test]
    fn test_rules_apply_in_order() {
        let preprocessor = Preprocessor::from_toml(RULES).unwrap();
        let metadata = Metadata::new();
        assert_eq!(
            preprocessor.preprocess_virus_name("A/SWINE/IOWA/1/2020", &metadata),
            "<no-parse>A(H1N1)/SWINE/IOWA/1/2020"
        );
        assert_eq!(preprocessor.preprocess_date("202003", &metadata), "2020-03");
        assert_eq!(preprocessor.preprocess_date("2020-03-01", &metadata), "2020-03-01");
    }

    #[test]
    fn test_lab_scoped_rule() {
        let preprocessor = Preprocessor::from_toml(RULES).unwrap();
        let mut metadata = Metadata::new();
        assert_eq!(preprocessor.preprocess_virus_name("B/VIC/1/2020", &metadata), "B/VIC/1/2020");
        metadata.insert("lab".to_string(), json!("CDC"));
        assert_eq!(
            preprocessor.preprocess_virus_name("B/VIC/1/2020", &metadata),
            "B/VICTORIA/1/2020"
        );
    }

    #[test]
    fn test_directory_cache() {
        let dir = TempDir::new().unwrap();
        let preprocessors = DirectoryPreprocessors::new();
        assert!(preprocessors.for_directory(dir.path()).is_none());

        let other = TempDir::new().unwrap();
        std::fs::write(other.path().join(DIRECTORY_CONFIG_FILENAME), RULES).unwrap();
        let loaded = preprocessors.for_file(&other.path().join("seq.fas")).unwrap();
        assert_eq!(loaded.preprocess_date("201912", &Metadata::new()), "2019-12");
    }
}
