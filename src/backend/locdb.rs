use crate::domain::parsing::LocationInfo;
use crate::utils::error::Result;
use crate::utils::open_file;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// 地點資料表，鍵為大寫地名
#[derive(Debug, Clone, Default)]
pub struct LocationDb {
    locations: BTreeMap<String, LocationInfo>,
}

impl LocationDb {
    /// 讀取 JSON 物件 `{"NAME": {"country": .., "continent": .., "abbreviation": ..}}`，可為 gzip
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = open_file::read_to_string(path)?;
        let raw: BTreeMap<String, LocationInfo> = serde_json::from_str(&text)?;
        let locations: BTreeMap<String, LocationInfo> =
            raw.into_iter().map(|(name, info)| (name.to_uppercase(), info)).collect();
        info!("🗺️ Loaded {} locations from {}", locations.len(), path.display());
        Ok(Self { locations })
    }

    pub fn insert(&mut self, name: &str, info: LocationInfo) {
        self.locations.insert(name.to_uppercase(), info);
    }

    pub fn get(&self, name: &str) -> Option<&LocationInfo> {
        self.locations.get(&name.to_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_file_uppercases_names() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"Bangkok": {{"country": "THAILAND", "continent": "ASIA", "abbreviation": "BK"}}}}"#
        )
        .unwrap();
        let locdb = LocationDb::from_file(file.path()).unwrap();
        assert_eq!(locdb.len(), 1);
        assert_eq!(locdb.get("bangkok").unwrap().abbreviation, "BK");
    }
}
