use crate::chart::AntigenSerum;
use crate::domain::ports::Backend;
use crate::virus::name_abbreviated_location_isolation_year;

/// 圖上標籤用的短名稱
pub struct NameGenerator<'a, B: ?Sized> {
    backend: &'a B,
}

impl<'a, B: Backend + ?Sized> NameGenerator<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// `DAR/6/21-egg`
    pub fn location_isolation_year2_passage_type(&self, entry: &dyn AntigenSerum) -> String {
        format!(
            "{}-{}",
            name_abbreviated_location_isolation_year(entry.name(), self.backend),
            self.passage_type(entry)
        )
    }

    /// `DAR/21-egg`
    pub fn location_year2_passage_type(&self, entry: &dyn AntigenSerum) -> String {
        let parsed = self.backend.parse_name(entry.name(), None);
        let name = if parsed.parts.location.is_empty() {
            entry.name().to_string()
        } else {
            format!(
                "{}/{}",
                self.backend.abbreviation(&parsed.parts.location),
                parsed.parts.year.get(2..).unwrap_or_default()
            )
        };
        format!("{}-{}", name, self.passage_type(entry))
    }

    /// reassortant 一律視為 egg
    pub fn passage_type(&self, entry: &dyn AntigenSerum) -> String {
        if entry.reassortant().is_empty() {
            self.backend.passage_type(entry.passage()).as_str().to_string()
        } else {
            format!("{}-egg", entry.reassortant())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BuiltinBackend, LocationDb};
    use crate::chart::test_chart::sample;
    use crate::domain::parsing::LocationInfo;

    #[test]
    fn test_generated_names() {
        let mut locdb = LocationDb::default();
        locdb.insert(
            "DARWIN",
            LocationInfo {
                abbreviation: "DAR".to_string(),
                ..LocationInfo::default()
            },
        );
        let backend = BuiltinBackend::with_locdb(locdb);
        let generator = NameGenerator::new(&backend);
        let chart = sample();
        assert_eq!(
            generator.location_isolation_year2_passage_type(&chart.antigens()[0]),
            "DAR/6/21-IVR-227-egg"
        );
        assert_eq!(generator.location_year2_passage_type(&chart.antigens()[2]), "DAR/21-cell");
    }
}
