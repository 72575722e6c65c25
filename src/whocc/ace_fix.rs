use crate::chart::Chart;
use crate::domain::parsing::unrecognized_locations;
use crate::domain::ports::Backend;
use std::collections::BTreeSet;
use std::fmt::Write;
use tracing::warn;

/// 抗原/血清上名稱修正需要的欄位
struct NameFields<'e> {
    name: &'e mut String,
    reassortant: &'e mut String,
    annotations: &'e mut Vec<String>,
    passage: &'e mut String,
}

/// 以名稱解析器正規化 ace 中的抗原與血清名稱，reassortant 與 extra 移到各自的欄位
pub struct AceDataFixer<'a, B: ?Sized> {
    backend: &'a B,
    type_subtype: String,
    report_data: Vec<String>,
    not_found_locations: BTreeSet<String>,
}

impl<'a, B: Backend + ?Sized> AceDataFixer<'a, B> {
    pub fn new(chart: &Chart, backend: &'a B) -> Self {
        let type_subtype = chart.type_subtype();
        if type_subtype.is_empty() {
            warn!("⚠️ no type_subtype in ace data: {}", chart.name());
        }
        Self {
            backend,
            type_subtype,
            report_data: Vec::new(),
            not_found_locations: BTreeSet::new(),
        }
    }

    pub fn process(&mut self, chart: &mut Chart) {
        self.antigen_names(chart);
        self.serum_names(chart);
        self.antigen_passages(chart);
        self.serum_passages(chart);
    }

    pub fn antigen_names(&mut self, chart: &mut Chart) {
        for (no, antigen) in chart.antigens_mut().iter_mut().enumerate() {
            self.fix_name(antigen_fields(antigen), "AG", no);
        }
    }

    pub fn serum_names(&mut self, chart: &mut Chart) {
        for (no, serum) in chart.sera_mut().iter_mut().enumerate() {
            self.fix_name(serum_fields(serum), "SR", no);
        }
    }

    pub fn antigen_passages(&mut self, chart: &mut Chart) {
        for (no, antigen) in chart.antigens_mut().iter_mut().enumerate() {
            self.fix_passage(antigen_fields(antigen), "AG", no);
        }
    }

    pub fn serum_passages(&mut self, chart: &mut Chart) {
        for (no, serum) in chart.sera_mut().iter_mut().enumerate() {
            self.fix_passage(serum_fields(serum), "SR", no);
        }
    }

    pub fn report_data(&self) -> &[String] {
        &self.report_data
    }

    pub fn not_found_locations(&self) -> &BTreeSet<String> {
        &self.not_found_locations
    }

    pub fn report(&self) -> String {
        let mut text = String::new();
        if !self.report_data.is_empty() {
            let _ = writeln!(text, ">>> Messages ({}):", self.report_data.len());
            let _ = writeln!(text, "{}", self.report_data.join("\n"));
        }
        if !self.not_found_locations.is_empty() {
            let _ = writeln!(text, ">>> Unrecognized locations ({}):", self.not_found_locations.len());
            for location in &self.not_found_locations {
                let _ = writeln!(text, "    {}", location);
            }
        }
        text
    }

    fn fix_name(&mut self, fields: NameFields<'_>, ag_sr: &str, no: usize) {
        let type_subtype = (!self.type_subtype.is_empty()).then_some(self.type_subtype.as_str());
        let parsed = self.backend.parse_name(fields.name, type_subtype);
        if !parsed.good() {
            let messages: Vec<String> = parsed.messages.iter().map(ToString::to_string).collect();
            self.report_data.push(format!(
                ">>  {} {:3} name parsing failed \"{}\": {:?}",
                ag_sr, no, fields.name, messages
            ));
            self.not_found_locations.extend(unrecognized_locations(&parsed.messages));
            return;
        }

        let parts = parsed.parts;
        let name = match type_subtype {
            Some(type_subtype) => format!("{}/{}", type_subtype, parts.host_location_isolation_year()),
            None => parts.host_location_isolation_year(),
        };
        if name != *fields.name {
            self.report_data
                .push(format!("    {} {:3} name: \"{}\" <- \"{}\"", ag_sr, no, name, fields.name));
            *fields.name = name;
        }
        if !parts.reassortant.is_empty() {
            if fields.reassortant.is_empty() {
                *fields.reassortant = parts.reassortant.clone();
                self.report_data
                    .push(format!("    {} {:3} reassortant: \"{}\"", ag_sr, no, parts.reassortant));
            } else {
                *fields.reassortant = format!("{} {}", fields.reassortant, parts.reassortant);
                self.report_data
                    .push(format!("    {} {:3} additional reassortant: \"{}\"", ag_sr, no, parts.reassortant));
            }
        }
        if !parts.extra.is_empty() {
            fields.annotations.push(parts.extra.clone());
            self.report_data
                .push(format!(">>  {} {:3} extra: {:?}", ag_sr, no, fields.annotations));
        }
    }

    /// 可解析的繼代換成正規化後的寫法
    fn fix_passage(&mut self, fields: NameFields<'_>, ag_sr: &str, no: usize) {
        if fields.passage.is_empty() {
            return;
        }
        let parsed = self.backend.parse_passage(fields.passage);
        if parsed.good() && parsed.passage() != fields.passage.as_str() {
            self.report_data.push(format!(
                "    {} {:3} passage: \"{}\" <- \"{}\"",
                ag_sr,
                no,
                parsed.passage(),
                fields.passage
            ));
            *fields.passage = parsed.passage;
        }
    }
}

fn antigen_fields(antigen: &mut crate::chart::Antigen) -> NameFields<'_> {
    NameFields {
        name: &mut antigen.name,
        reassortant: &mut antigen.reassortant,
        annotations: &mut antigen.annotations,
        passage: &mut antigen.passage,
    }
}

fn serum_fields(serum: &mut crate::chart::Serum) -> NameFields<'_> {
    NameFields {
        name: &mut serum.name,
        reassortant: &mut serum.reassortant,
        annotations: &mut serum.annotations,
        passage: &mut serum.passage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BuiltinBackend, LocationDb};
    use crate::domain::parsing::LocationInfo;

    const ACE: &str = r#"{
  "c": {
    "i": {"V": "A(H3N2)", "l": "CDC"},
    "a": [
      {"N": "A/Darwin/6/2021 IVR-227", "P": "e2"},
      {"N": "A(H3N2)/DARWIN/9/2021", "R": "NYMC-1", "P": "SIAT1"},
      {"N": "A/ATLANTIS/1/2020", "P": "MDCK1"}
    ],
    "s": [{"N": "DARWIN/6/2021", "I": "F1"}]
  }
}"#;

    fn backend() -> BuiltinBackend {
        let mut locdb = LocationDb::default();
        locdb.insert("DARWIN", LocationInfo::default());
        BuiltinBackend::with_locdb(locdb)
    }

    #[test]
    fn test_fix_names() {
        let mut chart = Chart::from_json_str(ACE).unwrap();
        let backend = backend();
        let mut fixer = AceDataFixer::new(&chart, &backend);
        fixer.process(&mut chart);

        let antigens = chart.antigens();
        assert_eq!(antigens[0].name, "A(H3N2)/DARWIN/6/2021");
        assert_eq!(antigens[0].reassortant, "IVR-227");
        assert_eq!(antigens[0].passage, "E2");
        assert_eq!(antigens[1].name, "A(H3N2)/DARWIN/9/2021");
        assert_eq!(antigens[1].reassortant, "NYMC-1");
        assert_eq!(antigens[2].name, "A/ATLANTIS/1/2020");
        assert_eq!(chart.sera()[0].name, "A(H3N2)/DARWIN/6/2021");

        assert!(fixer.not_found_locations().contains("ATLANTIS"));
        let report = fixer.report();
        assert!(report.contains("    AG   0 name: \"A(H3N2)/DARWIN/6/2021\" <- \"A/Darwin/6/2021 IVR-227\""));
        assert!(report.contains("    AG   0 reassortant: \"IVR-227\""));
        assert!(report.contains("    AG   0 passage: \"E2\" <- \"e2\""));
        assert!(report.contains(">>> Unrecognized locations (1):\n    ATLANTIS\n"));
    }
}
