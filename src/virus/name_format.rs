use crate::chart::{Antigen, AntigenSerum, Serum};
use crate::domain::parsing::NameParts;
use crate::domain::ports::Backend;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("static regex"));

const ENTRY_KEYS: &[&str] = &[
    "aa",
    "aa-<no>",
    "annotations",
    "designation",
    "laa-<no>",
    "lnuc-<no>",
    "nuc",
    "nuc-<no>",
    "passage",
    "passage_without_date",
    "reassortant",
];
const ANTIGEN_KEYS: &[&str] = &["date", "lab_id"];
const SERUM_KEYS: &[&str] = &["serum_id", "serum_species"];

#[derive(Debug, Clone, Copy)]
pub enum NameSource<'a> {
    Name(&'a str),
    Antigen(&'a Antigen),
    Serum(&'a Serum),
}

impl NameSource<'_> {
    fn name(&self) -> &str {
        match self {
            NameSource::Name(name) => name,
            NameSource::Antigen(antigen) => &antigen.name,
            NameSource::Serum(serum) => &serum.name,
        }
    }

    fn entry(&self) -> Option<&dyn AntigenSerum> {
        match self {
            NameSource::Name(_) => None,
            NameSource::Antigen(antigen) => Some(*antigen),
            NameSource::Serum(serum) => Some(*serum),
        }
    }

    fn available_keys(&self) -> BTreeSet<&'static str> {
        let mut keys: BTreeSet<&'static str> = NameParts::FIELDS.iter().copied().collect();
        match self {
            NameSource::Name(_) => {}
            NameSource::Antigen(_) => keys.extend(ENTRY_KEYS.iter().chain(ANTIGEN_KEYS)),
            NameSource::Serum(_) => keys.extend(ENTRY_KEYS.iter().chain(SERUM_KEYS)),
        }
        keys
    }
}

/// 以 `{key}` 佔位符格式化名稱；`{?}` 列出可用的鍵，未知的鍵原樣保留
pub fn name_format<B: Backend + ?Sized>(source: NameSource<'_>, format: &str, backend: &B) -> String {
    let parts = backend.parse_name(source.name(), None).parts;
    PLACEHOLDER_RE
        .replace_all(format, |captures: &Captures| {
            let key = &captures[1];
            if key == "?" {
                return source
                    .available_keys()
                    .iter()
                    .map(|key| format!("{{{}}}", key))
                    .collect::<Vec<_>>()
                    .join(" ");
            }
            entry_field(&source, key, backend)
                .or_else(|| parts.field(key))
                .unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}

fn entry_field<B: Backend + ?Sized>(source: &NameSource<'_>, key: &str, backend: &B) -> Option<String> {
    let entry = source.entry()?;
    let position = |prefix: &str| key.strip_prefix(prefix).and_then(|pos| pos.parse::<usize>().ok());

    let value = match key {
        "designation" => entry.designation(),
        "passage" => entry.passage().to_string(),
        "passage_without_date" => backend.without_date(entry.passage()).to_string(),
        "reassortant" => entry.reassortant().to_string(),
        "annotations" => entry.annotations().join(" "),
        "aa" => entry.aa().to_string(),
        "nuc" => entry.nuc().to_string(),
        _ => {
            if let Some(pos) = position("aa-") {
                entry.aa_at(pos).map(String::from).unwrap_or_default()
            } else if let Some(pos) = position("laa-") {
                format!("{}{}", pos, entry.aa_at(pos).unwrap_or(' '))
            } else if let Some(pos) = position("nuc-") {
                entry.nuc_at(pos).map(String::from).unwrap_or_default()
            } else if let Some(pos) = position("lnuc-") {
                format!("{}{}", pos, entry.nuc_at(pos).unwrap_or(' '))
            } else {
                return specific_field(source, key);
            }
        }
    };
    Some(value)
}

fn specific_field(source: &NameSource<'_>, key: &str) -> Option<String> {
    match (source, key) {
        (NameSource::Antigen(antigen), "date") => Some(antigen.date.clone()),
        (NameSource::Antigen(antigen), "lab_id") => Some(antigen.lab_ids.join(" ")),
        (NameSource::Serum(serum), "serum_id") => Some(serum.serum_id.clone()),
        (NameSource::Serum(serum), "serum_species") => Some(serum.serum_species.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BuiltinBackend;

    #[test]
    fn test_format_plain_name() {
        let backend = BuiltinBackend::new();
        let source = NameSource::Name("A(H3N2)/Hong Kong/4801/2014");
        assert_eq!(name_format(source, "{location}/{year2}", &backend), "HONG KONG/14");
        assert_eq!(name_format(source, "{unknown} {year}", &backend), "{unknown} 2014");
        let keys = name_format(source, "{?}", &backend);
        assert!(keys.starts_with("{continent} {country}"));
        assert!(!keys.contains("{designation}"));
    }

    #[test]
    fn test_format_antigen() {
        let backend = BuiltinBackend::new();
        let antigen = Antigen {
            name: "A(H3N2)/DARWIN/6/2021".to_string(),
            passage: "E2 (2021-05-01)".to_string(),
            date: "2021-04-20".to_string(),
            aa: "QKIPG".to_string(),
            lab_ids: vec!["CDC#1".to_string(), "CDC#2".to_string()],
            ..Antigen::default()
        };
        let source = NameSource::Antigen(&antigen);
        assert_eq!(
            name_format(source, "{location} {passage_without_date} {date} {aa-2} {laa-3} {lab_id}", &backend),
            "DARWIN E2 2021-04-20 K 3I CDC#1 CDC#2"
        );
        assert!(name_format(source, "{?}", &backend).contains("{lab_id}"));
        assert!(!name_format(source, "{?}", &backend).contains("{serum_id}"));
    }

    #[test]
    fn test_format_serum() {
        let backend = BuiltinBackend::new();
        let serum = Serum {
            name: "B/AUSTRIA/1359417/2021".to_string(),
            serum_id: "F3".to_string(),
            serum_species: "FERRET".to_string(),
            ..Serum::default()
        };
        assert_eq!(
            name_format(NameSource::Serum(&serum), "{isolation} {serum_id} {serum_species} {date}", &backend),
            "1359417 F3 FERRET {date}"
        );
    }
}
