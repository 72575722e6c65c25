use crate::backend::locdb::LocationDb;
use crate::domain::parsing::{MessageKind, NameParsingResult, ParserMessage};
use chrono::Datelike;
use regex::Regex;
use std::sync::LazyLock;

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:A(?:\((H\d{1,2}(?:N\d{1,2})?)\))?|B)$").expect("static regex")
});

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:\s*\((H\d{1,2}(?:N\d{1,2})?)\))?\s*(.*)$").expect("static regex")
});

static REASSORTANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:NYMC\s+B?X-?\d+[A-Z]*|(?:IVR|NIB|CNIC|BVR|NYMC|X|BX)-\d+[A-Z]*)").expect("static regex")
});

static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// 簡化的流感病毒名稱文法：
/// TYPE[(SUBTYPE)]/[HOST/]LOCATION/ISOLATION/YEAR [reassortant] [extra]
/// 早期的病毒株沒有 isolation，例如 B/LEE/1940
pub fn parse(source: &str, type_subtype: Option<&str>, locdb: &LocationDb) -> NameParsingResult {
    let normalized = SPACES_RE.replace_all(source.trim(), " ").to_uppercase();
    let mut result = NameParsingResult::default();
    let mut fields: Vec<&str> = normalized.split('/').map(str::trim).collect();

    let mut virus_type = String::new();
    if let Some(captures) = fields.first().and_then(|first| TYPE_RE.captures(first)) {
        virus_type = captures.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
        fields.remove(0);
    }

    if !(2..=4).contains(&fields.len()) {
        result.messages.push(ParserMessage::new(
            MessageKind::InvalidStructure,
            normalized.clone(),
            format!("{} slash separated fields", fields.len()),
        ));
        return result;
    }

    let Some(year_captures) = fields.last().and_then(|last| YEAR_RE.captures(last)) else {
        result.messages.push(ParserMessage::new(
            MessageKind::InvalidYear,
            fields.last().copied().unwrap_or_default(),
            normalized.clone(),
        ));
        return result;
    };
    let year_raw = year_captures.get(1).map_or("", |m| m.as_str());
    let subtype_in_parens = year_captures.get(2).map(|m| m.as_str());
    let suffix = year_captures.get(3).map_or("", |m| m.as_str());

    let parts = &mut result.parts;
    parts.year = match expand_year(year_raw) {
        Some(year) => year,
        None => {
            result.messages.push(ParserMessage::new(MessageKind::InvalidYear, year_raw, normalized.clone()));
            return result;
        }
    };

    parts.type_subtype = match (virus_type.as_str(), subtype_in_parens, type_subtype) {
        ("A", Some(subtype), _) => format!("A({})", subtype),
        ("A", None, Some(given)) if given.starts_with("A(") => given.to_string(),
        ("", _, Some(given)) => given.to_string(),
        (parsed, _, _) => parsed.to_string(),
    };
    if let (Some(given), false) = (type_subtype, parts.type_subtype.is_empty()) {
        let same_type = parts.type_subtype.chars().next().is_some_and(|first| given.starts_with(first));
        if !given.is_empty() && !same_type {
            result.messages.push(ParserMessage::new(
                MessageKind::InvalidSubtype,
                parts.type_subtype.clone(),
                format!("expected {}", given),
            ));
        }
    }

    if fields.len() == 4 {
        parts.host = fields[0].to_string();
        fields.remove(0);
    }
    parts.location = fields[0].to_string();
    if fields.len() == 3 {
        parts.isolation = fields[1].to_string();
    }
    if parts.location.is_empty() || (fields.len() == 3 && parts.isolation.is_empty()) {
        result.messages.push(ParserMessage::new(
            MessageKind::InvalidStructure,
            normalized.clone(),
            "empty location or isolation",
        ));
        return result;
    }

    let reassortants: Vec<&str> = REASSORTANT_RE.find_iter(suffix).map(|m| m.as_str()).collect();
    parts.reassortant = reassortants.join(" ");
    parts.extra = SPACES_RE
        .replace_all(REASSORTANT_RE.replace_all(suffix, " ").trim(), " ")
        .into_owned();

    if !locdb.is_empty() {
        match locdb.get(&parts.location) {
            Some(info) => {
                parts.country = info.country.clone();
                parts.continent = info.continent.clone();
            }
            None => result.messages.push(ParserMessage::new(
                MessageKind::UnrecognizedLocation,
                parts.location.clone(),
                normalized.clone(),
            )),
        }
    }

    result
}

fn expand_year(year: &str) -> Option<String> {
    let current = chrono::Utc::now().year();
    match year.len() {
        4 => {
            let value: i32 = year.parse().ok()?;
            (1900..=current + 1).contains(&value).then(|| year.to_string())
        }
        2 => {
            let value: i32 = year.parse().ok()?;
            let century = if value <= current % 100 { 2000 } else { 1900 };
            Some((century + value).to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parsing::LocationInfo;

    #[test]
    fn test_parse_full_name() {
        let result = parse("A(H3N2)/Hong Kong/4801/2014 NYMC X-263B", None, &LocationDb::default());
        assert!(result.good(), "{:?}", result.messages);
        assert_eq!(result.parts.type_subtype, "A(H3N2)");
        assert_eq!(result.parts.location, "HONG KONG");
        assert_eq!(result.parts.reassortant, "NYMC X-263B");
        assert_eq!(result.parts.name(), "A(H3N2)/HONG KONG/4801/2014 NYMC X-263B");
    }

    #[test]
    fn test_parse_ncbi_style_subtype() {
        let result = parse("A/Brisbane/10/2007(H3N2)", None, &LocationDb::default());
        assert!(result.good());
        assert_eq!(result.parts.name(), "A(H3N2)/BRISBANE/10/2007");
    }

    #[test]
    fn test_parse_without_type_uses_given_subtype() {
        let result = parse("Darwin/6/21", Some("A(H3N2)"), &LocationDb::default());
        assert!(result.good());
        assert_eq!(result.parts.name(), "A(H3N2)/DARWIN/6/2021");
    }

    #[test]
    fn test_parse_with_host_and_extra() {
        let result = parse("A(H1N1)/swine/Iowa/A02524816/2020 clone 3", None, &LocationDb::default());
        assert!(result.good());
        assert_eq!(result.parts.host, "SWINE");
        assert_eq!(result.parts.extra, "CLONE 3");
        assert_eq!(result.parts.host_location_isolation_year(), "SWINE/IOWA/A02524816/2020");
    }

    #[test]
    fn test_unrecognized_location() {
        let mut locdb = LocationDb::default();
        locdb.insert(
            "KANSAS",
            LocationInfo {
                country: "UNITED STATES OF AMERICA".to_string(),
                continent: "NORTH-AMERICA".to_string(),
                abbreviation: "KS".to_string(),
            },
        );
        let good = parse("A(H3N2)/Kansas/14/2017", None, &locdb);
        assert!(good.good());
        assert_eq!(good.parts.continent, "NORTH-AMERICA");

        let bad = parse("A(H3N2)/Atlantis/1/2017", None, &locdb);
        assert!(!bad.good());
        assert_eq!(bad.messages[0].kind, MessageKind::UnrecognizedLocation);
        assert_eq!(bad.messages[0].value, "ATLANTIS");
    }

    #[test]
    fn test_parse_location_year_only() {
        let result = parse("B/Lee/1940", None, &LocationDb::default());
        assert!(result.good(), "{:?}", result.messages);
        assert_eq!(result.parts.location, "LEE");
        assert!(result.parts.isolation.is_empty());
        assert_eq!(result.parts.name(), "B/LEE/1940");
    }

    #[test]
    fn test_multibyte_expected_subtype() {
        let result = parse("KANSAS/14/2017", Some("Ä(H3N2)"), &LocationDb::default());
        assert_eq!(result.parts.type_subtype, "Ä(H3N2)");
        assert!(result.good());

        let mismatch = parse("B/Kansas/14/2017", Some("Ä(H3N2)"), &LocationDb::default());
        assert_eq!(mismatch.messages[0].kind, MessageKind::InvalidSubtype);
    }

    #[test]
    fn test_invalid_structure_and_year() {
        assert_eq!(
            parse("not a virus name", None, &LocationDb::default()).messages[0].kind,
            MessageKind::InvalidStructure
        );
        assert_eq!(
            parse("B/Victoria/2/1870", None, &LocationDb::default()).messages[0].kind,
            MessageKind::InvalidYear
        );
    }
}
