use crate::domain::parsing::{MessageKind, PassageParsingResult, PassageType, ParserMessage};
use regex::Regex;
use std::sync::LazyLock;

static DATE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\((\d{4}-\d{2}-\d{2})\)\s*$").expect("static regex"));

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:E|EGG|AM|AL|SPFE|C|MDCK|SIAT|S|X|MK|HCK|QMC|SPF|P|CELL|OR|ORIGINAL|CS|CLINICALSPECIMEN|R|PRMK|RHMK|TMK|CACO|HEK|VERO|A|M|D|NC|U)(?:\d+|X|\?)?$",
    )
    .expect("static regex")
});

static EGG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:E|AM|AL|SPFE)(?:\d+|X|\?)?$|^EGG").expect("static regex"));

static CELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:C|MDCK|SIAT|S|X|MK|HCK|QMC|CELL|PRMK|RHMK|TMK|CACO|HEK|VERO)(?:\d+|X|\?)?$")
        .expect("static regex")
});

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[/,+]").expect("static regex"));

/// 將繼代字串正規化：大寫、移除片段內空白，以 `/` 連接，保留尾端的 `(YYYY-MM-DD)`
pub fn parse(source: &str) -> PassageParsingResult {
    let upper = source.trim().to_uppercase();
    let mut result = PassageParsingResult::default();
    if upper.is_empty() {
        return result;
    }

    let (body, date) = match DATE_SUFFIX_RE.captures(&upper) {
        Some(captures) => {
            let start = captures.get(0).map_or(upper.len(), |m| m.start());
            (&upper[..start], captures.get(1).map(|m| m.as_str().to_string()))
        }
        None => (upper.as_str(), None),
    };

    let tokens: Vec<String> = SEPARATOR_RE
        .split(body)
        .map(|token| token.split_whitespace().collect::<String>())
        .filter(|token| !token.is_empty())
        .collect();

    for token in &tokens {
        if !TOKEN_RE.is_match(token) {
            result.messages.push(ParserMessage::new(MessageKind::InvalidPassage, token.clone(), source));
        }
    }

    result.passage = tokens.join("/");
    if let Some(date) = date {
        result.passage = format!("{} ({})", result.passage, date);
    }
    result
}

pub fn without_date(passage: &str) -> &str {
    match DATE_SUFFIX_RE.find(passage) {
        Some(found) => &passage[..found.start()],
        None => passage,
    }
}

/// 任一片段屬於雞胚即視為 egg，否則有細胞片段則為 cell
pub fn passage_type(passage: &str) -> PassageType {
    let upper = without_date(passage).to_uppercase();
    let tokens: Vec<String> = SEPARATOR_RE
        .split(&upper)
        .map(|token| token.split_whitespace().collect::<String>())
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.iter().any(|token| EGG_RE.is_match(token)) {
        PassageType::Egg
    } else if tokens.iter().any(|token| CELL_RE.is_match(token)) {
        PassageType::Cell
    } else {
        PassageType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        let result = parse("mdck 2, siat1 (2020-03-04)");
        assert!(result.good());
        assert_eq!(result.passage(), "MDCK2/SIAT1 (2020-03-04)");
    }

    #[test]
    fn test_parse_reports_unknown_token() {
        let result = parse("E3/WHATEVER");
        assert!(!result.good());
        assert_eq!(result.messages[0].kind, MessageKind::InvalidPassage);
        assert_eq!(result.passage(), "E3/WHATEVER");
    }

    #[test]
    fn test_passage_type() {
        assert_eq!(passage_type("E2"), PassageType::Egg);
        assert_eq!(passage_type("MDCK1/E2"), PassageType::Egg);
        assert_eq!(passage_type("SIAT3 (2019-01-01)"), PassageType::Cell);
        assert_eq!(passage_type("OR"), PassageType::Unknown);
        assert_eq!(without_date("E1 (2019-01-01)"), "E1");
    }
}
