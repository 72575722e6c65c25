pub mod name_format;
pub mod subtype_prefix;

pub use name_format::{name_format, NameSource};
pub use subtype_prefix::add_subtype_prefix;

use crate::domain::ports::Backend;

/// `{地點縮寫}/{isolation}/{年份末兩碼}`，無法解析時回傳原名
pub fn name_abbreviated_location_isolation_year<B: Backend + ?Sized>(name: &str, backend: &B) -> String {
    let parsed = backend.parse_name(name, None);
    if parsed.parts.location.is_empty() {
        return name.to_string();
    }
    format!(
        "{}/{}/{}",
        backend.abbreviation(&parsed.parts.location),
        parsed.parts.isolation,
        parsed.parts.year.get(2..).unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BuiltinBackend;

    #[test]
    fn test_abbreviated_name() {
        let backend = BuiltinBackend::new();
        assert_eq!(
            name_abbreviated_location_isolation_year("A(H3N2)/DARWIN/6/2021", &backend),
            "DARWIN/6/21"
        );
        assert_eq!(name_abbreviated_location_isolation_year("CDC ODD NAME", &backend), "CDC ODD NAME");
    }
}
