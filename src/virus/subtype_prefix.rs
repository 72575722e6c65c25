/// 名稱沒有型別前綴時補上 `{type_subtype}/`
pub fn add_subtype_prefix(type_subtype: &str, name: &str) -> String {
    let prefixed = ["A/", "A(", "B/"].iter().any(|prefix| name.starts_with(prefix));
    if name.is_empty() || prefixed {
        name.to_string()
    } else {
        format!("{}/{}", type_subtype, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_subtype_prefix() {
        assert_eq!(add_subtype_prefix("A(H3N2)", "DARWIN/6/2021"), "A(H3N2)/DARWIN/6/2021");
        assert_eq!(add_subtype_prefix("A(H3N2)", "A(H3N2)/DARWIN/6/2021"), "A(H3N2)/DARWIN/6/2021");
        assert_eq!(add_subtype_prefix("A(H3N2)", "A/DARWIN/6/2021"), "A/DARWIN/6/2021");
        assert_eq!(add_subtype_prefix("B", "B/AUSTRIA/1359417/2021"), "B/AUSTRIA/1359417/2021");
        assert_eq!(add_subtype_prefix("B", "AUSTRIA/1359417/2021"), "B/AUSTRIA/1359417/2021");
        assert_eq!(add_subtype_prefix("B", ""), "");
    }
}
