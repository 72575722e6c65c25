/// 逐位比較 `a` 與 `b`，`b` 較短時缺少的位置也算差異
pub fn hamming_distance(a: &str, b: &str) -> usize {
    let b = b.as_bytes();
    a.bytes()
        .enumerate()
        .filter(|(index, byte)| b.get(*index) != Some(byte))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance("ACGT", "ACGT"), 0);
        assert_eq!(hamming_distance("ACGT", "AGGA"), 2);
        assert_eq!(hamming_distance("ACGT", "AC"), 2);
        assert_eq!(hamming_distance("AC", "ACGT"), 0);
    }
}
