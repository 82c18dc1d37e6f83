use uuid::Uuid;

/// Entity ids are a short type prefix plus an uppercase uuid-derived suffix,
/// e.g. "BK3F9A21C4".
pub fn prefixed_id(prefix: &str) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", uuid[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_length() {
        let id = prefixed_id("BK");
        assert!(id.starts_with("BK"));
        assert_eq!(id.len(), 10);
    }

    #[test]
    fn test_suffix_is_uppercase_hex() {
        let id = prefixed_id("WRK");
        let suffix = &id[3..];
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = prefixed_id("USR");
        let b = prefixed_id("USR");
        assert_ne!(a, b);
    }
}
