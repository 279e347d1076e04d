//! Text processing utilities.

/// Collapse all whitespace runs to single spaces and trim the ends.
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ws() {
        assert_eq!(normalize_ws(""), "");
        assert_eq!(normalize_ws("   \n\t  "), "");
        assert_eq!(normalize_ws("a  b\nc\t\td"), "a b c d");
        assert_eq!(normalize_ws("  leading and trailing  "), "leading and trailing");
    }
}
