//! Builders for PocketBase filter expressions.

/// Escape a value for use inside a double-quoted filter literal.
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// `field = "value"`
pub fn eq(field: &str, value: &str) -> String {
    format!("{} = {}", field, quote(value))
}

/// `field ~ "value"` (contains, case-insensitive on the server)
pub fn like(field: &str, value: &str) -> String {
    format!("{} ~ {}", field, quote(value))
}

/// `field >= "value"`
pub fn gte(field: &str, value: &str) -> String {
    format!("{} >= {}", field, quote(value))
}

/// `field <= "value"`
pub fn lte(field: &str, value: &str) -> String {
    format!("{} <= {}", field, quote(value))
}

/// OR-combine one equality per value: `f = "1" || f = "2"`.
pub fn any_of<S: AsRef<str>>(field: &str, values: &[S]) -> String {
    values
        .iter()
        .map(|v| eq(field, v.as_ref()))
        .collect::<Vec<_>>()
        .join(" || ")
}

/// AND-combine clauses, skipping empty ones.
pub fn and<S: AsRef<str>>(clauses: &[S]) -> String {
    clauses
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" && ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("abc"), "\"abc\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn test_any_of() {
        let ids = vec!["100".to_string(), "200".to_string()];
        assert_eq!(any_of("asvz_id", &ids), "asvz_id = \"100\" || asvz_id = \"200\"");
        let empty: Vec<String> = Vec::new();
        assert_eq!(any_of("asvz_id", &empty), "");
    }

    #[test]
    fn test_and_skips_empty() {
        assert_eq!(and(&["a = 1", "", "b = 2"]), "a = 1 && b = 2");
        assert_eq!(and::<&str>(&[]), "");
    }
}
