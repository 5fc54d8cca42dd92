//! Extraction of the JSON object from raw model output.
//!
//! Models are told to answer with bare JSON, but answers still arrive
//! wrapped in markdown fences or with stray prose around the object. The
//! extractor scans for the first balanced top-level object instead of
//! trusting the whole string.

/// Extract the first balanced JSON object from `raw`.
///
/// Markdown code fences are tolerated (the scan simply starts at the first
/// `{`). String literals and escapes are honored so braces inside values
/// don't unbalance the scan. Returns `None` when no complete object exists.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object_passes_through() {
        let raw = r#"{"a": 1}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn test_markdown_fenced_object() {
        let raw = "```json\n{\"a\": {\"b\": 2}}\n```";
        assert_eq!(extract_json_object(raw), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn test_prose_around_object() {
        let raw = "Here is the analysis you asked for:\n{\"a\": 1}\nLet me know!";
        assert_eq!(extract_json_object(raw), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_braces_inside_strings_do_not_unbalance() {
        let raw = r#"{"text": "use {placeholders} like \"{x}\""}"#;
        assert_eq!(extract_json_object(raw), Some(raw));
    }

    #[test]
    fn test_truncated_object_is_none() {
        assert_eq!(extract_json_object(r#"{"a": {"b": 1}"#), None);
        assert_eq!(extract_json_object("no json here"), None);
    }
}
