//! JSON text encoding for config files.
//!
//! Output is always indented and newline-terminated. Input may contain
//! `//` and `/* */` comments outside string literals and may start with a
//! UTF-8 byte order mark; nothing else is relaxed.

use json_comments::CommentSettings;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;

pub const DEFAULT_INDENT: usize = 2;

/// Serialize `value` as indented JSON followed by a newline.
///
/// # Errors
/// Returns an error if `value` cannot be represented as JSON.
pub fn to_pretty_json<T>(value: &T, indent: usize) -> Result<Vec<u8>, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let indent = " ".repeat(indent);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::with_capacity(256);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

/// Parse JSON text, ignoring C-style comments and a leading byte order mark.
///
/// # Errors
/// Returns an error if the text, with comments removed, is not valid JSON
/// for `T`.
pub fn from_lenient_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let stripped = CommentSettings::c_style().strip_comments(text.as_bytes());
    serde_json::from_reader(stripped)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::{DEFAULT_INDENT, from_lenient_json, to_pretty_json};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Motd {
        version: u32,
        message: String,
        lines: Vec<String>,
        delay_secs: Option<u64>,
    }

    fn sample() -> Motd {
        Motd {
            version: 3,
            message: "see http://example.org // not a comment".to_string(),
            lines: vec!["one".to_string(), "/* two */".to_string()],
            delay_secs: Some(30),
        }
    }

    #[test]
    fn serialized_text_parses_back_to_same_value() {
        let value = sample();

        let text = to_pretty_json(&value, DEFAULT_INDENT).expect("serialization should succeed");
        let text = String::from_utf8(text).expect("output should be utf-8");
        let parsed: Motd = from_lenient_json(&text).expect("output should parse");

        assert_eq!(parsed, value);
    }

    #[test]
    fn output_is_indented_and_newline_terminated() {
        let text = to_pretty_json(&json!({ "Version": 1, "Nested": { "A": true } }), 4)
            .expect("serialization should succeed");
        let text = String::from_utf8(text).expect("output should be utf-8");

        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n    \"Version\": 1"));
        assert!(text.contains("\n        \"A\": true"));
    }

    #[test]
    fn comments_between_fields_are_ignored() {
        let plain = r#"{
  "Version": 3,
  "Message": "see http://example.org // not a comment",
  "Lines": ["one", "/* two */"],
  "DelaySecs": 30
}"#;
        let commented = r#"// message of the day
{
  "Version": 3, // bumped for the new lines field
  /* the greeting */
  "Message": "see http://example.org // not a comment",
  "Lines": [
    "one", // first
    "/* two */"
  ],
  "DelaySecs": /* seconds */ 30
}
// trailing note"#;

        let expected: Motd = from_lenient_json(plain).expect("plain text should parse");
        let parsed: Motd = from_lenient_json(commented).expect("commented text should parse");

        assert_eq!(parsed, expected);
        assert_eq!(parsed, sample());
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let text = "\u{feff}{ \"Version\": 3, \"Message\": \"hi\", \"Lines\": [], \"DelaySecs\": null }";

        let parsed: Motd = from_lenient_json(text).expect("BOM-prefixed text should parse");

        assert_eq!(parsed.version, 3);
        assert_eq!(parsed.message, "hi");
    }

    #[test]
    fn other_syntax_is_still_rejected() {
        let hash_comment = "# note\n{ \"Version\": 3, \"Message\": \"\", \"Lines\": [], \"DelaySecs\": null }";

        assert!(from_lenient_json::<Motd>(hash_comment).is_err());
        assert!(from_lenient_json::<Motd>("{not-valid-json").is_err());
    }
}
