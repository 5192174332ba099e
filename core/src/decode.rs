//! JSON body decoding.
//!
//! # Design
//! Backends send snake_case keys; response types declare camelCase names
//! (`#[serde(rename_all = "camelCase")]`). With `ConvertFromSnakeCase` the
//! body is parsed into a `serde_json::Value`, every object key is rewritten,
//! and only then is the caller's type deserialized, so the conversion applies
//! to nested objects too.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// How object keys in a success body are matched to field names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyDecodingStrategy {
    #[default]
    ConvertFromSnakeCase,
    UseDefaultKeys,
}

/// Decode a 2xx body into `T`.
pub fn decode_body<T: DeserializeOwned>(
    bytes: &[u8],
    strategy: KeyDecodingStrategy,
) -> Result<T, serde_json::Error> {
    match strategy {
        KeyDecodingStrategy::UseDefaultKeys => serde_json::from_slice(bytes),
        KeyDecodingStrategy::ConvertFromSnakeCase => {
            let value: Value = serde_json::from_slice(bytes)?;
            serde_json::from_value(convert_keys(value))
        }
    }
}

fn convert_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (snake_to_camel(&k), convert_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(convert_keys).collect()),
        other => other,
    }
}

/// `user_error_message` -> `userErrorMessage`.
///
/// Leading and trailing underscores are kept, and a key with a single
/// component is returned as-is.
pub fn snake_to_camel(key: &str) -> String {
    let Some(start) = key.find(|c: char| c != '_') else {
        return key.to_string();
    };
    // A non-underscore exists, so rfind succeeds.
    let end = key.rfind(|c: char| c != '_').unwrap_or(start);
    let end = end + key[end..].chars().next().map_or(1, char::len_utf8);

    let inner = &key[start..end];
    let components: Vec<&str> = inner.split('_').filter(|s| !s.is_empty()).collect();
    if components.len() == 1 {
        return key.to_string();
    }

    let mut joined = components[0].to_lowercase();
    for component in &components[1..] {
        let mut chars = component.chars();
        if let Some(first) = chars.next() {
            joined.extend(first.to_uppercase());
            joined.push_str(&chars.as_str().to_lowercase());
        }
    }

    format!("{}{}{}", &key[..start], joined, &key[end..])
}

/// Pull `message` and `user_error_message` out of an error body.
///
/// Never fails: a body that is not a JSON object yields `("", None)`.
pub fn extract_error_fields(bytes: &[u8]) -> (String, Option<String>) {
    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(bytes) else {
        return (String::new(), None);
    };
    let message = map
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let user_message = map
        .get("user_error_message")
        .and_then(Value::as_str)
        .map(str::to_string);
    (message, user_message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Profile {
        user_id: u64,
        display_name: String,
        avatar: Avatar,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Avatar {
        image_url: String,
    }

    #[test]
    fn snake_to_camel_conversions() {
        assert_eq!(snake_to_camel("user_error_message"), "userErrorMessage");
        assert_eq!(snake_to_camel("message"), "message");
        assert_eq!(snake_to_camel("_private_key_"), "_privateKey_");
        assert_eq!(snake_to_camel("__"), "__");
        assert_eq!(snake_to_camel(""), "");
        assert_eq!(snake_to_camel("double__under"), "doubleUnder");
        assert_eq!(snake_to_camel("URL_path"), "urlPath");
    }

    #[test]
    fn decodes_nested_snake_case_body() {
        let body = br#"{"user_id":7,"display_name":"Ada","avatar":{"image_url":"https://x/a.png"}}"#;
        let profile: Profile = decode_body(body, KeyDecodingStrategy::default()).unwrap();
        assert_eq!(
            profile,
            Profile {
                user_id: 7,
                display_name: "Ada".to_string(),
                avatar: Avatar {
                    image_url: "https://x/a.png".to_string()
                },
            }
        );
    }

    #[test]
    fn default_keys_do_not_convert() {
        let body = br#"{"user_id":7,"display_name":"Ada","avatar":{"image_url":"u"}}"#;
        let result: Result<Profile, _> = decode_body(body, KeyDecodingStrategy::UseDefaultKeys);
        assert!(result.is_err());
    }

    #[test]
    fn extracts_both_fields() {
        let (message, user_message) =
            extract_error_fields(br#"{"message":"bad input","user_error_message":"Try again"}"#);
        assert_eq!(message, "bad input");
        assert_eq!(user_message.as_deref(), Some("Try again"));
    }

    #[test]
    fn extraction_degrades_on_garbage() {
        assert_eq!(extract_error_fields(b"<html>oops</html>"), (String::new(), None));
        assert_eq!(extract_error_fields(b"[1,2]"), (String::new(), None));
        assert_eq!(extract_error_fields(br#"{"message":42}"#), (String::new(), None));
    }
}
