//! Parameter values and `application/x-www-form-urlencoded` encoding.
//!
//! Query parameters and form bodies accept any scalar-ish value through
//! [`ParamValue`]. The conversion policy is:
//!
//! | input | string |
//! |---|---|
//! | `&str`, `String` | verbatim |
//! | integers, floats | `Display` (`3.0` becomes `"3"`, `1.5` stays `"1.5"`) |
//! | `bool` | `"true"` / `"false"` |
//! | `char` | the character |
//! | `Option::None`, JSON `null` | `""` |
//! | JSON string / number / bool | as the matching scalar above |
//! | JSON array / object | compact JSON text |
//!
//! Conversion never fails.

use std::collections::BTreeMap;
use url::form_urlencoded;

/// A parameter value already coerced to its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamValue(String);

impl ParamValue {
    /// Borrow the string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the string form.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

macro_rules! display_param {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

display_param!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_else(|| Self(String::new()))
    }
}

impl From<&serde_json::Value> for ParamValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self(String::new()),
            Value::String(s) => Self(s.clone()),
            Value::Bool(b) => Self(b.to_string()),
            Value::Number(n) => Self(n.to_string()),
            Value::Array(_) | Value::Object(_) => Self(value.to_string()),
        }
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self(s),
            other => Self::from(&other),
        }
    }
}

/// Coerce key/value pairs into a sorted parameter map.
///
/// A key supplied twice keeps its last value.
pub fn collect_params<I, K, V>(params: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    params
        .into_iter()
        .map(|(key, value)| (key.into(), value.into().into_string()))
        .collect()
}

/// Encode parameters as `key=value&key=value`, percent-escaped, keys sorted.
pub fn encode(params: &BTreeMap<String, String>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(ParamValue::from("plain"), "plain" ; "str")]
    #[test_case(ParamValue::from(42u16), "42" ; "unsigned")]
    #[test_case(ParamValue::from(-7i64), "-7" ; "signed")]
    #[test_case(ParamValue::from(3.0f64), "3" ; "whole float")]
    #[test_case(ParamValue::from(1.5f32), "1.5" ; "fractional float")]
    #[test_case(ParamValue::from(true), "true" ; "bool")]
    #[test_case(ParamValue::from('x'), "x" ; "char")]
    #[test_case(ParamValue::from(None::<i32>), "" ; "none")]
    #[test_case(ParamValue::from(Some("set")), "set" ; "some")]
    #[test_case(ParamValue::from(json!(null)), "" ; "json null")]
    #[test_case(ParamValue::from(json!("s")), "s" ; "json string")]
    #[test_case(ParamValue::from(json!(12.25)), "12.25" ; "json number")]
    #[test_case(ParamValue::from(json!([1, "a"])), r#"[1,"a"]"# ; "json array")]
    #[test_case(ParamValue::from(json!({"k": false})), r#"{"k":false}"# ; "json object")]
    fn test_param_value_policy(value: ParamValue, expected: &str) {
        assert_eq!(value.as_str(), expected);
    }

    #[test]
    fn test_encode_sorts_and_escapes() {
        let params = collect_params([("z", "last"), ("a b", "x&y=z"), ("m", "ü/?")]);
        assert_eq!(encode(&params), "a+b=x%26y%3Dz&m=%C3%BC%2F%3F&z=last");
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&BTreeMap::new()), "");
    }

    #[test]
    fn test_collect_last_duplicate_wins() {
        let params = collect_params(vec![("k", 1), ("k", 2)]);
        assert_eq!(params.len(), 1);
        assert_eq!(params["k"], "2");
    }
}
