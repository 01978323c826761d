use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DocumentError;

/// Declared type of a meta field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Bool,
    Int,
    Float,
    Str,
    Json,
}

const TRUE_WORDS: [&str; 5] = ["true", "t", "yes", "y", "1"];
const FALSE_WORDS: [&str; 5] = ["false", "f", "no", "n", "0"];

impl Datatype {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Json => "json",
        }
    }

    /// Coerces a raw meta value into this type. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Cast`] if `raw` is not a valid value of this type.
    pub fn cast(self, raw: &str) -> Result<MetaValue, DocumentError> {
        let value = raw.trim();
        let cast_err = || DocumentError::Cast {
            value: value.to_owned(),
            datatype: self,
        };

        match self {
            Self::Bool => {
                let lower = value.to_lowercase();
                if TRUE_WORDS.contains(&lower.as_str()) {
                    Ok(MetaValue::Bool(true))
                } else if FALSE_WORDS.contains(&lower.as_str()) {
                    Ok(MetaValue::Bool(false))
                } else {
                    Err(cast_err())
                }
            }
            Self::Int => value
                .parse::<i64>()
                .map(MetaValue::Int)
                .map_err(|_| cast_err()),
            Self::Float => value
                .parse::<f64>()
                .map(MetaValue::Float)
                .map_err(|_| cast_err()),
            Self::Json => serde_json::from_str(value)
                .map(MetaValue::Json)
                .map_err(|_| cast_err()),
            Self::Str => Ok(MetaValue::Str(value.to_owned())),
        }
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(Self::Bool),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "str" => Ok(Self::Str),
            "json" => Ok(Self::Json),
            other => Err(DocumentError::InvalidSchema(format!(
                "unknown datatype '{other}'"
            ))),
        }
    }
}

/// Coerces `raw` using a datatype given by name.
///
/// # Errors
///
/// Returns [`DocumentError::InvalidSchema`] for an unknown datatype name, checked
/// before the value is looked at, and [`DocumentError::Cast`] if coercion fails.
pub fn cast_named(raw: &str, datatype: &str) -> Result<MetaValue, DocumentError> {
    datatype.parse::<Datatype>()?.cast(raw)
}

/// A typed meta value.
///
/// Serializes to its natural JSON form, so a batch export reads as plain JSON.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Json(serde_json::Value),
}

impl MetaValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<serde_json::Value> for MetaValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct RawFieldSpec {
    key: String,
    #[serde(default = "default_datatype_name")]
    datatype: String,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<MetaValue>,
}

fn default_datatype_name() -> String {
    Datatype::Str.as_str().to_owned()
}

/// One entry of a meta schema.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawFieldSpec", into = "RawFieldSpec")]
pub struct FieldSpec {
    pub key: String,
    pub datatype: Datatype,
    pub required: bool,
    /// Inserted as-is, without coercion, when an optional key is absent.
    pub default: Option<MetaValue>,
}

impl FieldSpec {
    #[must_use]
    pub fn required(key: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            key: key.into(),
            datatype,
            required: true,
            default: None,
        }
    }

    #[must_use]
    pub fn optional(key: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            key: key.into(),
            datatype,
            required: false,
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<MetaValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Builds a spec from a datatype name.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidSchema`] if `datatype` is not a known name.
    pub fn parse(
        key: impl Into<String>,
        datatype: &str,
        required: bool,
        default: Option<MetaValue>,
    ) -> Result<Self, DocumentError> {
        Ok(Self {
            key: key.into(),
            datatype: datatype.parse()?,
            required,
            default,
        })
    }
}

impl TryFrom<RawFieldSpec> for FieldSpec {
    type Error = DocumentError;

    fn try_from(raw: RawFieldSpec) -> Result<Self, Self::Error> {
        let datatype = raw.datatype.parse::<Datatype>().map_err(|_| {
            DocumentError::InvalidSchema(format!(
                "unknown datatype '{}' for field '{}'",
                raw.datatype, raw.key
            ))
        })?;
        Ok(Self {
            key: raw.key,
            datatype,
            required: raw.required,
            default: raw.default,
        })
    }
}

impl From<FieldSpec> for RawFieldSpec {
    fn from(spec: FieldSpec) -> Self {
        Self {
            key: spec.key,
            datatype: spec.datatype.as_str().to_owned(),
            required: spec.required,
            default: spec.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_int() {
        assert_eq!(cast_named("999", "int").unwrap(), MetaValue::Int(999));
        assert_eq!(cast_named(" -3 ", "int").unwrap(), MetaValue::Int(-3));
    }

    #[test]
    fn cast_float() {
        assert_eq!(cast_named("9.9", "float").unwrap(), MetaValue::Float(9.9));
    }

    #[test]
    fn cast_bool_words() {
        for word in ["true", "T", "Yes", "y", "1"] {
            assert_eq!(Datatype::Bool.cast(word).unwrap(), MetaValue::Bool(true));
        }
        for word in ["false", "F", "NO", "n", "0"] {
            assert_eq!(Datatype::Bool.cast(word).unwrap(), MetaValue::Bool(false));
        }
    }

    #[test]
    fn cast_str_is_identity() {
        assert_eq!(cast_named("999", "str").unwrap(), MetaValue::from("999"));
    }

    #[test]
    fn cast_json() {
        let expected = serde_json::json!([true, 1, "123", []]);
        let raw = serde_json::to_string(&expected).unwrap();
        assert_eq!(cast_named(&raw, "json").unwrap(), MetaValue::Json(expected));

        let fruits = cast_named(r#"["apple","orange"]"#, "json").unwrap();
        assert_eq!(fruits, MetaValue::Json(serde_json::json!(["apple", "orange"])));
    }

    #[test]
    fn cast_failures() {
        for (raw, datatype) in [
            ("abcd", "int"),
            ("abcd", "float"),
            ("abcd", "bool"),
            ("abcd", "json"),
            ("[1,2,abcd]", "json"),
            ("[apple, orange]", "int"),
        ] {
            let err = cast_named(raw, datatype).unwrap_err();
            assert!(
                matches!(err, DocumentError::Cast { .. }),
                "{raw} as {datatype}: {err}"
            );
        }
    }

    #[test]
    fn unknown_datatype_is_schema_error() {
        for raw in ["abcd", "1", "true"] {
            let err = cast_named(raw, "noSuchType").unwrap_err();
            assert!(matches!(err, DocumentError::InvalidSchema(_)));
        }
    }

    #[test]
    fn cast_error_message_names_type() {
        let err = Datatype::Int.cast("abc").unwrap_err();
        assert_eq!(err.to_string(), "unable to cast 'abc' to int");
    }

    #[test]
    fn meta_value_serializes_naturally() {
        let values = vec![
            MetaValue::Bool(true),
            MetaValue::Int(3),
            MetaValue::Float(1.5),
            MetaValue::from("x"),
            MetaValue::Json(serde_json::json!({"a": [1]})),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[true,3,1.5,"x",{"a":[1]}]"#);
    }

    #[test]
    fn field_spec_from_toml() {
        let spec: FieldSpec =
            toml::from_str("key = \"author\"\nrequired = false\ndefault = \"John\"").unwrap();
        assert_eq!(spec.key, "author");
        assert_eq!(spec.datatype, Datatype::Str);
        assert!(!spec.required);
        assert_eq!(spec.default, Some(MetaValue::from("John")));
    }

    #[test]
    fn field_spec_defaults_to_required() {
        let spec: FieldSpec = toml::from_str("key = \"index\"\ndatatype = \"int\"").unwrap();
        assert!(spec.required);
        assert_eq!(spec.datatype, Datatype::Int);
    }

    #[test]
    fn field_spec_with_unknown_datatype_rejected() {
        let err = toml::from_str::<FieldSpec>("key = \"x\"\ndatatype = \"date\"").unwrap_err();
        assert!(err.to_string().contains("unknown datatype 'date'"));
    }

    #[test]
    fn field_spec_parse() {
        let spec = FieldSpec::parse("title", "str", true, Some("Undefined Post".into())).unwrap();
        assert_eq!(
            spec,
            FieldSpec::required("title", Datatype::Str).with_default("Undefined Post")
        );
        assert!(FieldSpec::parse("title", "string", true, None).is_err());
    }
}
