use toml_edit::Value;

/// Typed scalar or array value of a single document key.
///
/// Only the shapes an editing control can represent are modelled. Floats,
/// datetimes and inline tables read as `None` and are left alone by sync.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `true` / `false`.
    Boolean(bool),
    /// Signed integer.
    Integer(i64),
    /// Basic or literal string.
    String(String),
    /// Array of representable values.
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Read a TOML value.
    pub fn from_toml(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(Self::Boolean(*b.value())),
            Value::Integer(i) => Some(Self::Integer(*i.value())),
            Value::String(s) => Some(Self::String(s.value().clone())),
            Value::Array(arr) => arr
                .iter()
                .map(Self::from_toml)
                .collect::<Option<Vec<_>>>()
                .map(Self::Array),
            _ => None,
        }
    }

    /// Build a fresh TOML value with default formatting.
    pub fn to_toml(&self) -> Value {
        match self {
            Self::Boolean(b) => Value::from(*b),
            Self::Integer(i) => Value::from(*i),
            Self::String(s) => Value::from(s.as_str()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_toml).collect()),
        }
    }

    /// Read a schema `default` entry.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Boolean(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Self::Integer),
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Self::Array),
            _ => None,
        }
    }

    /// Empty strings and empty arrays carry no override.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Array(items) => items.is_empty(),
            Self::Boolean(_) | Self::Integer(_) => false,
        }
    }

    /// Text shown in a single-line control for this value.
    pub fn display_text(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::String(s) => s.clone(),
            Self::Array(items) => items
                .iter()
                .map(Self::display_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_nested_arrays() {
        let value: Value = r#"["a", 1, true]"#.parse().unwrap();
        assert_eq!(
            FieldValue::from_toml(&value),
            Some(FieldValue::Array(vec![
                FieldValue::String("a".into()),
                FieldValue::Integer(1),
                FieldValue::Boolean(true),
            ]))
        );
    }

    #[test]
    fn test_unrepresentable_values() {
        let float: Value = "1.5".parse().unwrap();
        assert_eq!(FieldValue::from_toml(&float), None);

        let table: Value = "{ a = 1 }".parse().unwrap();
        assert_eq!(FieldValue::from_toml(&table), None);
    }

    #[test]
    fn test_json_defaults() {
        assert_eq!(
            FieldValue::from_json(&serde_json::json!(30.0)),
            Some(FieldValue::Integer(30))
        );
        assert_eq!(FieldValue::from_json(&serde_json::json!(0.5)), None);
        assert_eq!(FieldValue::from_json(&serde_json::json!(null)), None);
    }
}
