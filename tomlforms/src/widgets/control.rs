use crate::data::{
    schema::{PropertyDef, PropertyType},
    value::FieldValue,
};

/// Lower bound used when the schema declares none.
pub const WIDE_MIN: i64 = i32::MIN as i64;
/// Upper bound used when the schema declares none.
pub const WIDE_MAX: i64 = i32::MAX as i64;

/// State of one editing control.
///
/// One variant per declared property type; [`Control::for_property`] is the
/// only place that maps a type to a kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Checkbox.
    Toggle(bool),
    /// Bounded numeric field. `value` always lies within `min..=max`.
    Integer {
        /// Current value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// Single-line text.
    Text(String),
    /// Multi-line text, one array entry per line.
    Lines {
        /// Raw editor content.
        text: String,
        /// How entries are typed when written back.
        item_type: PropertyType,
    },
}

impl Control {
    /// Create the control for a property, holding its default.
    pub fn for_property(def: &PropertyDef) -> Self {
        let mut control = match def.ty {
            PropertyType::Boolean => Self::Toggle(false),
            PropertyType::Integer => {
                let min = def.minimum.unwrap_or(WIDE_MIN);
                let max = def.maximum.unwrap_or(WIDE_MAX).max(min);
                Self::Integer {
                    value: 0_i64.clamp(min, max),
                    min,
                    max,
                }
            }
            PropertyType::String => Self::Text(String::new()),
            PropertyType::Array => Self::Lines {
                text: String::new(),
                item_type: def.item_type,
            },
        };
        if let Some(default) = &def.default {
            control.set_value(default);
        }
        control
    }

    /// Show a document value. Values of another shape are ignored by toggles
    /// and numeric fields and shown as text by text fields.
    pub fn set_value(&mut self, value: &FieldValue) {
        match (self, value) {
            (Self::Toggle(current), FieldValue::Boolean(b)) => *current = *b,
            (Self::Integer { value: current, min, max }, FieldValue::Integer(i)) => {
                *current = (*i).clamp(*min, *max);
            }
            (Self::Text(current), value) => *current = value.display_text(),
            (Self::Lines { text, .. }, value) => *text = value.display_text(),
            _ => {}
        }
    }

    /// Flip or set a toggle. Returns `false` for other kinds.
    pub fn set_bool(&mut self, checked: bool) -> bool {
        match self {
            Self::Toggle(current) => {
                *current = checked;
                true
            }
            _ => false,
        }
    }

    /// Set a numeric field, clamping into its bounds.
    ///
    /// Returns the stored value, or `None` for other kinds.
    pub fn set_integer(&mut self, input: i64) -> Option<i64> {
        match self {
            Self::Integer { value, min, max } => {
                *value = input.clamp(*min, *max);
                Some(*value)
            }
            _ => None,
        }
    }

    /// Replace the text of a text or multi-line field.
    pub fn set_text(&mut self, input: &str) -> bool {
        match self {
            Self::Text(current) | Self::Lines { text: current, .. } => {
                input.clone_into(current);
                true
            }
            _ => false,
        }
    }

    /// Value this control writes to the document.
    ///
    /// Blank lines are dropped from multi-line fields. Integer entries that do
    /// not parse are skipped.
    pub fn value(&self) -> FieldValue {
        match self {
            Self::Toggle(b) => FieldValue::Boolean(*b),
            Self::Integer { value, .. } => FieldValue::Integer(*value),
            Self::Text(s) => FieldValue::String(s.clone()),
            Self::Lines { text, item_type } => FieldValue::Array(
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .filter_map(|line| match item_type {
                        PropertyType::Integer => match line.parse() {
                            Ok(i) => Some(FieldValue::Integer(i)),
                            Err(_) => {
                                warn!("ignoring non-integer array entry {line:?}");
                                None
                            }
                        },
                        _ => Some(FieldValue::String(line.to_string())),
                    })
                    .collect(),
            ),
        }
    }
}
