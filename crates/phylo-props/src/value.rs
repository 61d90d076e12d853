//! Property results and their declared shapes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Declared result shape of a property specification.
///
/// The shape is fixed at registration time; every computed value must
/// match it, and genes may only wrap numeric shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    /// A single numeric value.
    Scalar,
    /// A numeric vector of fixed length.
    Vector(usize),
    /// A record of named numeric fields, flattened in key order.
    Record(Vec<String>),
    /// A symbolic label; not usable as gene input.
    Text,
}

impl Shape {
    /// Numeric arity of the shape, if it has one.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Shape::Scalar => Some(1),
            Shape::Vector(len) => Some(*len),
            Shape::Record(fields) => Some(fields.len()),
            Shape::Text => None,
        }
    }
}

/// A computed property result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Single numeric value.
    Scalar(f64),
    /// Fixed-length numeric vector.
    Vector(Vec<f64>),
    /// Named numeric fields; iteration order is key order.
    Record(BTreeMap<String, f64>),
    /// Symbolic label.
    Text(String),
}

impl PropertyValue {
    /// Whether the value conforms to the declared shape.
    pub fn matches(&self, shape: &Shape) -> bool {
        match (self, shape) {
            (PropertyValue::Scalar(_), Shape::Scalar) => true,
            (PropertyValue::Vector(values), Shape::Vector(len)) => values.len() == *len,
            (PropertyValue::Record(fields), Shape::Record(names)) => {
                fields.len() == names.len() && names.iter().all(|name| fields.contains_key(name))
            }
            (PropertyValue::Text(_), Shape::Text) => true,
            _ => false,
        }
    }

    /// Flattens the value into numeric components, if it has any.
    ///
    /// Records flatten in key order so the column layout is deterministic.
    pub fn flatten(&self) -> Option<Vec<f64>> {
        match self {
            PropertyValue::Scalar(value) => Some(vec![*value]),
            PropertyValue::Vector(values) => Some(values.clone()),
            PropertyValue::Record(fields) => Some(fields.values().copied().collect()),
            PropertyValue::Text(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_flattens_in_key_order() {
        let mut fields = BTreeMap::new();
        fields.insert("b".to_string(), 2.0);
        fields.insert("a".to_string(), 1.0);
        let value = PropertyValue::Record(fields);
        assert_eq!(value.flatten(), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn shape_mismatch_is_detected() {
        let value = PropertyValue::Vector(vec![1.0, 2.0]);
        assert!(value.matches(&Shape::Vector(2)));
        assert!(!value.matches(&Shape::Vector(3)));
        assert!(!value.matches(&Shape::Scalar));
    }
}
