//! Item update expressions for key-value tables.

use serde::Serialize;
use serde_json::{Map, Value};

/// A `SET` update expression with its attribute values.
///
/// ```rust,ignore
/// let update = UpdateExpression::from_attributes(&json!({"name": "a", "count": 2}).as_object().unwrap());
/// assert_eq!(update.expression, "SET count = :count, name = :name");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateExpression {
    /// The expression, e.g. `SET a = :a, b = :b`.
    #[serde(rename = "UpdateExpression")]
    pub expression: String,
    /// Values keyed by placeholder, e.g. `:a`.
    #[serde(rename = "ExpressionAttributeValues")]
    pub attribute_values: Map<String, Value>,
}

impl UpdateExpression {
    /// Sets every attribute of `attributes` on the item.
    ///
    /// Returns `None` when there is nothing to set.
    pub fn from_attributes(attributes: &Map<String, Value>) -> Option<Self> {
        if attributes.is_empty() {
            return None;
        }

        let assignments: Vec<String> = attributes
            .keys()
            .map(|name| format!("{name} = :{name}"))
            .collect();
        let attribute_values = attributes
            .iter()
            .map(|(name, value)| (format!(":{name}"), value.clone()))
            .collect();

        Some(Self {
            expression: format!("SET {}", assignments.join(", ")),
            attribute_values,
        })
    }
}
