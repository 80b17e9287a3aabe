use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::types::Point;

/// Pixels of slack granted when two coordinate positions are compared.
pub const DEFAULT_FORGIVENESS_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }

    /// Applies the operator to an ordering; `None` means the operands are
    /// unordered and only `!=` holds.
    pub fn holds(self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (Self::Ne, None) => true,
            (_, None) => false,
            (Self::Eq, Some(ord)) => ord == Ordering::Equal,
            (Self::Ne, Some(ord)) => ord != Ordering::Equal,
            (Self::Lt, Some(ord)) => ord == Ordering::Less,
            (Self::Gt, Some(ord)) => ord == Ordering::Greater,
            (Self::Le, Some(ord)) => ord != Ordering::Greater,
            (Self::Ge, Some(ord)) => ord != Ordering::Less,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

/// A position as authors and students write it: a target id (`"t1"`,
/// `["t", "1"]`), a coordinate pair (`[x, y]`) or a coordinate pair with its
/// own forgiveness radius (`[[x, y], r]`).
///
/// Equality is positional, not structural: coordinates match inside the
/// forgiveness radius, text matches after concatenation, and empty values
/// match nothing, themselves included.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub enum PositionValue {
    #[default]
    Empty,
    Scalar(Scalar),
    Sequence(Vec<PositionValue>),
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Empty,
    Coordinates { center: Point, radius: Option<f64> },
    Text(String),
    Invalid,
}

impl PositionValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Scalar(Scalar::Text(value))
        }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::Sequence(vec![
            Self::Scalar(Scalar::Number(x)),
            Self::Scalar(Scalar::Number(y)),
        ])
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.shape(), Shape::Empty)
    }

    pub fn matches(&self, other: &Self) -> bool {
        match (self.shape(), other.shape()) {
            (
                Shape::Coordinates {
                    center: a,
                    radius: ra,
                },
                Shape::Coordinates {
                    center: b,
                    radius: rb,
                },
            ) => {
                let radius = DEFAULT_FORGIVENESS_RADIUS
                    .max(ra.unwrap_or(DEFAULT_FORGIVENESS_RADIUS))
                    .max(rb.unwrap_or(DEFAULT_FORGIVENESS_RADIUS));
                let dx = b.x - a.x;
                let dy = b.y - a.y;
                dx * dx + dy * dy <= radius * radius
            }
            (Shape::Text(a), Shape::Text(b)) => a == b,
            _ => false,
        }
    }

    pub fn compare(&self, op: CompareOp, other: &Self) -> bool {
        op.holds(self.partial_cmp(other))
    }

    fn shape(&self) -> Shape {
        match self {
            Self::Empty => Shape::Empty,
            Self::Scalar(Scalar::Text(value)) if value.is_empty() => Shape::Empty,
            Self::Scalar(Scalar::Text(value)) => Shape::Text(value.clone()),
            Self::Scalar(Scalar::Number(_)) => Shape::Invalid,
            Self::Sequence(items) => match items.as_slice() {
                [] => Shape::Empty,
                [Self::Scalar(Scalar::Text(_)), ..] => {
                    let mut joined = String::new();
                    for item in items {
                        match item {
                            Self::Scalar(Scalar::Text(part)) => joined.push_str(part),
                            _ => return Shape::Invalid,
                        }
                    }
                    Shape::Text(joined)
                }
                [Self::Scalar(Scalar::Number(x)), Self::Scalar(Scalar::Number(y))] => {
                    Shape::Coordinates {
                        center: Point::new(*x, *y),
                        radius: None,
                    }
                }
                [Self::Sequence(pair), Self::Scalar(Scalar::Number(radius))] => {
                    match pair.as_slice() {
                        [Self::Scalar(Scalar::Number(x)), Self::Scalar(Scalar::Number(y))] => {
                            Shape::Coordinates {
                                center: Point::new(*x, *y),
                                radius: Some(*radius),
                            }
                        }
                        _ => Shape::Invalid,
                    }
                }
                _ => Shape::Invalid,
            },
        }
    }
}

impl PartialEq for PositionValue {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl PartialOrd for PositionValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.matches(other) {
            return Some(Ordering::Equal);
        }
        match (self.shape(), other.shape()) {
            (Shape::Coordinates { center: a, .. }, Shape::Coordinates { center: b, .. }) => {
                match a.x.partial_cmp(&b.x)? {
                    Ordering::Equal => a.y.partial_cmp(&b.y),
                    ordering => Some(ordering),
                }
            }
            (Shape::Text(a), Shape::Text(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    }
}

impl From<Point> for PositionValue {
    fn from(point: Point) -> Self {
        Self::point(point.x, point.y)
    }
}

impl From<&str> for PositionValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl TryFrom<JsonValue> for PositionValue {
    type Error = String;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Null => Ok(Self::Empty),
            JsonValue::String(text) => Ok(Self::text(text)),
            JsonValue::Number(number) => number
                .as_f64()
                .map(|value| Self::Scalar(Scalar::Number(value)))
                .ok_or_else(|| format!("Number {} is out of range.", number)),
            JsonValue::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Sequence),
            JsonValue::Bool(_) | JsonValue::Object(_) => Err(format!(
                "Position must be a string, number or list, got {}.",
                value
            )),
        }
    }
}

impl From<PositionValue> for JsonValue {
    fn from(value: PositionValue) -> Self {
        match value {
            PositionValue::Empty => JsonValue::Null,
            PositionValue::Scalar(Scalar::Number(value)) => serde_json::json!(value),
            PositionValue::Scalar(Scalar::Text(value)) => JsonValue::String(value),
            PositionValue::Sequence(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
        }
    }
}
