use std::cmp::Ordering;

use dnd_core::{CompareOp, PositionValue, Scalar};

use crate::index::InstanceId;

/// Result of evaluating a constraint sub-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RuleValue>),
    /// Instances of one draggable, in index order.
    Collection(Vec<InstanceId>),
    Instance(InstanceId),
    /// A failed lookup. Every operation on it yields `Undefined`, every
    /// comparison with it is false.
    Undefined,
}

impl RuleValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Number(value) => *value != 0.0 && !value.is_nan(),
            Self::Text(value) => !value.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Collection(members) => !members.is_empty(),
            Self::Instance(_) => true,
            Self::Undefined => false,
        }
    }

    pub fn compare(&self, op: CompareOp, other: &Self) -> bool {
        if self.contains_undefined() || other.contains_undefined() {
            return false;
        }
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => op.holds(a.partial_cmp(b)),
            (Self::Text(a), Self::Text(b)) => op.holds(Some(a.cmp(b))),
            (Self::Bool(a), Self::Bool(b)) => match op {
                CompareOp::Eq => a == b,
                CompareOp::Ne => a != b,
                _ => false,
            },
            (Self::Instance(a), Self::Instance(b)) => match op {
                CompareOp::Eq => a == b,
                CompareOp::Ne => a != b,
                _ => false,
            },
            (Self::List(_), Self::List(_) | Self::Text(_))
            | (Self::Text(_), Self::List(_)) => match (self.to_position(), other.to_position()) {
                (Some(a), Some(b)) => a.compare(op, &b),
                _ => op.holds(None),
            },
            _ => op.holds(None::<Ordering>),
        }
    }

    fn contains_undefined(&self) -> bool {
        match self {
            Self::Undefined => true,
            Self::List(items) => items.iter().any(Self::contains_undefined),
            _ => false,
        }
    }

    /// Lists of numbers and text become comparator values; anything else has
    /// no positional reading.
    fn to_position(&self) -> Option<PositionValue> {
        match self {
            Self::Number(value) => Some(PositionValue::Scalar(Scalar::Number(*value))),
            Self::Text(value) => Some(PositionValue::text(value.clone())),
            Self::List(items) => items
                .iter()
                .map(Self::to_position)
                .collect::<Option<Vec<_>>>()
                .map(PositionValue::Sequence),
            _ => None,
        }
    }
}

impl From<bool> for RuleValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for RuleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<f64>> for RuleValue {
    fn from(value: Option<f64>) -> Self {
        value.map(Self::Number).unwrap_or(Self::Undefined)
    }
}
