use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::DndError;
use crate::types::Point;

/// Where a single placement event puts a draggable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Placement {
    /// `"target"` or `"target{col}{row}"`.
    Target { path: String },
    /// Raw pixel coordinates `[x, y]`.
    Point { x: f64, y: f64 },
    /// `{slot: {host: <placement>}}`: the draggable sits on target `slot`
    /// scoped to an instance of `host`, itself placed at `host_placement`.
    Nested {
        slot: String,
        host: String,
        host_placement: Box<Placement>,
    },
}

impl Placement {
    pub fn target(path: impl Into<String>) -> Self {
        Self::Target { path: path.into() }
    }

    pub fn nested(
        slot: impl Into<String>,
        host: impl Into<String>,
        host_placement: Placement,
    ) -> Self {
        Self::Nested {
            slot: slot.into(),
            host: host.into(),
            host_placement: Box::new(host_placement),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Nested { host_placement, .. } => 1 + host_placement.depth(),
            _ => 0,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point { x, y } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementEvent {
    pub draggable: String,
    pub placement: Placement,
}

impl PlacementEvent {
    pub fn new(draggable: impl Into<String>, placement: Placement) -> Self {
        Self {
            draggable: draggable.into(),
            placement,
        }
    }
}

/// An ordered student submission.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Submission {
    pub events: Vec<PlacementEvent>,
}

impl Submission {
    pub fn new(events: Vec<PlacementEvent>) -> Self {
        Self { events }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DndError> {
        let value: JsonValue = serde_json::from_str(raw)
            .map_err(|error| DndError::new("SUBMISSION_JSON_INVALID", error.to_string()))?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &JsonValue) -> Result<Self, DndError> {
        let JsonValue::Array(entries) = value else {
            return Err(DndError::new(
                "SUBMISSION_SHAPE",
                format!("Submission must be a JSON array, got {}.", json_kind(value)),
            ));
        };

        let mut events = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let JsonValue::Object(object) = entry else {
                return Err(DndError::new(
                    "SUBMISSION_SHAPE",
                    format!(
                        "Submission entry {} must be an object, got {}.",
                        index,
                        json_kind(entry)
                    ),
                ));
            };
            let (draggable, raw_placement) = single_entry(object, &format!("entry {}", index))?;
            events.push(PlacementEvent {
                draggable: draggable.to_string(),
                placement: parse_placement(raw_placement, &format!("entry {}", index))?,
            });
        }

        Ok(Self { events })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn parse_placement(value: &JsonValue, context: &str) -> Result<Placement, DndError> {
    match value {
        JsonValue::String(path) => Ok(Placement::Target { path: path.clone() }),
        JsonValue::Array(items) => match items.as_slice() {
            [JsonValue::Number(x), JsonValue::Number(y)] => Ok(Placement::Point {
                x: x.as_f64().unwrap_or_default(),
                y: y.as_f64().unwrap_or_default(),
            }),
            _ => Err(DndError::new(
                "SUBMISSION_SHAPE",
                format!(
                    "Coordinate placement in {} must be a pair of numbers.",
                    context
                ),
            )),
        },
        JsonValue::Object(slot_map) => {
            let (slot, host_map) = single_entry(slot_map, context)?;
            let JsonValue::Object(host_map) = host_map else {
                return Err(DndError::new(
                    "SUBMISSION_SHAPE",
                    format!(
                        "Nested placement \"{}\" in {} must map to a host object, got {}.",
                        slot,
                        context,
                        json_kind(host_map)
                    ),
                ));
            };
            let (host, host_value) = single_entry(host_map, context)?;
            Ok(Placement::Nested {
                slot: slot.to_string(),
                host: host.to_string(),
                host_placement: Box::new(parse_placement(host_value, context)?),
            })
        }
        other => Err(DndError::new(
            "SUBMISSION_SHAPE",
            format!(
                "Placement in {} must be a string, a coordinate pair or a nested object, got {}.",
                context,
                json_kind(other)
            ),
        )),
    }
}

fn single_entry<'a>(
    object: &'a Map<String, JsonValue>,
    context: &str,
) -> Result<(&'a str, &'a JsonValue), DndError> {
    let mut iter = object.iter();
    match (iter.next(), iter.next()) {
        (Some((key, value)), None) => Ok((key.as_str(), value)),
        _ => Err(DndError::new(
            "SUBMISSION_SHAPE",
            format!(
                "Expected exactly one key in {}, found {}.",
                context,
                object.len()
            ),
        )),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
