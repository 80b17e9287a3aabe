use std::collections::HashSet;

use dnd_core::{
    BoundingBox, DndError, DraggableDecl, ExerciseDefinition, TargetDecl, TargetKind,
};
use log::debug;

use crate::xml::{parse_xml_document, XmlDocument, XmlElementNode};

pub const DRAG_AND_DROP_INPUT_TAG: &str = "drag_and_drop_input";

/// Parses an exercise definition from its XML source. The draggables and
/// targets are read from the first `<drag_and_drop_input>` element, which may
/// be the document root or nested inside a response wrapper.
pub fn parse_exercise(source: &str) -> Result<ExerciseDefinition, DndError> {
    let document = parse_xml_document(source)?;
    parse_exercise_document(&document)
}

pub fn parse_exercise_document(document: &XmlDocument) -> Result<ExerciseDefinition, DndError> {
    let Some(input) = document.root.find_element(DRAG_AND_DROP_INPUT_TAG) else {
        return Err(DndError::with_span(
            "XML_INPUT_MISSING",
            format!(
                "Exercise must contain a <{}> element.",
                DRAG_AND_DROP_INPUT_TAG
            ),
            document.root.location.clone(),
        ));
    };

    let mut draggables = Vec::new();
    let mut targets = Vec::new();
    let mut draggable_ids = HashSet::new();
    let mut target_ids = HashSet::new();

    for child in input.element_children() {
        match child.name.as_str() {
            "draggable" => {
                let draggable = parse_draggable(child)?;
                if !draggable_ids.insert(draggable.id.clone()) {
                    return Err(DndError::with_span(
                        "DRAGGABLE_DUPLICATE",
                        format!("Duplicate draggable id \"{}\".", draggable.id),
                        child.location.clone(),
                    ));
                }
                draggables.push(draggable);
            }
            "target" => {
                let target = parse_target(child)?;
                if !target_ids.insert(target.id.clone()) {
                    return Err(DndError::with_span(
                        "TARGET_DUPLICATE",
                        format!("Duplicate target id \"{}\".", target.id),
                        child.location.clone(),
                    ));
                }
                targets.push(target);
            }
            _ => {}
        }
    }

    debug!(
        "parsed exercise: {} draggables, {} targets",
        draggables.len(),
        targets.len()
    );

    Ok(ExerciseDefinition {
        image: input.attr("img").map(str::to_string),
        target_outline: parse_bool_attr(input, "target_outline", false)?,
        one_per_target: parse_bool_attr(input, "one_per_target", false)?,
        no_labels: parse_bool_attr(input, "no_labels", false)?,
        draggables,
        targets,
    })
}

fn parse_draggable(node: &XmlElementNode) -> Result<DraggableDecl, DndError> {
    let id = get_required_non_empty_attr(node, "id")?;

    let mut targets = Vec::new();
    let mut seen = HashSet::new();
    for child in node.element_children().filter(|child| child.name == "target") {
        let target = parse_target(child)?;
        if !seen.insert(target.id.clone()) {
            return Err(DndError::with_span(
                "TARGET_DUPLICATE",
                format!(
                    "Duplicate target id \"{}\" inside draggable \"{}\".",
                    target.id, id
                ),
                child.location.clone(),
            ));
        }
        targets.push(target);
    }

    Ok(DraggableDecl {
        id,
        label: node.attr("label").map(str::to_string),
        icon: node.attr("icon").map(str::to_string),
        can_reuse: parse_bool_attr(node, "can_reuse", false)?,
        targets,
        location: node.location.clone(),
    })
}

fn parse_target(node: &XmlElementNode) -> Result<TargetDecl, DndError> {
    let id = get_required_non_empty_attr(node, "id")?;
    let bounds = BoundingBox {
        x: parse_number_attr(node, "x")?,
        y: parse_number_attr(node, "y")?,
        width: parse_extent_attr(node, "w")?,
        height: parse_extent_attr(node, "h")?,
    };

    let kind = match node.attr("type").map(str::trim) {
        None | Some("fixed") => TargetKind::Fixed,
        Some("grid") => TargetKind::Grid {
            cols: parse_grid_dimension(node, "col")?,
            rows: parse_grid_dimension(node, "row")?,
        },
        Some(other) => {
            return Err(DndError::with_span(
                "TARGET_TYPE_INVALID",
                format!(
                    "Target \"{}\" has unsupported type \"{}\"; expected \"fixed\" or \"grid\".",
                    id, other
                ),
                node.location.clone(),
            ))
        }
    };

    Ok(TargetDecl {
        id,
        kind,
        bounds,
        location: node.location.clone(),
    })
}

fn parse_number_attr(node: &XmlElementNode, name: &str) -> Result<f64, DndError> {
    let raw = get_required_non_empty_attr(node, name)?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DndError::with_span(
            "XML_ATTR_NUMBER_INVALID",
            format!(
                "Attribute \"{}\" on <{}> must be a number, got \"{}\".",
                name, node.name, raw
            ),
            node.location.clone(),
        )),
    }
}

fn parse_extent_attr(node: &XmlElementNode, name: &str) -> Result<f64, DndError> {
    let value = parse_number_attr(node, name)?;
    if value < 0.0 {
        return Err(DndError::with_span(
            "XML_ATTR_NUMBER_INVALID",
            format!(
                "Attribute \"{}\" on <{}> cannot be negative.",
                name, node.name
            ),
            node.location.clone(),
        ));
    }
    Ok(value)
}

fn parse_grid_dimension(node: &XmlElementNode, name: &str) -> Result<u32, DndError> {
    let raw = get_required_non_empty_attr(node, name)?;
    let Ok(value) = raw.trim().parse::<u32>() else {
        return Err(DndError::with_span(
            "XML_ATTR_NUMBER_INVALID",
            format!(
                "Attribute \"{}\" on grid target must be a non-negative integer, got \"{}\".",
                name, raw
            ),
            node.location.clone(),
        ));
    };
    if value == 0 {
        return Err(DndError::with_span(
            "GRID_DIMENSION_ZERO",
            format!("Grid target attribute \"{}\" must be greater than zero.", name),
            node.location.clone(),
        ));
    }
    Ok(value)
}

fn parse_bool_attr(node: &XmlElementNode, name: &str, default: bool) -> Result<bool, DndError> {
    let Some(value) = node.attr(name) else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DndError::with_span(
            "XML_ATTR_BOOL_INVALID",
            format!(
                "Attribute \"{}\" on <{}> must be \"true\" or \"false\".",
                name, node.name
            ),
            node.location.clone(),
        )),
    }
}

fn get_required_non_empty_attr(node: &XmlElementNode, name: &str) -> Result<String, DndError> {
    let Some(raw) = node.attributes.get(name) else {
        return Err(DndError::with_span(
            "XML_MISSING_ATTR",
            format!(
                "Missing required attribute \"{}\" on <{}>.",
                name, node.name
            ),
            node.location.clone(),
        ));
    };

    if raw.trim().is_empty() {
        return Err(DndError::with_span(
            "XML_EMPTY_ATTR",
            format!("Attribute \"{}\" on <{}> cannot be empty.", name, node.name),
            node.location.clone(),
        ));
    }

    Ok(raw.to_string())
}
