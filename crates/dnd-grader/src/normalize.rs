use std::sync::OnceLock;

use dnd_core::{Cell, Placement, Point, PositionValue, Submission};
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedPosition {
    Path(String),
    Point(Point),
}

impl NormalizedPosition {
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(path) => Some(path.as_str()),
            Self::Point(_) => None,
        }
    }

    /// The position used for identity checks: grid cells are dropped.
    pub fn cleaned_value(&self) -> PositionValue {
        match self {
            Self::Path(path) => PositionValue::text(clean_path(path)),
            Self::Point(point) => PositionValue::from(*point),
        }
    }
}

/// `{draggable_id: target_path}` after flattening.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPlacement {
    pub draggable: String,
    pub position: NormalizedPosition,
}

impl NormalizedPlacement {
    pub fn path(draggable: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            draggable: draggable.into(),
            position: NormalizedPosition::Path(path.into()),
        }
    }
}

pub fn flatten_submission(submission: &Submission) -> Vec<NormalizedPlacement> {
    submission
        .events
        .iter()
        .map(|event| NormalizedPlacement {
            draggable: event.draggable.clone(),
            position: flatten_placement(&event.placement),
        })
        .collect()
}

/// Nested placements become `<host target>[<host>][<slot>]`, chained
/// outwards, e.g. `s_l[s][second][p][first]`.
pub fn flatten_placement(placement: &Placement) -> NormalizedPosition {
    match placement {
        Placement::Target { path } => NormalizedPosition::Path(path.clone()),
        Placement::Point { x, y } => NormalizedPosition::Point(Point::new(*x, *y)),
        Placement::Nested {
            slot,
            host,
            host_placement,
        } => match flatten_placement(host_placement) {
            NormalizedPosition::Path(host_path) => {
                NormalizedPosition::Path(format!("{}[{}][{}]", host_path, host, slot))
            }
            NormalizedPosition::Point(point) => NormalizedPosition::Path(format!(
                "{}[{}][{}]",
                point_label(point),
                host,
                slot
            )),
        },
    }
}

pub fn clean_path(path: &str) -> String {
    cell_suffix_regex().replace_all(path, "").into_owned()
}

pub fn clean_paths(placements: &[NormalizedPlacement]) -> Vec<NormalizedPlacement> {
    placements
        .iter()
        .map(|placement| NormalizedPlacement {
            draggable: placement.draggable.clone(),
            position: match &placement.position {
                NormalizedPosition::Path(path) => NormalizedPosition::Path(clean_path(path)),
                NormalizedPosition::Point(point) => NormalizedPosition::Point(*point),
            },
        })
        .collect()
}

/// A target id with an optional grid cell, e.g. `base_target{5}{10}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    pub id: String,
    pub cell: Option<Cell>,
}

impl TargetRef {
    pub fn parse(raw: &str) -> Self {
        if let Some(captures) = trailing_cell_regex().captures(raw) {
            let col = captures[2].parse::<u32>();
            let row = captures[3].parse::<u32>();
            if let (Ok(col), Ok(row)) = (col, row) {
                return Self {
                    id: captures[1].to_string(),
                    cell: Some(Cell { col, row }),
                };
            }
        }
        Self {
            id: raw.to_string(),
            cell: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    pub host: String,
    pub slot: TargetRef,
}

/// A flattened path split into its outermost target and the chain of
/// `[host][slot]` pairs leading to the innermost target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath {
    pub base: TargetRef,
    pub chain: Vec<ChainLink>,
}

impl TargetPath {
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    pub fn innermost(&self) -> &TargetRef {
        self.chain.last().map(|link| &link.slot).unwrap_or(&self.base)
    }
}

/// Paths whose bracket groups are unbalanced or unpaired are treated as a
/// plain target id.
pub fn parse_target_path(path: &str) -> TargetPath {
    let plain = || TargetPath {
        base: TargetRef::parse(path),
        chain: Vec::new(),
    };

    let Some(first_bracket) = path.find('[') else {
        return plain();
    };

    let mut groups = Vec::new();
    let mut rest = &path[first_bracket..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return plain();
        };
        let Some(close) = inner.find(']') else {
            return plain();
        };
        let group = &inner[..close];
        if group.is_empty() || group.contains('[') {
            return plain();
        }
        groups.push(group);
        rest = &inner[close + 1..];
    }

    if groups.len() % 2 != 0 {
        return plain();
    }

    TargetPath {
        base: TargetRef::parse(&path[..first_bracket]),
        chain: groups
            .chunks(2)
            .map(|pair| ChainLink {
                host: pair[0].to_string(),
                slot: TargetRef::parse(pair[1]),
            })
            .collect(),
    }
}

/// Path prefix naming the host instance of the innermost link.
pub fn host_path(path: &str) -> Option<String> {
    let parsed = parse_target_path(path);
    if parsed.chain.is_empty() {
        return None;
    }
    let mut out = render_target_ref(&parsed.base);
    for link in &parsed.chain[..parsed.chain.len() - 1] {
        out.push_str(&format!("[{}][{}]", link.host, render_target_ref(&link.slot)));
    }
    Some(out)
}

fn render_target_ref(target: &TargetRef) -> String {
    match target.cell {
        Some(cell) => format!("{}{{{}}}{{{}}}", target.id, cell.col, cell.row),
        None => target.id.clone(),
    }
}

pub(crate) fn point_label(point: Point) -> String {
    format!("({},{})", point.x, point.y)
}

fn cell_suffix_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\{\d+\}\{\d+\}").expect("cell suffix regex"))
}

fn trailing_cell_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^(.*)\{(\d+)\}\{(\d+)\}$").expect("trailing cell regex"))
}
