use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    pub fn synthetic() -> Self {
        Self {
            start: SourceLocation { line: 1, column: 1 },
            end: SourceLocation { line: 1, column: 1 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, by: Point) -> Self {
        Self {
            x: self.x + by.x,
            y: self.y + by.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TargetKind {
    Fixed,
    Grid { cols: u32, rows: u32 },
}

/// A grid cell reference, `{col}{row}` in submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub col: u32,
    pub row: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDecl {
    pub id: String,
    pub kind: TargetKind,
    pub bounds: BoundingBox,
    pub location: SourceSpan,
}

impl TargetDecl {
    pub fn cell_size(&self) -> Option<(f64, f64)> {
        match self.kind {
            TargetKind::Grid { cols, rows } => Some((
                self.bounds.width / f64::from(cols),
                self.bounds.height / f64::from(rows),
            )),
            TargetKind::Fixed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraggableDecl {
    pub id: String,
    pub label: Option<String>,
    pub icon: Option<String>,
    pub can_reuse: bool,
    pub targets: Vec<TargetDecl>,
    pub location: SourceSpan,
}

impl DraggableDecl {
    pub fn is_container(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn target(&self, id: &str) -> Option<&TargetDecl> {
        self.targets.iter().find(|target| target.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub image: Option<String>,
    pub target_outline: bool,
    pub one_per_target: bool,
    pub no_labels: bool,
    pub draggables: Vec<DraggableDecl>,
    pub targets: Vec<TargetDecl>,
}

impl ExerciseDefinition {
    pub fn draggable(&self, id: &str) -> Option<&DraggableDecl> {
        self.draggables.iter().find(|draggable| draggable.id == id)
    }

    pub fn target(&self, id: &str) -> Option<&TargetDecl> {
        self.targets.iter().find(|target| target.id == id)
    }
}
