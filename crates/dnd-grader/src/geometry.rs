use std::collections::BTreeMap;

use dnd_core::{Cell, ExerciseDefinition, Point, TargetDecl, TargetKind};

use crate::normalize::TargetRef;

/// `None` is the top-level scope, `Some(draggable_id)` the targets declared
/// inside that draggable.
pub type Scope = Option<String>;

/// Target lookup keyed by `(scope, target_id)`.
#[derive(Debug, Clone, Default)]
pub struct GeometryTable {
    targets: BTreeMap<(Scope, String), TargetDecl>,
}

impl GeometryTable {
    pub fn from_exercise(exercise: &ExerciseDefinition) -> Self {
        let mut targets = BTreeMap::new();
        for target in &exercise.targets {
            targets.insert((None, target.id.clone()), target.clone());
        }
        for draggable in &exercise.draggables {
            for target in &draggable.targets {
                targets.insert(
                    (Some(draggable.id.clone()), target.id.clone()),
                    target.clone(),
                );
            }
        }
        Self { targets }
    }

    pub fn get(&self, scope: Option<&str>, id: &str) -> Option<&TargetDecl> {
        self.targets
            .get(&(scope.map(str::to_string), id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Resolves a reference to a point. Top-level targets yield absolute
    /// coordinates; scoped targets yield offsets from their host instance.
    /// `None` means the lookup failed.
    pub fn resolve(&self, scope: Option<&str>, target: &TargetRef) -> Option<Point> {
        let decl = self.get(scope, &target.id)?;
        resolve_target(decl, target.cell)
    }

    /// First top-level target whose box contains `point`.
    pub fn top_level_target_at(&self, point: Point) -> Option<&TargetDecl> {
        self.targets
            .iter()
            .filter(|((scope, _), _)| scope.is_none())
            .map(|(_, decl)| decl)
            .find(|decl| decl.bounds.contains(point))
    }
}

pub fn resolve_target(target: &TargetDecl, cell: Option<Cell>) -> Option<Point> {
    match (target.kind, cell) {
        (TargetKind::Fixed, None) => Some(target.bounds.origin()),
        (TargetKind::Fixed, Some(_)) => None,
        (TargetKind::Grid { .. }, None) => Some(target.bounds.center()),
        (TargetKind::Grid { .. }, Some(cell)) => resolve_cell(target, cell),
    }
}

/// Centre of a grid cell: `x + cell_width * (col + 0.5)`.
pub fn resolve_cell(target: &TargetDecl, cell: Cell) -> Option<Point> {
    let (cell_width, cell_height) = target.cell_size()?;
    Some(Point::new(
        target.bounds.x + cell_width * (f64::from(cell.col) + 0.5),
        target.bounds.y + cell_height * (f64::from(cell.row) + 0.5),
    ))
}
