pub mod expr;
pub mod geometry;
pub mod index;
pub mod normalize;
pub mod rules;

pub use expr::{check_constraints, Constraint, RuleValue};
pub use geometry::{resolve_cell, resolve_target, GeometryTable};
pub use index::{
    IndexOptions, InstanceId, PlacedIndex, PlacedInstance, PlacementOrder, Placements,
};
pub use normalize::{
    clean_path, clean_paths, flatten_submission, parse_target_path, NormalizedPlacement,
    NormalizedPosition, TargetPath, TargetRef,
};
pub use rules::{grade_rules, parse_rules_json, Rule, RuleKind, RuleName};
