use dnd_core::{DndError, PositionValue, Submission};
use log::debug;
use serde::Deserialize;

use crate::normalize::{flatten_submission, NormalizedPlacement};

/// One entry of an author's answer list:
/// `{"draggables": [...], "targets": [...], "rule": "anyof"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub draggables: Vec<String>,
    pub targets: Vec<PositionValue>,
    pub rule: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    AnyOf,
    Exact,
    UnorderedEqual,
}

/// A rule name such as `anyof` or `exact+number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleName {
    pub kind: RuleKind,
    /// `+number`: placements must also match the target list in count.
    pub counted: bool,
}

impl RuleName {
    pub fn parse(raw: &str) -> Result<Self, DndError> {
        let trimmed = raw.trim();
        let (base, counted) = match trimmed.strip_suffix("+number") {
            Some(base) => (base, true),
            None => (trimmed, false),
        };
        let kind = match base {
            "anyof" => RuleKind::AnyOf,
            "exact" => RuleKind::Exact,
            "unordered_equal" => RuleKind::UnorderedEqual,
            _ => {
                return Err(DndError::new(
                    "RULE_UNKNOWN",
                    format!(
                        "Unknown rule \"{}\"; expected anyof, exact or unordered_equal, optionally with +number.",
                        raw
                    ),
                ))
            }
        };
        Ok(Self { kind, counted })
    }
}

pub fn parse_rules_json(raw: &str) -> Result<Vec<Rule>, DndError> {
    let rules: Vec<Rule> = serde_json::from_str(raw)
        .map_err(|error| DndError::new("RULE_JSON_INVALID", error.to_string()))?;
    for rule in &rules {
        RuleName::parse(&rule.rule)?;
    }
    Ok(rules)
}

/// Grades a submission against an answer list; every rule must hold.
pub fn grade_rules(submission: &Submission, rules: &[Rule]) -> Result<bool, DndError> {
    if rules.is_empty() {
        return Ok(false);
    }
    let placements = flatten_submission(submission);

    for (index, rule) in rules.iter().enumerate() {
        let name = RuleName::parse(&rule.rule)?;
        if !rule_holds(&placements, rule, name) {
            debug!("rule {} ({}) failed", index, rule.rule);
            return Ok(false);
        }
    }
    Ok(true)
}

fn rule_holds(placements: &[NormalizedPlacement], rule: &Rule, name: RuleName) -> bool {
    let user: Vec<PositionValue> = placements
        .iter()
        .filter(|placement| rule.draggables.contains(&placement.draggable))
        .map(|placement| placement.position.cleaned_value())
        .collect();

    let allowed = |position: &PositionValue| rule.targets.iter().any(|target| position.matches(target));

    let holds = match name.kind {
        RuleKind::AnyOf => user.iter().any(allowed),
        RuleKind::Exact => {
            let every_draggable_placed = rule.draggables.iter().all(|draggable| {
                placements
                    .iter()
                    .any(|placement| &placement.draggable == draggable)
            });
            every_draggable_placed && !user.is_empty() && user.iter().all(allowed)
        }
        RuleKind::UnorderedEqual => unordered_equal(&user, &rule.targets),
    };

    holds && (!name.counted || user.len() == rule.targets.len())
}

fn unordered_equal(user: &[PositionValue], targets: &[PositionValue]) -> bool {
    if user.len() != targets.len() {
        return false;
    }
    let mut remaining: Vec<&PositionValue> = targets.iter().collect();
    for position in user {
        let Some(found) = remaining.iter().position(|target| position.matches(target)) else {
            return false;
        };
        remaining.swap_remove(found);
    }
    true
}
