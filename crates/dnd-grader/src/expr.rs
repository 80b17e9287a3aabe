//! Constraint expressions authors attach to an exercise, such as
//! `draggables['house'].on('base_target')[0].contains('sun', 'sun')`.

mod eval;
mod lexer;
mod parser;
mod value;

use dnd_core::DndError;
use log::debug;

use crate::index::PlacedIndex;

pub use eval::evaluate;
pub use parser::{parse_expression, Expr, Property, ROOT_NAMES};
pub use value::RuleValue;

/// A parsed constraint program: one expression, or a top-level list whose
/// items must all hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    source: String,
    expr: Expr,
}

impl Constraint {
    pub fn parse(source: &str) -> Result<Self, DndError> {
        let expr = parse_expression(source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn evaluate(&self, index: &PlacedIndex) -> bool {
        match &self.expr {
            Expr::List(items) => items.iter().enumerate().all(|(position, item)| {
                let holds = evaluate(item, index).truthy();
                if !holds {
                    debug!("constraint item {} failed: {}", position, self.source.trim());
                }
                holds
            }),
            expr => evaluate(expr, index).truthy(),
        }
    }
}

/// Parses every program first so an authoring error is reported even when an
/// earlier program already fails.
pub fn check_constraints(index: &PlacedIndex, sources: &[&str]) -> Result<bool, DndError> {
    let constraints = sources
        .iter()
        .map(|source| Constraint::parse(source))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(constraints
        .iter()
        .all(|constraint| constraint.evaluate(index)))
}
