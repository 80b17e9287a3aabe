use crate::index::{filter_on, PlacedIndex};

use super::parser::{Expr, Property};
use super::value::RuleValue;

/// Evaluates a parsed expression against an index. Lookups that fail yield
/// `Undefined` rather than an error.
pub fn evaluate(expr: &Expr, index: &PlacedIndex) -> RuleValue {
    match expr {
        Expr::Number(value) => RuleValue::Number(*value),
        Expr::Str(value) => RuleValue::Text(value.clone()),
        Expr::Bool(value) => RuleValue::Bool(*value),
        Expr::List(items) => {
            RuleValue::List(items.iter().map(|item| evaluate(item, index)).collect())
        }
        Expr::Root => RuleValue::Undefined,
        Expr::Index { target, index: key } => {
            let key = evaluate(key, index);
            if matches!(**target, Expr::Root) {
                return match key {
                    RuleValue::Text(id) => index
                        .members(&id)
                        .map(|members| RuleValue::Collection(members.to_vec()))
                        .unwrap_or(RuleValue::Undefined),
                    _ => RuleValue::Undefined,
                };
            }
            index_value(evaluate(target, index), &key)
        }
        Expr::Property { target, property } => {
            property_value(evaluate(target, index), *property, index)
        }
        Expr::On { target, target_id } => {
            match (evaluate(target, index), evaluate(target_id, index)) {
                (RuleValue::Collection(members), RuleValue::Text(target_id)) => {
                    RuleValue::Collection(filter_on(index, &members, &target_id))
                }
                _ => RuleValue::Undefined,
            }
        }
        Expr::Contains { target, ids, exact } => {
            let RuleValue::Instance(host) = evaluate(target, index) else {
                return RuleValue::Undefined;
            };
            let mut wanted = Vec::with_capacity(ids.len());
            for id in ids {
                match evaluate(id, index) {
                    RuleValue::Text(id) => wanted.push(id),
                    _ => return RuleValue::Undefined,
                }
            }
            let exact = match exact.as_deref().map(|expr| evaluate(expr, index)) {
                None => true,
                Some(RuleValue::Bool(value)) => value,
                Some(_) => return RuleValue::Undefined,
            };
            let wanted: Vec<&str> = wanted.iter().map(String::as_str).collect();
            RuleValue::Bool(index.contains(host, &wanted, exact))
        }
        Expr::Compare { op, lhs, rhs } => {
            let lhs = evaluate(lhs, index);
            let rhs = evaluate(rhs, index);
            RuleValue::Bool(lhs.compare(*op, &rhs))
        }
        Expr::And(lhs, rhs) => {
            RuleValue::Bool(evaluate(lhs, index).truthy() && evaluate(rhs, index).truthy())
        }
        Expr::Or(lhs, rhs) => {
            RuleValue::Bool(evaluate(lhs, index).truthy() || evaluate(rhs, index).truthy())
        }
        Expr::Not(inner) => match evaluate(inner, index) {
            RuleValue::Undefined => RuleValue::Undefined,
            value => RuleValue::Bool(!value.truthy()),
        },
    }
}

fn index_value(target: RuleValue, key: &RuleValue) -> RuleValue {
    let Some(position) = as_position(key) else {
        return RuleValue::Undefined;
    };
    match target {
        RuleValue::Collection(members) => members
            .get(position)
            .copied()
            .map(RuleValue::Instance)
            .unwrap_or(RuleValue::Undefined),
        RuleValue::List(mut items) if position < items.len() => items.swap_remove(position),
        _ => RuleValue::Undefined,
    }
}

fn as_position(key: &RuleValue) -> Option<usize> {
    match key {
        RuleValue::Number(value) if *value >= 0.0 && value.fract() == 0.0 => {
            Some(*value as usize)
        }
        _ => None,
    }
}

fn property_value(target: RuleValue, property: Property, index: &PlacedIndex) -> RuleValue {
    match (target, property) {
        (RuleValue::Collection(members), Property::Count) => RuleValue::Number(members.len() as f64),
        (RuleValue::List(items), Property::Count) => RuleValue::Number(items.len() as f64),
        (RuleValue::Instance(id), Property::X) => {
            RuleValue::from(index.instance(id).and_then(|instance| instance.x()))
        }
        (RuleValue::Instance(id), Property::Y) => {
            RuleValue::from(index.instance(id).and_then(|instance| instance.y()))
        }
        _ => RuleValue::Undefined,
    }
}
