//! Constraint evaluation on coerced values.

use std::cmp::Ordering;

use modelcheck_core::{FieldError, FieldPath, Value};
use tracing::warn;

use crate::field::Constraint;
use crate::instance::FieldValue;

/// Evaluate every constraint in declared order, returning one error per
/// failing constraint. Constraints that do not apply to the value's type
/// (a length bound on an integer, anything on null) are skipped.
pub fn check_all(
    constraints: &[Constraint],
    value: &FieldValue,
    path: &FieldPath,
) -> Vec<FieldError> {
    constraints
        .iter()
        .filter_map(|c| check(c, value, path))
        .collect()
}

fn check(constraint: &Constraint, value: &FieldValue, path: &FieldPath) -> Option<FieldError> {
    match constraint {
        Constraint::MinLength(min) => {
            let (len, unit, noun) = measure(value)?;
            (len < *min).then(|| {
                violation(
                    constraint,
                    path,
                    len.to_string(),
                    format!("{noun} should have at least {min} {}", plural(unit, *min)),
                )
            })
        }
        Constraint::MaxLength(max) => {
            let (len, unit, noun) = measure(value)?;
            (len > *max).then(|| {
                violation(
                    constraint,
                    path,
                    len.to_string(),
                    format!("{noun} should have at most {max} {}", plural(unit, *max)),
                )
            })
        }
        Constraint::Ge(bound) => numeric(constraint, value, path, *bound, |o| o.is_ge()),
        Constraint::Le(bound) => numeric(constraint, value, path, *bound, |o| o.is_le()),
        Constraint::Gt(bound) => numeric(constraint, value, path, *bound, |o| o.is_gt()),
        Constraint::Lt(bound) => numeric(constraint, value, path, *bound, |o| o.is_lt()),
        Constraint::Pattern(pattern) => {
            let s = value.as_str()?;
            match pattern.regex() {
                Ok(re) if re.is_match(s) => None,
                Ok(_) => Some(violation(
                    constraint,
                    path,
                    s.to_string(),
                    format!("String should match pattern '{pattern}'"),
                )),
                Err(e) => {
                    warn!(field = %path, %pattern, error = %e, "unusable pattern constraint");
                    Some(violation(
                        constraint,
                        path,
                        s.to_string(),
                        format!("Pattern '{pattern}' is not a valid regular expression"),
                    ))
                }
            }
        }
    }
}

/// Length, unit and noun for length constraints.
fn measure(value: &FieldValue) -> Option<(usize, &'static str, &'static str)> {
    match value {
        FieldValue::Scalar(Value::Str(s)) => Some((s.chars().count(), "character", "String")),
        FieldValue::List(items) => Some((items.len(), "item", "List")),
        _ => None,
    }
}

fn numeric(
    constraint: &Constraint,
    value: &FieldValue,
    path: &FieldPath,
    bound: f64,
    holds: impl Fn(Ordering) -> bool,
) -> Option<FieldError> {
    let scalar = value.as_scalar()?;
    let ordering = match scalar {
        Value::Int(n) => compare_int(*n, bound),
        Value::Float(x) => x.partial_cmp(&bound),
        _ => return None,
    };
    if ordering.is_some_and(holds) {
        return None;
    }
    let relation = match constraint {
        Constraint::Ge(_) => "greater than or equal to",
        Constraint::Gt(_) => "greater than",
        Constraint::Le(_) => "less than or equal to",
        _ => "less than",
    };
    Some(violation(
        constraint,
        path,
        scalar.to_string(),
        format!("Input should be {relation} {}", constraint.bound()),
    ))
}

/// Order an integer against a float bound without rounding the integer
/// through `f64`. `None` only for a NaN bound.
fn compare_int(n: i64, bound: f64) -> Option<Ordering> {
    // 2^63: the first float above every i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if bound.is_nan() {
        return None;
    }
    if bound >= LIMIT {
        return Some(Ordering::Less);
    }
    if bound < -LIMIT {
        return Some(Ordering::Greater);
    }
    let floor = bound.floor();
    // In range, so the cast is exact.
    let whole = floor as i64;
    Some(match n.cmp(&whole) {
        Ordering::Equal if floor < bound => Ordering::Less,
        other => other,
    })
}

fn violation(
    constraint: &Constraint,
    path: &FieldPath,
    actual: String,
    message: String,
) -> FieldError {
    FieldError::constraint(path.clone(), constraint.name(), constraint.bound(), actual, message)
}

fn plural(unit: &str, n: usize) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}
