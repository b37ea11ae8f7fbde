use serde_json::{Number, Value};
use std::collections::HashMap;

use crate::job::{Group, Pair};

/// Identity of a grouping key.
///
/// Scalars compare by their text form, so `1`, `1.0` and `"1"` share a group.
/// Arrays and objects compare by their JSON encoding.
#[derive(Debug, PartialEq, Eq, Hash)]
enum GroupKey {
    Scalar(String),
    Compound(String),
}

impl GroupKey {
    fn of(key: &Value) -> Self {
        match key {
            Value::String(s) => Self::Scalar(s.clone()),
            Value::Number(n) => Self::Scalar(number_text(n)),
            Value::Bool(b) => Self::Scalar(b.to_string()),
            Value::Null => Self::Scalar("null".to_string()),
            // serde_json keeps object keys sorted, so equal values serialize equally.
            Value::Array(_) | Value::Object(_) => Self::Compound(key.to_string()),
        }
    }
}

/// Text of a number with integral floats written without a fraction
fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            format!("{}", f as i64)
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Collect the values of `pairs` per key.
///
/// Groups appear in the order their key was first seen, carry the key as it
/// was first emitted, and values keep their pair order.
pub fn group_pairs(pairs: Vec<Pair>) -> Vec<Group> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for Pair(key, value) in pairs {
        let slot = *index.entry(GroupKey::of(&key)).or_insert_with(|| {
            groups.push(Group(key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(value);
    }

    groups
}
