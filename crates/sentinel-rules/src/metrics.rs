// crates/sentinel-rules/src/metrics.rs
// ============================================================================
// Module: Metric Path Resolution
// Description: Dot-notation lookup into nested metric/event mappings.
// Purpose: Let every rule family address a value without knowing its container shape.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! `cpu.utilization` walks `{"cpu": {"utilization": 92}}` one hop per `.`.
//! A numeric array segment is treated as an index into a JSON array. Any
//! missing hop returns `None` rather than erroring — a rule referencing a
//! metric that hasn't arrived yet simply does not trigger.

use serde_json::Value;

/// Resolves `path` (dot-separated segments) against `root`, returning the
/// value at that path or `None` if any hop is missing.
#[must_use]
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|index| items.get(index)),
        _ => None,
    })
}

/// Resolves `path` to a numeric series (`Vec<f64>`), accepting either a JSON
/// array of numbers or a single number (treated as a one-point series).
#[must_use]
pub fn resolve_series(root: &Value, path: &str) -> Option<Vec<f64>> {
    match resolve_path(root, path)? {
        Value::Array(items) => {
            let series: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
            series
        }
        Value::Number(number) => number.as_f64().map(|value| vec![value]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resolves_nested_object_path() {
        let root = json!({"cpu": {"utilization": 92}});
        assert_eq!(resolve_path(&root, "cpu.utilization"), Some(&json!(92)));
    }

    #[test]
    fn missing_hop_is_none() {
        let root = json!({"cpu": {}});
        assert_eq!(resolve_path(&root, "cpu.utilization"), None);
        assert_eq!(resolve_path(&root, "memory.used"), None);
    }

    #[test]
    fn resolves_array_index_segment() {
        let root = json!({"hosts": ["a", "b"]});
        assert_eq!(resolve_path(&root, "hosts.1"), Some(&json!("b")));
    }

    #[test]
    fn resolves_series_from_array_or_scalar() {
        let root = json!({"latency": [1.0, 2.0, 3.0], "errors": 4});
        assert_eq!(resolve_series(&root, "latency"), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(resolve_series(&root, "errors"), Some(vec![4.0]));
        assert_eq!(resolve_series(&root, "missing"), None);
    }
}
