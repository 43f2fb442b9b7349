use toml::{Table, Value};

/// Combines the accumulated value for a key (if any) with a fragment's value.
/// `None` means the key produces no output.
pub type MergeFn = fn(Option<&Value>, &Value) -> Option<Value>;

/// Matching-only keys never reach the effective config.
pub fn suppress(_base: Option<&Value>, _overlay: &Value) -> Option<Value> {
    None
}

/// Shallow map union: entries from `overlay` win on collision.
/// Always builds a fresh table; neither input is aliased.
pub fn assign(base: Option<&Value>, overlay: &Value) -> Option<Value> {
    let Value::Table(overlay_tbl) = overlay else {
        return Some(overlay.clone());
    };
    let mut merged = match base {
        Some(Value::Table(base_tbl)) => base_tbl.clone(),
        _ => Table::new(),
    };
    for (key, val) in overlay_tbl {
        merged.insert(key.clone(), val.clone());
    }
    Some(Value::Table(merged))
}

/// Later value replaces earlier value wholesale.
pub fn overwrite(_base: Option<&Value>, overlay: &Value) -> Option<Value> {
    Some(overlay.clone())
}
