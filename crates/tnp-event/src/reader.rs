//! JSON event ingestion.
//!
//! Input is a JSON array of events; each event maps column names to a
//! scalar or an array of numbers/bools. Integer-valued columns become
//! [`Column::I32`], floats [`Column::F64`], bools [`Column::Bool`];
//! scalars become length-1 columns. Mixed integer/float arrays are read
//! as floats.

use std::path::Path;

use serde_json::Value;
use tnp_core::{Error, Result};

use crate::table::{Column, EventTable};

/// Read all events from a JSON file.
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<EventTable>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    events_from_str(&text)
}

/// Parse events from a JSON string.
pub fn events_from_str(text: &str) -> Result<Vec<EventTable>> {
    let root: Value = serde_json::from_str(text)?;
    let events = root
        .as_array()
        .ok_or_else(|| Error::Validation("expected a top-level JSON array of events".into()))?;

    events.iter().enumerate().map(|(i, ev)| parse_event(ev, i)).collect()
}

fn parse_event(value: &Value, index: usize) -> Result<EventTable> {
    let obj = value.as_object().ok_or_else(|| {
        Error::Validation(format!("event {index}: expected a JSON object of columns"))
    })?;

    let mut table = EventTable::new();
    for (name, val) in obj {
        let column = parse_column(val)
            .map_err(|e| Error::Validation(format!("event {index}, column '{name}': {e}")))?;
        table.define(name.clone(), column)?;
    }
    Ok(table)
}

fn parse_column(value: &Value) -> std::result::Result<Column, String> {
    let items: Vec<&Value> = match value {
        Value::Array(a) => a.iter().collect(),
        scalar => vec![scalar],
    };

    if items.iter().all(|v| v.is_boolean()) && !items.is_empty() {
        return Ok(Column::Bool(items.iter().map(|v| v.as_bool().unwrap_or(false)).collect()));
    }

    if items.iter().all(|v| v.is_i64()) {
        let mut ints = Vec::with_capacity(items.len());
        let mut fits = true;
        for v in &items {
            match i32::try_from(v.as_i64().unwrap_or(0)) {
                Ok(n) => ints.push(n),
                Err(_) => {
                    // 64-bit values (e.g. event numbers) fall through to floats.
                    fits = false;
                    break;
                }
            }
        }
        if fits {
            return Ok(Column::I32(ints));
        }
    }

    let floats = items
        .iter()
        .map(|v| v.as_f64().ok_or_else(|| format!("non-numeric value: {v}")))
        .collect::<std::result::Result<Vec<f64>, String>>()?;
    Ok(Column::F64(floats))
}
