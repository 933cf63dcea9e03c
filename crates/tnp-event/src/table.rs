//! Per-event named-column storage.
//!
//! One [`EventTable`] holds the attribute arrays of a single event.
//! Columns belonging to the same physical collection (`Electron_*`,
//! `Jet_*`, `TrigObj_*`, `GenPart_*`) are co-indexed and must share a
//! length; distinct collections have independent lengths. Cross-collection
//! relations are expressed only through matching, never shared indices.

use std::collections::HashMap;

use tnp_core::{Error, Result};

/// A typed attribute array for one object collection (or a length-1
/// scalar for per-event quantities).
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating-point attribute (momenta, angles, scores).
    F64(Vec<f64>),
    /// Integer attribute (identity codes, bitmasks, ID levels, charge).
    I32(Vec<i32>),
    /// Boolean attribute (eligibility masks, derived flags).
    Bool(Vec<bool>),
}

impl Column {
    /// Number of objects in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::F64(v) => v.len(),
            Column::I32(v) => v.len(),
            Column::Bool(v) => v.len(),
        }
    }

    /// True when the column is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric view of element `i` (bools map to 0/1).
    pub fn value(&self, i: usize) -> f64 {
        match self {
            Column::F64(v) => v[i],
            Column::I32(v) => f64::from(v[i]),
            Column::Bool(v) => {
                if v[i] {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Named columns of one event.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    columns: HashMap<String, Column>,
}

impl EventTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a named column. Redefining an existing name is an error;
    /// derived columns must pick fresh names, like any other column.
    pub fn define(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(Error::Validation(format!("column '{name}' already defined")));
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Look up a column by name.
    pub fn col(&self, name: &str) -> Result<&Column> {
        self.columns.get(name).ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// True when the named column exists.
    pub fn has(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Floating-point column view.
    pub fn floats(&self, name: &str) -> Result<&[f64]> {
        match self.col(name)? {
            Column::F64(v) => Ok(v),
            other => Err(Error::ColumnType(format!(
                "'{name}' is not a float column (len {})",
                other.len()
            ))),
        }
    }

    /// Integer column view.
    pub fn ints(&self, name: &str) -> Result<&[i32]> {
        match self.col(name)? {
            Column::I32(v) => Ok(v),
            other => Err(Error::ColumnType(format!(
                "'{name}' is not an integer column (len {})",
                other.len()
            ))),
        }
    }

    /// Boolean column view.
    pub fn flags(&self, name: &str) -> Result<&[bool]> {
        match self.col(name)? {
            Column::Bool(v) => Ok(v),
            other => Err(Error::ColumnType(format!(
                "'{name}' is not a boolean column (len {})",
                other.len()
            ))),
        }
    }

    /// Length of the named column.
    pub fn len_of(&self, name: &str) -> Result<usize> {
        Ok(self.col(name)?.len())
    }

    /// Check that every column sharing the `<Collection>_` prefix of
    /// `name` agrees on length, and return that length.
    pub fn collection_len(&self, name: &str) -> Result<usize> {
        let n = self.len_of(name)?;
        let prefix = match name.split_once('_') {
            Some((p, _)) => p,
            None => return Ok(n),
        };
        for (other, col) in &self.columns {
            if other.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('_'))
                && col.len() != n
            {
                return Err(Error::LengthMismatch {
                    name: other.clone(),
                    expected: n,
                    got: col.len(),
                });
            }
        }
        Ok(n)
    }

    /// Names of all defined columns (unordered).
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EventTable {
        let mut t = EventTable::new();
        t.define("Electron_pt", Column::F64(vec![40.0, 25.0])).unwrap();
        t.define("Electron_charge", Column::I32(vec![-1, 1])).unwrap();
        t.define("Jet_pt", Column::F64(vec![55.0])).unwrap();
        t.define("event", Column::I32(vec![1234])).unwrap();
        t
    }

    #[test]
    fn typed_access() {
        let t = table();
        assert_eq!(t.floats("Electron_pt").unwrap(), &[40.0, 25.0]);
        assert_eq!(t.ints("Electron_charge").unwrap(), &[-1, 1]);
        assert!(matches!(t.floats("Electron_charge"), Err(Error::ColumnType(_))));
        assert!(matches!(t.floats("nope"), Err(Error::ColumnNotFound(_))));
    }

    #[test]
    fn collections_are_independent() {
        let t = table();
        assert_eq!(t.collection_len("Electron_pt").unwrap(), 2);
        assert_eq!(t.collection_len("Jet_pt").unwrap(), 1);
        assert_eq!(t.collection_len("event").unwrap(), 1);
    }

    #[test]
    fn collection_length_mismatch() {
        let mut t = table();
        t.define("Electron_eta", Column::F64(vec![0.5])).unwrap();
        assert!(matches!(
            t.collection_len("Electron_pt"),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn no_redefinition() {
        let mut t = table();
        let err = t.define("Electron_pt", Column::F64(vec![1.0])).unwrap_err();
        assert!(err.to_string().contains("already defined"));
    }

    #[test]
    fn numeric_coercion() {
        let c = Column::Bool(vec![true, false]);
        assert_eq!(c.value(0), 1.0);
        assert_eq!(c.value(1), 0.0);
        let c = Column::I32(vec![-11]);
        assert_eq!(c.value(0), -11.0);
    }
}
