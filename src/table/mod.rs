//! In-memory tabular data.
//!
//! A [`Table`] is an ordered list of named columns plus rows of JSON scalar
//! cells. It is the shape every dataset source materializes into, whether the
//! data came from a local CSV file or from the catalog.
//!
//! Cells are typed one at a time, so a column holding `1, 2.5, n/a` keeps each
//! value as its natural JSON scalar. Readers then call
//! [`Table::widen_numeric_columns`] so a purely numeric column holds a single
//! number kind: `1` and `1.0` in the same column are the same value.

pub mod io_csv;

use serde_json::{Map, Number, Value};

use crate::error::PackError;

/// A table of named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Returns the row back if its width does not match the header.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), Vec<Value>> {
        if row.len() != self.columns.len() {
            return Err(row);
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Check an optional target column against the header.
    ///
    /// An empty name counts as no target.
    ///
    /// # Errors
    /// Returns [`PackError::TargetNotFound`] if the target is not a column.
    pub fn target_column<'t>(
        &self,
        target: Option<&'t str>,
    ) -> Result<Option<&'t str>, PackError> {
        match target.filter(|name| !name.is_empty()) {
            Some(name) if !self.has_column(name) => Err(PackError::TargetNotFound {
                target: name.to_string(),
                columns: self.columns.clone(),
            }),
            target => Ok(target),
        }
    }

    /// Iterate over the values of one column, top to bottom.
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Distinct values of a column in order of first appearance.
    pub fn unique_values(&self, name: &str) -> Option<Vec<Value>> {
        let mut seen = Vec::new();
        for value in self.column_values(name)? {
            if !seen.contains(value) {
                seen.push(value.clone());
            }
        }
        Some(seen)
    }

    /// Convert integers to floats in every column whose non-null cells are all
    /// numbers and include at least one float.
    pub fn widen_numeric_columns(&mut self) {
        for index in 0..self.columns.len() {
            let mut has_float = false;
            let mut all_numeric = true;
            for row in &self.rows {
                match &row[index] {
                    Value::Null => {}
                    Value::Number(number) => has_float |= number.is_f64(),
                    _ => {
                        all_numeric = false;
                        break;
                    }
                }
            }
            if !(has_float && all_numeric) {
                continue;
            }

            for row in &mut self.rows {
                if let Value::Number(number) = &row[index] {
                    if !number.is_f64() {
                        if let Some(widened) = number.as_f64().and_then(Number::from_f64) {
                            row[index] = Value::Number(widened);
                        }
                    }
                }
            }
        }
    }

    /// Column-oriented JSON: `{column: {row_index: value}}`.
    ///
    /// This is the transport format handed to the remote repository. Column
    /// order follows the table header and row keys are decimal indices.
    pub fn to_column_json(&self) -> Value {
        let mut outer = Map::with_capacity(self.columns.len());
        for (index, column) in self.columns.iter().enumerate() {
            let inner: Map<String, Value> = self
                .rows
                .iter()
                .enumerate()
                .map(|(row_index, row)| (row_index.to_string(), row[index].clone()))
                .collect();
            outer.insert(column.clone(), Value::Object(inner));
        }
        Value::Object(outer)
    }
}

/// Infer a JSON scalar from a raw text cell.
///
/// Empty cells and `nan` become `null`; integers, finite floats and booleans
/// are typed; anything else is kept verbatim as a string.
pub fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Value::Null;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_table() -> Table {
        let mut table = Table::new(vec!["Temp (K)".into(), "Phase".into()]);
        table.push_row(vec![json!(300), json!("alpha")]).unwrap();
        table.push_row(vec![json!(310.5), json!("beta")]).unwrap();
        table.push_row(vec![json!(320), json!("alpha")]).unwrap();
        table
    }

    #[test]
    fn parse_cell_infers_scalars() {
        assert_eq!(parse_cell("42"), json!(42));
        assert_eq!(parse_cell(" 1.5 "), json!(1.5));
        assert_eq!(parse_cell("1e3"), json!(1000.0));
        assert_eq!(parse_cell("TRUE"), json!(true));
        assert_eq!(parse_cell(""), Value::Null);
        assert_eq!(parse_cell("NaN"), Value::Null);
        assert_eq!(parse_cell("fcc"), json!("fcc"));
    }

    #[test]
    fn target_column_checks_header() {
        let table = sample_table();
        assert_eq!(table.target_column(Some("Phase")).unwrap(), Some("Phase"));
        assert_eq!(table.target_column(Some("")).unwrap(), None);
        assert_eq!(table.target_column(None).unwrap(), None);
        assert!(matches!(
            table.target_column(Some("Strength")),
            Err(PackError::TargetNotFound { .. })
        ));
    }

    #[test]
    fn push_row_rejects_wrong_width() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        assert!(table.push_row(vec![json!(1)]).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn unique_values_keep_first_appearance_order() {
        let table = sample_table();
        assert_eq!(
            table.unique_values("Phase"),
            Some(vec![json!("alpha"), json!("beta")])
        );
        assert_eq!(table.unique_values("missing"), None);
    }

    #[test]
    fn widening_merges_integer_and_float_spellings() {
        let mut table = Table::new(vec!["Label".into(), "Phase".into()]);
        table.push_row(vec![json!(1), json!(1)]).unwrap();
        table.push_row(vec![json!(1.0), json!("beta")]).unwrap();
        table.push_row(vec![Value::Null, json!(2)]).unwrap();
        table.push_row(vec![json!(2), json!(2)]).unwrap();

        table.widen_numeric_columns();

        assert_eq!(table.unique_values("Label"), Some(vec![json!(1.0), Value::Null, json!(2.0)]));
        // Mixed text columns keep their cells as read.
        assert_eq!(
            table.unique_values("Phase"),
            Some(vec![json!(1), json!("beta"), json!(2)])
        );
    }

    #[test]
    fn widening_is_decided_per_column() {
        let mut table = sample_table();
        table.widen_numeric_columns();
        assert_eq!(table.rows()[0][0], json!(300.0));

        let mut counts = Table::new(vec!["n".into()]);
        counts.push_row(vec![json!(3)]).unwrap();
        counts.widen_numeric_columns();
        assert!(counts.rows()[0][0].is_i64());
    }

    #[test]
    fn column_json_is_keyed_by_column_then_row() {
        let table = sample_table();
        let value = table.to_column_json();

        assert_eq!(value["Temp (K)"]["1"], json!(310.5));
        assert_eq!(value["Phase"]["2"], json!("alpha"));

        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["Temp (K)", "Phase"]);
    }
}
