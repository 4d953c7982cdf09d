//! Dataset metadata derived from column names.
//!
//! The metadata record tells the repository which columns are model inputs,
//! which column (if any) is the target, and the unit of each, as read from the
//! `Name (unit)` / `Name [unit]` naming convention.

mod units;

pub use units::{extract_units, NO_UNITS};

use serde::{Deserialize, Serialize};

use crate::error::PackError;
use crate::table::Table;

/// Column names and units for one dataset.
///
/// `inputs` and `input_units` are parallel: `input_units[i]` is the unit of
/// `inputs[i]`. `outputs`/`output_units` are present only when a target was
/// named, and are skipped entirely when serialized otherwise.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub inputs: Vec<String>,
    pub input_units: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_units: Option<Vec<String>>,
}

impl Metadata {
    /// Number of input columns.
    pub fn input_count(&self) -> usize {
        self.input_units.len()
    }

    pub fn has_outputs(&self) -> bool {
        self.outputs.is_some()
    }
}

/// Build the metadata record for a table.
///
/// An empty target name is treated the same as no target.
///
/// # Errors
/// Returns [`PackError::TargetNotFound`] if the target is not one of the
/// table's columns.
pub fn build_metadata(table: &Table, target: Option<&str>) -> Result<Metadata, PackError> {
    let target = table.target_column(target)?;

    let inputs: Vec<String> = table
        .columns()
        .iter()
        .filter(|column| Some(column.as_str()) != target)
        .cloned()
        .collect();
    let input_units = inputs.iter().map(|name| extract_units(name)).collect();

    Ok(Metadata {
        inputs,
        input_units,
        outputs: target.map(|name| vec![name.to_string()]),
        output_units: target.map(|name| vec![extract_units(name)]),
    })
}
