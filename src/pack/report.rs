//! Human- and machine-readable summary of a loaded pack.

use serde::Serialize;
use std::fmt;

use super::Pack;
use crate::loader::Provenance;
use crate::metadata::Metadata;

/// What `inspect` prints.
#[derive(Clone, Debug, Serialize)]
pub struct PackReport {
    pub location: String,
    pub provenance: Provenance,
    pub rows: usize,
    pub columns: usize,
    pub target: Option<String>,
    pub metadata: Metadata,
    pub model: Option<String>,
}

impl PackReport {
    pub fn from_pack(pack: &Pack) -> Self {
        Self {
            location: pack.location().to_string(),
            provenance: pack.dataset().provenance.clone(),
            rows: pack.table().len(),
            columns: pack.table().columns().len(),
            target: pack.target().map(str::to_string),
            metadata: pack.metadata().clone(),
            model: pack.model().map(|model| model.servable_path()),
        }
    }
}

impl fmt::Display for PackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match &self.provenance {
            Provenance::Local { path } => format!("local file {}", path.display()),
            Provenance::Catalog { id } => format!("catalog {}", id),
        };
        writeln!(f, "Dataset: {}", self.location)?;
        writeln!(f, "  source: {}", origin)?;
        writeln!(f, "  {} rows, {} columns", self.rows, self.columns)?;

        writeln!(f)?;
        writeln!(f, "Inputs ({}):", self.metadata.inputs.len())?;
        for (name, units) in self
            .metadata
            .inputs
            .iter()
            .zip(&self.metadata.input_units)
        {
            writeln!(f, "  - {} [{}]", name, units)?;
        }

        if let (Some(outputs), Some(units)) = (&self.metadata.outputs, &self.metadata.output_units)
        {
            writeln!(f)?;
            writeln!(f, "Outputs ({}):", outputs.len())?;
            for (name, units) in outputs.iter().zip(units) {
                writeln!(f, "  - {} [{}]", name, units)?;
            }
        }

        if let Some(model) = &self.model {
            writeln!(f)?;
            writeln!(f, "Model: {}", model)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Dataset;
    use crate::table::io_csv::from_csv_str;

    #[test]
    fn text_report_lists_inputs_and_outputs() {
        let table = from_csv_str("Temp (K),Yield\n300,0.8\n").unwrap();
        let dataset = Dataset::new(
            table,
            Some("Yield"),
            Provenance::Catalog {
                id: "mdf/yield".into(),
            },
        )
        .unwrap();
        let pack = Pack::from_parts("mdf/yield", dataset, None).unwrap();

        let text = pack.report().to_string();
        assert!(text.contains("source: catalog mdf/yield"));
        assert!(text.contains("  - Temp (K) [K]"));
        assert!(text.contains("Outputs (1):"));
        assert!(text.contains("  - Yield [-]"));
        assert!(!text.contains("Model:"));
    }

    #[test]
    fn json_report_tags_provenance() {
        let table = from_csv_str("a\n1\n").unwrap();
        let dataset = Dataset::new(
            table,
            None,
            Provenance::Local {
                path: "a.csv".into(),
            },
        )
        .unwrap();
        let pack = Pack::from_parts("a.csv", dataset, None).unwrap();

        let value = serde_json::to_value(pack.report()).unwrap();
        assert_eq!(value["provenance"]["kind"], "local");
        assert_eq!(value["rows"], 1);
        assert!(value["metadata"].get("outputs").is_none());
    }
}
