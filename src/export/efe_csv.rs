//! CSV export of per-policy expected free energy
//!
//! One row per policy of a planning phase, in enumeration order, so the
//! decomposition can be inspected in a spreadsheet or a notebook.

use std::{fs::File, io::Write, path::Path};

use serde::Serialize;

use crate::{Error, Result, simulation::PlanningOutcome};

/// A single row in the EFE CSV export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfeExportRecord {
    pub cycle: u64,
    pub policy_index: usize,
    /// Actions as lowercase names joined by `-`
    pub actions: String,
    pub instrumental: f64,
    pub epistemic: f64,
    pub futility: f64,
    pub efe: f64,
    pub probability: f64,
    pub selected: bool,
}

/// Exporter for EFE CSV files
pub struct EfeCsvExporter;

impl EfeCsvExporter {
    /// Flatten a planning phase into export rows.
    pub fn records(cycle: u64, plan: &PlanningOutcome) -> Vec<EfeExportRecord> {
        plan.evaluations
            .iter()
            .map(|evaluation| EfeExportRecord {
                cycle,
                policy_index: evaluation.index,
                actions: evaluation
                    .actions
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("-"),
                instrumental: evaluation.efe.instrumental,
                epistemic: evaluation.efe.epistemic,
                futility: evaluation.efe.futility,
                efe: evaluation.efe.efe,
                probability: evaluation.probability,
                selected: evaluation.index == plan.selected,
            })
            .collect()
    }

    /// Write rows with a header to any writer.
    pub fn write<W: Write>(writer: W, records: &[EfeExportRecord]) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        for record in records {
            out.serialize(record)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Export a planning phase to `path`; returns the number of rows written.
    pub fn export<P: AsRef<Path>>(path: P, cycle: u64, plan: &PlanningOutcome) -> Result<usize> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create CSV file {}", path.display()),
            source,
        })?;
        let records = Self::records(cycle, plan);
        Self::write(file, &records)?;
        Ok(records.len())
    }
}
