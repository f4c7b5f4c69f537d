use crate::model::song::Chart;
use crate::note_encoder::{artifact_path_for, encode_chart};
use crate::validator;
use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome counts for one compiler invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Charts compiled all the way to a .note artifact.
    pub compiled: usize,

    /// Charts that passed validation during a dry run.
    pub validated: usize,

    /// Inputs skipped because they failed to parse, validate, or compile.
    pub skipped: usize,
}

/// Read and parse one .yaml chart file into an untyped document.
pub fn load_document(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read chart file '{}': {}", path.display(), e))?;

    serde_yaml::from_str(&text)
        .map_err(|e| anyhow!("Failed to parse YAML from '{}': {}", path.display(), e))
}

/// Encode a validated document and write the .note artifact next to the input.
pub fn compile_to_file(doc: Value, input: &Path) -> Result<PathBuf> {
    let chart = Chart::from_document(doc)?;
    let bytes = encode_chart(&chart)?;
    let artifact = artifact_path_for(input);

    fs::write(&artifact, &bytes)
        .map_err(|e| anyhow!("Failed to write '{}': {}", artifact.display(), e))?;

    debug!("Wrote {} bytes to '{}'", bytes.len(), artifact.display());
    Ok(artifact)
}

/// Compile every input in order. A failure in one file never stops the rest;
/// the bad input is reported, counted as skipped, and the batch moves on.
pub fn compile_batch(inputs: &[PathBuf], dry: bool) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for input in inputs {
        info!("Reading chart: '{}'...", input.display());
        let doc = match load_document(input) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("{:?}", e);
                warn!("Skipping '{}'..!", input.display());
                summary.skipped += 1;
                continue;
            }
        };

        let report = validator::validate(&doc);
        if !report.is_valid() {
            for diagnostic in report.diagnostics() {
                warn!("  {}", diagnostic);
            }
            warn!("Invalid chart data; skipping '{}'..!", input.display());
            summary.skipped += 1;
            continue;
        }

        if dry {
            info!("Chart is valid; dry run, leaving the artifact unwritten..!");
            summary.validated += 1;
            continue;
        }

        info!("Compiling...");
        match compile_to_file(doc, input) {
            Ok(artifact) => {
                info!("Done! Wrote '{}'", artifact.display());
                summary.compiled += 1;
            }
            Err(e) => {
                warn!("{:?}", e);
                warn!("Skipping '{}'..!", input.display());
                summary.skipped += 1;
            }
        }
    }

    summary
}
