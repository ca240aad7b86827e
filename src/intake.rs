use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AnalysisError;
use crate::models::{MachinePart, ProblemEntry, ProblemName};

pub const MAX_ENTRIES: usize = 30;

#[derive(Debug, Deserialize)]
struct CsvRow {
    problem: String,
    count: u64,
    #[serde(default)]
    machine_number: Option<String>,
    #[serde(default)]
    machine_part: Option<String>,
    #[serde(default)]
    date: Option<NaiveDate>,
}

pub fn read_csv(path: &Path, today: NaiveDate) -> anyhow::Result<Vec<ProblemEntry>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_entries(file, today).with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_entries<R: Read>(source: R, today: NaiveDate) -> anyhow::Result<Vec<ProblemEntry>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);
    let mut entries = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let row = result.map_err(|err| {
            AnalysisError::InputValidation(format!("row {line}: {}", csv_field_error(&err)))
        })?;
        let name = ProblemName::parse(&row.problem)
            .map_err(|err| AnalysisError::InputValidation(format!("row {line}: {err}")))?;
        let machine_part = MachinePart::parse(row.machine_part.as_deref().unwrap_or(""))
            .map_err(|err| AnalysisError::InputValidation(format!("row {line}: {err}")))?;

        let mut entry = ProblemEntry::new(name, row.count, row.date.unwrap_or(today));
        entry.machine_part = machine_part;
        if let Some(number) = row.machine_number.filter(|n| !n.trim().is_empty()) {
            entry.machine_number = number;
        }
        entries.push(entry);
    }

    Ok(entries)
}

fn csv_field_error(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.kind() {
            csv::DeserializeErrorKind::ParseInt(_) => {
                format!("count must be a non-negative integer ({err})")
            }
            _ => err.to_string(),
        },
        _ => err.to_string(),
    }
}

/// Parses a `NAME=COUNT` command-line entry.
pub fn parse_entry_arg(raw: &str, today: NaiveDate) -> Result<ProblemEntry, AnalysisError> {
    let (name, count) = raw.rsplit_once('=').ok_or_else(|| {
        AnalysisError::InputValidation(format!("expected NAME=COUNT, got '{raw}'"))
    })?;
    let count: u64 = count.trim().parse().map_err(|_| {
        AnalysisError::InputValidation(format!(
            "count for '{}' must be a non-negative integer",
            name.trim()
        ))
    })?;
    Ok(ProblemEntry::new(ProblemName::parse(name)?, count, today))
}

pub fn check_entry_count(entries: &[ProblemEntry]) -> Result<(), AnalysisError> {
    if entries.is_empty() {
        return Err(AnalysisError::InputValidation(
            "no problem entries were given".to_string(),
        ));
    }
    if entries.len() > MAX_ENTRIES {
        return Err(AnalysisError::InputValidation(format!(
            "at most {MAX_ENTRIES} entries per analysis, got {}",
            entries.len()
        )));
    }
    Ok(())
}
