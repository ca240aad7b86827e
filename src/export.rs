use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::models::{ProblemEntry, RankedSummary, VitalFewPartition};

pub fn write_summary<W: Write>(
    sink: W,
    summary: &RankedSummary,
    partition: &VitalFewPartition,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(["Problem", "Count", "Cumulative %", "Vital Few"])?;
    for (index, row) in summary.rows.iter().enumerate() {
        writer.write_record([
            row.name.clone(),
            row.total_count.to_string(),
            format!("{:.2}", row.cumulative_percent),
            if partition.is_vital(index) { "yes" } else { "no" }.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_entry_log<W: Write>(sink: W, entries: &[ProblemEntry]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(["Date", "Problem", "Count", "Machine Number", "Machine Part"])?;
    for entry in entries {
        writer.write_record([
            entry.date.to_string(),
            entry.name.to_string(),
            entry.count.to_string(),
            entry.machine_number.clone(),
            entry.machine_part.label().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_summary(
    path: &Path,
    summary: &RankedSummary,
    partition: &VitalFewPartition,
) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_summary(file, summary, partition)
}

pub fn export_entry_log(path: &Path, entries: &[ProblemEntry]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_entry_log(file, entries)
}
