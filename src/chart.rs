//! Text renderings of the Pareto chart and the defect/part heatmap.

use std::fmt::Write;

use crate::models::{Heatmap, RankedSummary, VitalFewPartition};
use crate::pareto::VITAL_FEW_THRESHOLD;

const BAR_WIDTH: usize = 40;

/// Bars scaled to the largest count, with the cumulative curve printed per row
/// and the 80% reference line drawn under the last vital-few row.
pub fn render_pareto(summary: &RankedSummary, partition: &VitalFewPartition) -> String {
    let mut output = String::new();
    let label_width = summary
        .rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0);
    let max_count = summary.rows.first().map(|row| row.total_count).unwrap_or(0).max(1);

    for (index, row) in summary.rows.iter().enumerate() {
        let filled = ((row.total_count as f64 / max_count as f64) * BAR_WIDTH as f64).round() as usize;
        let marker = if partition.is_vital(index) { '*' } else { ' ' };
        let _ = writeln!(
            output,
            "{marker} {:<label_width$} |{:<BAR_WIDTH$}| {:>5} {:>6.1}%",
            row.name,
            "#".repeat(filled.max(1)),
            row.total_count,
            row.cumulative_percent,
        );
        if index == partition.boundary {
            draw_reference(&mut output, label_width);
        }
    }

    let _ = writeln!(
        output,
        "* vital few (cumulative share first exceeds {VITAL_FEW_THRESHOLD:.0}%)"
    );
    output
}

fn draw_reference(output: &mut String, label_width: usize) {
    let _ = writeln!(
        output,
        "  {:<label_width$} {} 80% Vital Few Line",
        "",
        "-".repeat(BAR_WIDTH + 2)
    );
}

pub fn render_heatmap(heatmap: &Heatmap) -> String {
    let mut output = String::new();
    if heatmap.problems.is_empty() || heatmap.parts.is_empty() {
        let _ = writeln!(output, "No machine-part data recorded.");
        return output;
    }

    let _ = writeln!(output, "| Problem | {} |", heatmap.parts.join(" | "));
    let _ = writeln!(output, "|---|{}", "---|".repeat(heatmap.parts.len()));
    for (problem, row) in heatmap.problems.iter().zip(&heatmap.cells) {
        let cells: Vec<String> = row.iter().map(|count| count.to_string()).collect();
        let _ = writeln!(output, "| {} | {} |", escape_cell(problem), cells.join(" | "));
    }
    output
}

/// Makes text safe to place inside a markdown table cell.
pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
