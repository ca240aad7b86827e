use std::collections::HashMap;

use crate::catalog;
use crate::models::{Heatmap, ProblemEntry, RankedSummary};

/// Defect x machine-part counts for the ranked defects.
pub fn build_heatmap(entries: &[ProblemEntry], summary: &RankedSummary) -> Heatmap {
    let mut totals: HashMap<(&str, &'static str), u64> = HashMap::new();
    for entry in entries {
        *totals
            .entry((entry.name.as_str().trim(), entry.machine_part.label()))
            .or_insert(0) += entry.count;
    }

    let problems: Vec<String> = summary.rows.iter().map(|row| row.name.clone()).collect();
    let mut parts: Vec<&'static str> = totals
        .iter()
        .filter(|(key, count)| **count > 0 && problems.iter().any(|p| p.as_str() == key.0))
        .map(|(key, _)| key.1)
        .collect();
    parts.sort_by_key(|part| catalog::part_index(part));
    parts.dedup();

    let cells = problems
        .iter()
        .map(|problem| {
            parts
                .iter()
                .map(|part| totals.get(&(problem.as_str(), *part)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    Heatmap {
        problems,
        parts,
        cells,
    }
}
