use std::collections::HashMap;

use crate::error::{AnalysisError, Result};
use crate::models::{ProblemEntry, RankedProblem, RankedSummary, VitalFewPartition};

pub const VITAL_FEW_THRESHOLD: f64 = 80.0;
pub const DEFAULT_TOP_N: usize = 3;

/// Groups entries by trimmed name, drops empty groups and ranks by total count.
///
/// Equal totals keep the order in which each name first appeared in the input.
pub fn aggregate(entries: &[ProblemEntry]) -> Result<RankedSummary> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, u64)> = Vec::new();

    for entry in entries {
        let name = entry.name.as_str().trim();
        match positions.get(name) {
            Some(&index) => {
                let total = &mut groups[index].1;
                *total = total.checked_add(entry.count).ok_or_else(total_too_large)?;
            }
            None => {
                positions.insert(name, groups.len());
                groups.push((name.to_string(), entry.count));
            }
        }
    }

    groups.retain(|(_, total)| *total > 0);
    if groups.is_empty() {
        return Err(AnalysisError::EmptyResult);
    }

    // stable: ties stay in first-seen order
    groups.sort_by(|a, b| b.1.cmp(&a.1));

    let grand_total = groups
        .iter()
        .try_fold(0u64, |sum, (_, total)| sum.checked_add(*total))
        .ok_or_else(total_too_large)?;
    let mut running = 0u64;
    let mut rows: Vec<RankedProblem> = groups
        .into_iter()
        .map(|(name, total_count)| {
            running += total_count;
            RankedProblem {
                name,
                total_count,
                cumulative_percent: running as f64 / grand_total as f64 * 100.0,
            }
        })
        .collect();

    if let Some(last) = rows.last_mut() {
        last.cumulative_percent = 100.0;
    }

    Ok(RankedSummary { rows, grand_total })
}

fn total_too_large() -> AnalysisError {
    AnalysisError::InputValidation("total count is too large".to_string())
}

/// First row whose cumulative share strictly exceeds 80%, or the last row.
pub fn classify(summary: &RankedSummary) -> VitalFewPartition {
    let boundary = summary
        .rows
        .iter()
        .position(|row| row.cumulative_percent > VITAL_FEW_THRESHOLD)
        .unwrap_or_else(|| summary.rows.len().saturating_sub(1));
    VitalFewPartition { boundary }
}

pub fn top_n(summary: &RankedSummary, n: usize) -> &[RankedProblem] {
    &summary.rows[..n.min(summary.rows.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProblemName;
    use chrono::NaiveDate;

    fn entry(name: &str, count: u64) -> ProblemEntry {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        ProblemEntry::new(ProblemName::parse(name).unwrap(), count, date)
    }

    fn names(summary: &RankedSummary) -> Vec<&str> {
        summary.rows.iter().map(|row| row.name.as_str()).collect()
    }

    #[test]
    fn merges_duplicates_and_ranks_two_defects() {
        let entries = vec![entry("Cracks", 5), entry("Cracks", 3), entry("Warping", 2)];
        let summary = aggregate(&entries).unwrap();

        assert_eq!(names(&summary), vec!["Cracks", "Warping"]);
        assert_eq!(summary.rows[0].total_count, 8);
        assert!((summary.rows[0].cumulative_percent - 80.0).abs() < 1e-9);
        assert_eq!(summary.rows[1].cumulative_percent, 100.0);

        // 80.0 is not a crossing, so the boundary moves to the second row
        let partition = classify(&summary);
        assert_eq!(partition.boundary, 1);
        assert_eq!(partition.vital_few(&summary).len(), 2);
        assert!(partition.trivial_many(&summary).is_empty());

        let top = top_n(&summary, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Cracks");
    }

    #[test]
    fn all_zero_counts_are_an_empty_result() {
        let entries = vec![entry("Cracks", 0), entry("Warping", 0)];
        let err = aggregate(&entries).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResult));
        assert!(err.is_input_warning());
    }

    #[test]
    fn first_row_over_threshold_is_the_boundary() {
        let entries = vec![entry("A", 10), entry("B", 1), entry("C", 1)];
        let summary = aggregate(&entries).unwrap();

        let percents: Vec<f64> = summary.rows.iter().map(|r| r.cumulative_percent).collect();
        assert!((percents[0] - 83.333_333).abs() < 1e-3);
        assert!((percents[1] - 91.666_666).abs() < 1e-3);
        assert_eq!(percents[2], 100.0);

        assert_eq!(classify(&summary).boundary, 0);
        let top: Vec<&str> = top_n(&summary, 3).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(top, vec!["A", "B", "C"]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let entries = vec![
            entry("Zeta", 4),
            entry("Alpha", 4),
            entry("Mid", 6),
            entry("Beta", 4),
        ];
        let summary = aggregate(&entries).unwrap();
        assert_eq!(names(&summary), vec!["Mid", "Zeta", "Alpha", "Beta"]);
    }

    #[test]
    fn names_are_trimmed_but_case_sensitive() {
        let entries = vec![entry("Cracks", 1), entry("  Cracks ", 2), entry("cracks", 1)];
        let summary = aggregate(&entries).unwrap();
        assert_eq!(names(&summary), vec!["Cracks", "cracks"]);
        assert_eq!(summary.rows[0].total_count, 3);
    }

    #[test]
    fn zero_groups_are_dropped_but_total_is_preserved() {
        let entries = vec![
            entry("A", 7),
            entry("B", 0),
            entry("C", 2),
            entry("A", 1),
            entry("D", 0),
        ];
        let summary = aggregate(&entries).unwrap();
        let input_total: u64 = entries.iter().map(|e| e.count).sum();

        assert_eq!(names(&summary), vec!["A", "C"]);
        assert_eq!(summary.grand_total, input_total);
        assert_eq!(
            summary.rows.iter().map(|r| r.total_count).sum::<u64>(),
            input_total
        );
    }

    #[test]
    fn rows_descend_and_cumulative_never_drops() {
        let counts = [3u64, 17, 1, 9, 9, 4, 22, 1, 1, 6, 13];
        let entries: Vec<ProblemEntry> = counts
            .iter()
            .enumerate()
            .map(|(i, c)| entry(&format!("Defect {i}"), *c))
            .collect();
        let summary = aggregate(&entries).unwrap();

        for pair in summary.rows.windows(2) {
            assert!(pair[0].total_count >= pair[1].total_count);
            assert!(pair[0].cumulative_percent <= pair[1].cumulative_percent);
        }
        assert_eq!(summary.rows.last().unwrap().cumulative_percent, 100.0);

        let partition = classify(&summary);
        let k = partition.boundary;
        assert!(summary.rows[k].cumulative_percent > VITAL_FEW_THRESHOLD);
        assert!(summary.rows[..k]
            .iter()
            .all(|row| row.cumulative_percent <= VITAL_FEW_THRESHOLD));
    }

    #[test]
    fn thirds_still_end_at_exactly_one_hundred() {
        let entries = vec![entry("A", 1), entry("B", 1), entry("C", 1)];
        let summary = aggregate(&entries).unwrap();
        assert_eq!(summary.rows[2].cumulative_percent, 100.0);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let entries = vec![entry("B", 2), entry("A", 2), entry("C", 5), entry("B", 1)];
        assert_eq!(aggregate(&entries).unwrap(), aggregate(&entries).unwrap());
    }

    #[test]
    fn single_row_is_entirely_vital() {
        let summary = aggregate(&[entry("Only", 4)]).unwrap();
        let partition = classify(&summary);
        assert_eq!(partition.boundary, 0);
        assert!(partition.is_vital(0));
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        let same_name = vec![entry("Cracks", u64::MAX), entry("Cracks", 1)];
        let err = aggregate(&same_name).unwrap_err();
        assert!(err.is_input_warning());

        let across_names = vec![entry("Cracks", u64::MAX), entry("Warping", 1)];
        assert!(matches!(
            aggregate(&across_names),
            Err(AnalysisError::InputValidation(_))
        ));
    }

    #[test]
    fn top_n_is_capped_by_row_count() {
        let summary = aggregate(&[entry("A", 3), entry("B", 2)]).unwrap();
        assert_eq!(top_n(&summary, DEFAULT_TOP_N).len(), 2);
        assert_eq!(top_n(&summary, 0).len(), 0);
    }
}
