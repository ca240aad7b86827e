use std::fmt::Write;

use chrono::NaiveDate;

use crate::analysis::{ParetoRun, PlanOutcome};
use crate::chart::{self, escape_cell};
use crate::models::ActionPlan;
use crate::prompt::PLAN_COLUMNS;

pub fn summary_table(run: &ParetoRun) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "| Rank | Problem | Count | Cumulative % | Vital Few |");
    let _ = writeln!(output, "|---|---|---|---|---|");
    for (index, row) in run.summary.rows.iter().enumerate() {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {:.1} | {} |",
            index + 1,
            escape_cell(&row.name),
            row.total_count,
            row.cumulative_percent,
            if run.partition.is_vital(index) { "yes" } else { "" }
        );
    }
    output
}

pub fn build_report(run: &ParetoRun, outcome: Option<&PlanOutcome>, generated: NaiveDate) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# PVC Pipe Production Problem Analysis");
    let _ = writeln!(
        output,
        "Generated {} (run {}) from {} entries, {} occurrences in total",
        generated,
        run.run_id,
        run.entries.len(),
        run.summary.grand_total
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Pareto Summary");
    output.push_str(&summary_table(run));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Vital Few");
    let vital = run.partition.vital_few(&run.summary);
    for row in vital {
        let _ = writeln!(
            output,
            "- {}: {} occurrences ({:.1}% cumulative)",
            row.name, row.total_count, row.cumulative_percent
        );
    }
    let trivial = run.partition.trivial_many(&run.summary);
    if !trivial.is_empty() {
        let _ = writeln!(
            output,
            "- {} further problems make up the trivial many",
            trivial.len()
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pareto Chart");
    let _ = writeln!(output, "```text");
    output.push_str(&chart::render_pareto(&run.summary, &run.partition));
    let _ = writeln!(output, "```");

    let _ = writeln!(output);
    let _ = writeln!(output, "## Problems by Machine Part");
    output.push_str(&chart::render_heatmap(&run.heatmap));

    if let Some(outcome) = outcome {
        let _ = writeln!(output);
        output.push_str(&render_plan(outcome));
    }

    output
}

pub fn render_plan(outcome: &PlanOutcome) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "## AI Expert Action Plan");

    match &outcome.plan {
        Ok(ActionPlan::Table(rows)) => {
            let _ = writeln!(output, "| {} |", PLAN_COLUMNS.join(" | "));
            let _ = writeln!(output, "|{}", "---|".repeat(PLAN_COLUMNS.len()));
            for row in rows {
                let _ = writeln!(
                    output,
                    "| {} | {} | {} | {} | {} | {} |",
                    escape_cell(&row.problem),
                    escape_cell(&row.potential_cause),
                    escape_cell(&row.suggested_solution),
                    escape_cell(&row.responsible_department),
                    escape_cell(&row.short_term_plan),
                    escape_cell(&row.long_term_plan)
                );
            }
        }
        Ok(ActionPlan::Narrative(text)) => {
            let _ = writeln!(output, "{text}");
        }
        Err(err) => {
            let _ = writeln!(output, "> **Error:** {err}");
            if let Some(raw) = err.raw_response() {
                let _ = writeln!(output);
                let _ = writeln!(output, "Raw response:");
                let _ = writeln!(output, "```text");
                let _ = writeln!(output, "{}", raw.trim_end());
                let _ = writeln!(output, "```");
            }
        }
    }

    match &outcome.image {
        Some(Ok(url)) => {
            let _ = writeln!(output);
            let _ = writeln!(output, "![Action plan illustration]({url})");
        }
        Some(Err(err)) => {
            let _ = writeln!(output);
            let _ = writeln!(output, "> **Illustration unavailable:** {err}");
        }
        None => {}
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::models::{ActionPlanRow, ProblemEntry, ProblemName};

    fn run() -> ParetoRun {
        let date = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let entries = vec![
            ProblemEntry::new(ProblemName::parse("A").unwrap(), 10, date),
            ProblemEntry::new(ProblemName::parse("B").unwrap(), 1, date),
            ProblemEntry::new(ProblemName::parse("C").unwrap(), 1, date),
        ];
        ParetoRun::prepare(entries).unwrap()
    }

    #[test]
    fn report_lists_summary_and_vital_few() {
        let run = run();
        let date = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let report = build_report(&run, None, date);

        assert!(report.starts_with("# PVC Pipe Production Problem Analysis\n"));
        assert!(report.contains(&run.run_id.to_string()));
        assert!(report.contains("| 1 | A | 10 | 83.3 | yes |"));
        assert!(report.contains("| 3 | C | 1 | 100.0 |  |"));
        assert!(report.contains("- A: 10 occurrences (83.3% cumulative)"));
        assert!(report.contains("- 2 further problems make up the trivial many"));
        assert!(report.contains("80% Vital Few Line"));
        assert!(!report.contains("AI Expert Action Plan"));
    }

    #[test]
    fn plan_table_is_rendered_with_fixed_columns() {
        let outcome = PlanOutcome {
            plan: Ok(ActionPlan::Table(vec![ActionPlanRow {
                problem: "A".to_string(),
                potential_cause: "worn screw | barrel".to_string(),
                suggested_solution: "replace".to_string(),
                responsible_department: "Maintenance".to_string(),
                short_term_plan: "inspect".to_string(),
                long_term_plan: "schedule PM".to_string(),
            }])),
            image: None,
        };
        let text = render_plan(&outcome);
        assert!(text.contains("| Problem | Potential Cause (PVC Specific) |"));
        assert!(text.contains("| A | worn screw \\| barrel | replace | Maintenance | inspect | schedule PM |"));
    }

    #[test]
    fn shape_errors_show_the_raw_reply() {
        let outcome = PlanOutcome {
            plan: Err(AnalysisError::shape("no markdown table found", "just prose")),
            image: None,
        };
        let text = render_plan(&outcome);
        assert!(text.contains("**Error:** could not read the AI response: no markdown table found"));
        assert!(text.contains("```text\njust prose\n```"));
    }

    #[test]
    fn narrative_and_image_are_rendered() {
        let outcome = PlanOutcome {
            plan: Ok(ActionPlan::Narrative("## A\nDo things.".to_string())),
            image: Some(Ok("https://images.example/a.png".to_string())),
        };
        let text = render_plan(&outcome);
        assert!(text.contains("## A\nDo things.\n"));
        assert!(text.contains("![Action plan illustration](https://images.example/a.png)"));
    }
}
