use std::collections::BTreeSet;
use std::fmt::Write;

use clap::ValueEnum;

use crate::catalog;
use crate::models::{ProblemEntry, RankedProblem};

pub const IMAGE_CONTEXT_CHARS: usize = 400;

/// Shape the action plan is requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanShape {
    Table,
    Json,
    Narrative,
}

pub const PLAN_COLUMNS: [&str; 6] = [
    "Problem",
    "Potential Cause (PVC Specific)",
    "Suggested Solution (PVC Specific)",
    "Responsible Department",
    "Short-Term Action/Plan (1-3 months)",
    "Long-Term Action/Plan (6-12 months)",
];

pub const PLAN_KEYS: [&str; 6] = [
    "problem",
    "potential_cause",
    "suggested_solution",
    "responsible_department",
    "short_term_plan",
    "long_term_plan",
];

const NARRATIVE_SECTIONS: [&str; 6] = [
    "Potential Causes",
    "Suggested Solutions",
    "Responsible Department",
    "Short-Term Plan (1-3 months)",
    "Long-Term Plan (6-12 months)",
    "KPIs to Monitor",
];

const PERSONA: &str = "You are an AI assistant acting as an Expert in PVC pipe production with over 20 years of experience. \
Your task is to analyze the provided manufacturing problems, which are specific to PVC pipe production.";

const COLUMN_GUIDE: &str = "\
1. Problem: the name of the PVC pipe production problem as provided.\n\
2. Potential cause: causes rooted in PVC pipe manufacturing (extrusion issues, die design, formulation balance of resin, stabilizers, lubricants, fillers and pigments), raw material quality, or equipment condition (screw wear, die contamination, vacuum tank calibration, haul-off synchronization, cutter precision).\n\
3. Suggested solution: practical fixes such as formulation changes, process parameter tuning (melt/die temperatures, screw speed, line speed, vacuum levels, cooling rates), maintenance, tooling adjustments or tighter quality control.\n\
4. Responsible department: one of Production, Maintenance, Quality Assurance (QA), Process Engineering, Formulation/R&D, Raw Material Procurement, Tooling, Management.\n\
5. Short-term action/plan (1-3 months): concrete checks or trials that mitigate the problem quickly.\n\
6. Long-term action/plan (6-12 months): strategic improvements such as equipment upgrades, process re-engineering, supplier development, training or SPC.\n";

pub fn system_prompt(shape: PlanShape) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "{PERSONA}");

    match shape {
        PlanShape::Table => {
            let _ = writeln!(
                prompt,
                "Present your entire analysis ONLY as a markdown table with these columns, in order: {}.",
                quoted(&PLAN_COLUMNS)
            );
            prompt.push_str(COLUMN_GUIDE);
            let _ = writeln!(
                prompt,
                "Ensure your response contains only the markdown table and no other introductory or concluding text."
            );
        }
        PlanShape::Json => {
            let _ = writeln!(
                prompt,
                "Present your entire analysis ONLY as a JSON array with one object per problem, using exactly these keys: {}.",
                quoted(&PLAN_KEYS)
            );
            prompt.push_str(COLUMN_GUIDE);
            let _ = writeln!(
                prompt,
                "Return only the JSON array. Do not add explanations or wrap it in code fences."
            );
        }
        PlanShape::Narrative => {
            let _ = writeln!(
                prompt,
                "For each problem write a markdown section headed by the problem name with these subsections: {}.",
                quoted(&NARRATIVE_SECTIONS)
            );
            prompt.push_str(COLUMN_GUIDE);
        }
    }

    let _ = write!(
        prompt,
        "Your advice should be highly practical and reflect deep expertise in PVC pipe manufacturing challenges."
    );
    prompt
}

fn quoted(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lists the escalated problems with the context logged for each of them.
pub fn user_message(top: &[RankedProblem], entries: &[ProblemEntry]) -> String {
    let mut message = String::new();
    let _ = writeln!(
        message,
        "Analyze the following top {} PVC pipe production problems and provide a detailed action plan:",
        top.len()
    );

    for (index, problem) in top.iter().enumerate() {
        let logged: Vec<&ProblemEntry> = entries
            .iter()
            .filter(|entry| entry.name.as_str().trim() == problem.name && entry.count > 0)
            .collect();

        let _ = write!(
            message,
            "{}. Problem: \"{}\" (occurred {} times)",
            index + 1,
            problem.name,
            problem.total_count
        );

        let first = logged.iter().map(|entry| entry.date).min();
        let last = logged.iter().map(|entry| entry.date).max();
        if let (Some(first), Some(last)) = (first, last) {
            if first == last {
                let _ = write!(message, "; logged on {first}");
            } else {
                let _ = write!(message, "; logged {first} to {last}");
            }
        }

        let machines: BTreeSet<&str> = logged
            .iter()
            .map(|entry| entry.machine_number.as_str())
            .filter(|number| *number != catalog::DEFAULT_MACHINE_NUMBER)
            .collect();
        if !machines.is_empty() {
            let _ = write!(
                message,
                "; machines: {}",
                machines.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        let mut parts: Vec<&str> = logged
            .iter()
            .map(|entry| entry.machine_part.label())
            .filter(|part| *part != catalog::DEFAULT_MACHINE_PART)
            .collect();
        parts.sort_by_key(|part| catalog::part_index(part));
        parts.dedup();
        if !parts.is_empty() {
            let _ = write!(message, "; reported parts: {}", parts.join(", "));
        }

        let _ = writeln!(
            message,
            "; typical parts: {}",
            catalog::parts_for(&problem.name).join(", ")
        );
    }

    message
}

/// Short illustration request built from the opening of a narrative plan.
pub fn image_prompt(narrative: &str) -> String {
    let excerpt: String = narrative.chars().take(IMAGE_CONTEXT_CHARS).collect();
    format!(
        "A clean, professional infographic for a PVC pipe factory floor illustrating this improvement plan: {}",
        excerpt.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MachinePart, ProblemName};
    use chrono::NaiveDate;

    fn entry(name: &str, count: u64, day: u32, machine: &str, part: &str) -> ProblemEntry {
        let date = NaiveDate::from_ymd_opt(2026, 6, day).unwrap();
        let mut entry = ProblemEntry::new(ProblemName::parse(name).unwrap(), count, date);
        if !machine.is_empty() {
            entry.machine_number = machine.to_string();
        }
        entry.machine_part = MachinePart::parse(part).unwrap();
        entry
    }

    fn ranked(name: &str, total_count: u64) -> RankedProblem {
        RankedProblem {
            name: name.to_string(),
            total_count,
            cumulative_percent: 0.0,
        }
    }

    #[test]
    fn user_message_carries_enrichment_context() {
        let entries = vec![
            entry("Die lines / flow marks", 3, 2, "EX-01", "Die Head"),
            entry("Die lines / flow marks", 2, 9, "EX-03", ""),
            entry("Label misprint", 1, 4, "", ""),
        ];
        let top = vec![ranked("Die lines / flow marks", 5), ranked("Label misprint", 1)];
        let message = user_message(&top, &entries);
        let lines: Vec<&str> = message.lines().collect();

        assert_eq!(
            lines[0],
            "Analyze the following top 2 PVC pipe production problems and provide a detailed action plan:"
        );
        assert_eq!(
            lines[1],
            "1. Problem: \"Die lines / flow marks\" (occurred 5 times); logged 2026-06-02 to 2026-06-09; \
machines: EX-01, EX-03; reported parts: Die Head; typical parts: Die Head"
        );
        assert_eq!(
            lines[2],
            "2. Problem: \"Label misprint\" (occurred 1 times); logged on 2026-06-04; typical parts: Unmapped/Other"
        );
    }

    #[test]
    fn system_prompt_names_the_requested_shape() {
        let table = system_prompt(PlanShape::Table);
        assert!(table.contains("markdown table"));
        assert!(table.contains("'Long-Term Action/Plan (6-12 months)'"));

        let json = system_prompt(PlanShape::Json);
        assert!(json.contains("JSON array"));
        assert!(json.contains("'responsible_department'"));

        let narrative = system_prompt(PlanShape::Narrative);
        assert!(narrative.contains("'KPIs to Monitor'"));
    }

    #[test]
    fn image_prompt_uses_only_the_opening_of_the_plan() {
        let narrative = "x".repeat(1000);
        let prompt = image_prompt(&narrative);
        assert_eq!(prompt.matches('x').count(), IMAGE_CONTEXT_CHARS);
    }
}
