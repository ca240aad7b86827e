//! Turns the model's reply into an action plan.

use crate::error::{AnalysisError, Result};
use crate::models::{ActionPlan, ActionPlanRow};
use crate::prompt::{PlanShape, PLAN_COLUMNS};

pub fn parse_reply(reply: &str, shape: PlanShape) -> Result<ActionPlan> {
    if reply.trim().is_empty() {
        return Err(AnalysisError::shape("the AI service returned an empty response", reply));
    }

    match shape {
        PlanShape::Json => parse_json(reply).map(ActionPlan::Table),
        PlanShape::Table => parse_markdown_table(reply).map(ActionPlan::Table),
        PlanShape::Narrative => {
            let text = reply.trim();
            let text = if text.starts_with("```") { strip_fences(text) } else { text };
            Ok(ActionPlan::Narrative(text.to_string()))
        }
    }
}

/// Removes a surrounding ```` ```lang ... ``` ```` block, if present.
pub fn strip_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after_open = &trimmed[start + 3..];
    // skip the language tag on the opening fence
    let body = match after_open.find('\n') {
        Some(newline) => &after_open[newline + 1..],
        None => {
            let tag_end = after_open
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(after_open.len());
            let rest = &after_open[tag_end..];
            if rest.starts_with(char::is_whitespace) {
                rest
            } else {
                after_open
            }
        }
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn parse_json(reply: &str) -> Result<Vec<ActionPlanRow>> {
    let body = strip_fences(reply);
    let rows: Vec<ActionPlanRow> = serde_json::from_str(body)
        .map_err(|err| AnalysisError::shape(format!("expected a JSON array of action plans: {err}"), reply))?;
    if rows.is_empty() {
        return Err(AnalysisError::shape("the JSON array has no action plans", reply));
    }
    Ok(rows)
}

fn parse_markdown_table(reply: &str) -> Result<Vec<ActionPlanRow>> {
    let body = strip_fences(reply);
    let mut lines = body
        .lines()
        .map(str::trim)
        .filter(|line| line.contains('|'));

    let header = lines
        .next()
        .ok_or_else(|| AnalysisError::shape("no markdown table found", reply))?;
    if split_row(header).len() != PLAN_COLUMNS.len() {
        return Err(AnalysisError::shape(
            format!("expected {} table columns", PLAN_COLUMNS.len()),
            reply,
        ));
    }

    let separator = lines
        .next()
        .ok_or_else(|| AnalysisError::shape("markdown table has no separator row", reply))?;
    if !is_separator(separator) {
        return Err(AnalysisError::shape("markdown table has no separator row", reply));
    }

    let mut rows = Vec::new();
    for line in lines {
        let cells = split_row(line);
        let [problem, potential_cause, suggested_solution, responsible_department, short_term_plan, long_term_plan]: [String; 6] =
            cells.try_into().map_err(|cells: Vec<String>| {
                AnalysisError::shape(
                    format!("table row has {} cells, expected {}", cells.len(), PLAN_COLUMNS.len()),
                    reply,
                )
            })?;
        rows.push(ActionPlanRow {
            problem,
            potential_cause,
            suggested_solution,
            responsible_department,
            short_term_plan,
            long_term_plan,
        });
    }

    if rows.is_empty() {
        return Err(AnalysisError::shape("markdown table has no rows", reply));
    }
    Ok(rows)
}

/// Splits a table row on unescaped pipes; an escaped `\|` stays in its cell.
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = match inner.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => inner,
    };

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                chars.next();
                cell.push('|');
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

fn is_separator(line: &str) -> bool {
    split_row(line).iter().all(|cell| {
        !cell.is_empty() && cell.contains('-') && cell.chars().all(|c| matches!(c, '-' | ':' | ' '))
    })
}
