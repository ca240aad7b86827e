use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::error::{AnalysisError, Result};

/// A problem picked from the fixed list, or typed in through the "other" escape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemName {
    Known(&'static str),
    Custom(String),
}

impl ProblemName {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AnalysisError::InputValidation(
                "problem name must not be empty".to_string(),
            ));
        }
        Ok(match catalog::known_problem(trimmed) {
            Some(label) => Self::Known(label),
            None => Self::Custom(trimmed.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(label) => label,
            Self::Custom(text) => text,
        }
    }
}

impl fmt::Display for ProblemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachinePart(&'static str);

impl MachinePart {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        catalog::known_part(trimmed).map(Self).ok_or_else(|| {
            AnalysisError::InputValidation(format!("unknown machine part '{trimmed}'"))
        })
    }

    pub fn label(&self) -> &'static str {
        self.0
    }
}

impl Default for MachinePart {
    fn default() -> Self {
        Self(catalog::DEFAULT_MACHINE_PART)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProblemEntry {
    pub name: ProblemName,
    pub count: u64,
    pub machine_number: String,
    pub machine_part: MachinePart,
    pub date: NaiveDate,
}

impl ProblemEntry {
    pub fn new(name: ProblemName, count: u64, date: NaiveDate) -> Self {
        Self {
            name,
            count,
            machine_number: catalog::DEFAULT_MACHINE_NUMBER.to_string(),
            machine_part: MachinePart::default(),
            date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedProblem {
    pub name: String,
    pub total_count: u64,
    pub cumulative_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedSummary {
    pub rows: Vec<RankedProblem>,
    pub grand_total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VitalFewPartition {
    /// Inclusive index of the last vital-few row.
    pub boundary: usize,
}

impl VitalFewPartition {
    pub fn is_vital(&self, index: usize) -> bool {
        index <= self.boundary
    }

    pub fn vital_few<'a>(&self, summary: &'a RankedSummary) -> &'a [RankedProblem] {
        let end = (self.boundary + 1).min(summary.rows.len());
        &summary.rows[..end]
    }

    pub fn trivial_many<'a>(&self, summary: &'a RankedSummary) -> &'a [RankedProblem] {
        let start = (self.boundary + 1).min(summary.rows.len());
        &summary.rows[start..]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPlanRow {
    pub problem: String,
    pub potential_cause: String,
    pub suggested_solution: String,
    pub responsible_department: String,
    pub short_term_plan: String,
    pub long_term_plan: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPlan {
    Table(Vec<ActionPlanRow>),
    Narrative(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub problems: Vec<String>,
    pub parts: Vec<&'static str>,
    /// Row-major, `problems.len() x parts.len()`.
    pub cells: Vec<Vec<u64>>,
}
