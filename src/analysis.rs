use tracing::{info, warn};
use uuid::Uuid;

use crate::client::CompletionService;
use crate::error::{AnalysisError, Result};
use crate::heatmap;
use crate::intake;
use crate::models::{ActionPlan, Heatmap, ProblemEntry, RankedProblem, RankedSummary, VitalFewPartition};
use crate::pareto;
use crate::plan;
use crate::prompt::{self, PlanShape};

/// One analysis run over its own snapshot of entries.
#[derive(Debug, Clone)]
pub struct ParetoRun {
    pub run_id: Uuid,
    pub entries: Vec<ProblemEntry>,
    pub summary: RankedSummary,
    pub partition: VitalFewPartition,
    pub heatmap: Heatmap,
}

impl ParetoRun {
    pub fn prepare(entries: Vec<ProblemEntry>) -> Result<Self> {
        intake::check_entry_count(&entries)?;
        let summary = pareto::aggregate(&entries)?;
        let partition = pareto::classify(&summary);
        let heatmap = heatmap::build_heatmap(&entries, &summary);

        let run = Self {
            run_id: Uuid::new_v4(),
            entries,
            summary,
            partition,
            heatmap,
        };
        info!(
            run_id = %run.run_id,
            problems = run.summary.rows.len(),
            total = run.summary.grand_total,
            vital_few = run.partition.boundary + 1,
            "pareto summary ready"
        );
        Ok(run)
    }

    pub fn top(&self, n: usize) -> &[RankedProblem] {
        pareto::top_n(&self.summary, n)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlanRequest {
    pub shape: PlanShape,
    pub top_n: usize,
    pub with_image: bool,
}

#[derive(Debug)]
pub struct PlanOutcome {
    pub plan: Result<ActionPlan>,
    pub image: Option<Result<String>>,
}

/// Sends the top problems to the completion service and parses the reply.
///
/// Failures are kept in the outcome so the caller can render them next to the
/// summary instead of aborting the run.
pub async fn request_plan<S: CompletionService>(
    service: &S,
    run: &ParetoRun,
    request: PlanRequest,
) -> PlanOutcome {
    let top = run.top(request.top_n);
    if top.is_empty() {
        return PlanOutcome {
            plan: Err(AnalysisError::InputValidation(
                "no problems selected for the action plan".to_string(),
            )),
            image: None,
        };
    }

    let system = prompt::system_prompt(request.shape);
    let user = prompt::user_message(top, &run.entries);
    info!(run_id = %run.run_id, escalated = top.len(), shape = ?request.shape, "requesting action plan");

    let plan = match service.complete(&system, &user).await {
        Ok(reply) => plan::parse_reply(&reply, request.shape),
        Err(err) => Err(err),
    };
    if let Err(err) = &plan {
        warn!(run_id = %run.run_id, error = %err, "action plan unavailable");
    }

    let image = match (&plan, request.with_image) {
        (Ok(ActionPlan::Narrative(text)), true) => {
            let result = service.generate_image(&prompt::image_prompt(text)).await;
            if let Err(err) = &result {
                warn!(run_id = %run.run_id, error = %err, "illustration unavailable");
            }
            Some(result)
        }
        _ => None,
    };

    PlanOutcome { plan, image }
}
