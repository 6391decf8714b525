//! Fan-out/fan-gather over a prompt list
//!
//! Every prompt runs as its own task; a semaphore caps how many are in
//! flight. Results come back tagged with the prompt's position and are put
//! back in prompt order before anything is reported.

use crate::config::RunConfig;
use schemaeval_api::{generate_payload, Generator};
use schemaeval_core::{EvaluationResult, GeneratedPayload, PromptRecord};
use schemaeval_scoring::SchemaEvaluator;
use schemaeval_storage::EvalLayout;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Drives generation and scoring for a whole evaluation directory
pub struct Runner {
    layout: Arc<EvalLayout>,
    evaluator: Arc<SchemaEvaluator>,
    generator: Arc<dyn Generator>,
    config: RunConfig,
}

impl Runner {
    pub fn new(
        layout: EvalLayout,
        evaluator: SchemaEvaluator,
        generator: Arc<dyn Generator>,
        config: RunConfig,
    ) -> Self {
        Self {
            layout: Arc::new(layout),
            evaluator: Arc::new(evaluator),
            generator,
            config,
        }
    }

    /// Evaluate every prompt; the output has one row per prompt, in prompt order
    pub async fn run(&self, prompts: &[PromptRecord]) -> Vec<EvaluationResult> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, prompt) in prompts.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let layout = self.layout.clone();
            let evaluator = self.evaluator.clone();
            let generator = self.generator.clone();
            let deadline = self.config.generation_deadline;
            let save_generated = self.config.save_generated;

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = evaluate_prompt(
                    &prompt,
                    &layout,
                    &evaluator,
                    generator.as_ref(),
                    deadline,
                    save_generated,
                )
                .await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<EvaluationResult>> = vec![None; prompts.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!("Evaluation task did not complete: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(prompts)
            .map(|(slot, prompt)| {
                slot.unwrap_or_else(|| {
                    EvaluationResult::failed(&prompt.id, vec!["evaluation task aborted".to_string()], 0.0)
                })
            })
            .collect()
    }
}

/// Load ground truth, generate under `deadline`, cache the output and score it
pub async fn evaluate_prompt(
    prompt: &PromptRecord,
    layout: &EvalLayout,
    evaluator: &SchemaEvaluator,
    generator: &dyn Generator,
    deadline: Duration,
    save_generated: bool,
) -> EvaluationResult {
    let expected_raw = match layout.read_ground_truth(&prompt.id) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("[{}] {:#}", prompt.id, e);
            return EvaluationResult::failed(&prompt.id, vec![format!("{:#}", e)], 0.0);
        }
    };

    let started = Instant::now();
    let payload = match tokio::time::timeout(deadline, generate_payload(generator, prompt)).await {
        Ok(payload) => payload,
        Err(_) => GeneratedPayload::Unavailable(format!(
            "generation timed out after {}ms",
            deadline.as_millis()
        )),
    };
    let generation_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    if save_generated {
        if let GeneratedPayload::Text(raw) = &payload {
            if let Err(e) = layout.save_generated(&prompt.id, raw) {
                warn!("[{}] could not cache generated output: {:#}", prompt.id, e);
            }
        }
    }

    let result = evaluator.evaluate(prompt, &payload, &expected_raw, generation_time_ms);
    info!(
        "[{}] Generated {} schemas via {} in {:.0}ms, overall {:.3}{}",
        prompt.id,
        result.generated_schemas,
        generator.name(),
        generation_time_ms,
        result.overall_score,
        if result.is_failed() { " (failed)" } else { "" }
    );
    result
}
