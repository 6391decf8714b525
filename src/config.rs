use std::path::PathBuf;
use std::time::Duration;

/// Settings of one evaluation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum number of prompts generated and scored at once
    pub concurrency: usize,
    /// Upper bound on the generation step of one prompt, retries included
    pub generation_deadline: Duration,
    /// Write each raw generation to `generated_schemas/<id>.json`
    pub save_generated: bool,
    /// Report file, relative to the evaluation directory unless absolute
    pub output: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            generation_deadline: Duration::from_secs(200),
            save_generated: true,
            output: PathBuf::from("report.csv"),
        }
    }
}
