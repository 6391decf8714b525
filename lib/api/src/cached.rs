//! Offline generation source backed by previously saved outputs

use crate::error::GenerationError;
use crate::Generator;
use async_trait::async_trait;
use schemaeval_core::PromptRecord;
use std::path::{Path, PathBuf};

/// Replays `<dir>/<prompt-id>.json` instead of calling a model
#[derive(Debug, Clone)]
pub struct CachedGenerator {
    dir: PathBuf,
}

impl CachedGenerator {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn path_for(&self, prompt_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", prompt_id))
    }
}

#[async_trait]
impl Generator for CachedGenerator {
    fn name(&self) -> &'static str {
        "cached"
    }

    async fn generate(&self, prompt: &PromptRecord) -> Result<String, GenerationError> {
        Ok(tokio::fs::read_to_string(self.path_for(&prompt.id)).await?)
    }
}
