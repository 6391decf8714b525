// Evaluation directory layout: prompts, alias mappings, ground truth, generated cache
use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use schemaeval_core::{AliasResolver, PromptRecord};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const PROMPTS_FILE: &str = "prompts.json";
pub const MAPPINGS_DIR: &str = "mappings";
pub const GROUND_TRUTH_DIR: &str = "ground_truth";
pub const GENERATED_DIR: &str = "generated_schemas";

/// Paths of one evaluation directory
///
/// ```text
/// <root>/prompts.json
/// <root>/mappings/{field_name_aliases,type_aliases}.json
/// <root>/ground_truth/<prompt-id>.json
/// <root>/generated_schemas/<prompt-id>.json
/// ```
#[derive(Debug, Clone)]
pub struct EvalLayout {
    root: PathBuf,
}

impl EvalLayout {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prompts_path(&self) -> PathBuf {
        self.root.join(PROMPTS_FILE)
    }

    pub fn mappings_dir(&self) -> PathBuf {
        self.root.join(MAPPINGS_DIR)
    }

    pub fn ground_truth_path(&self, prompt_id: &str) -> PathBuf {
        self.root.join(GROUND_TRUTH_DIR).join(format!("{}.json", prompt_id))
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.root.join(GENERATED_DIR)
    }

    pub fn generated_path(&self, prompt_id: &str) -> PathBuf {
        self.generated_dir().join(format!("{}.json", prompt_id))
    }

    /// Resolve a report file name against the evaluation root
    pub fn output_path(&self, output: &Path) -> PathBuf {
        if output.is_absolute() {
            output.to_path_buf()
        } else {
            self.root.join(output)
        }
    }

    pub fn load_prompts(&self) -> Result<Vec<PromptRecord>> {
        let path = self.prompts_path();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("cannot read prompts file {}", path.display()))?;
        let prompts: Vec<PromptRecord> = serde_json::from_str(&json)
            .with_context(|| format!("malformed prompts file {}", path.display()))?;
        Ok(prompts)
    }

    /// Load both alias tables; a missing mappings directory yields the identity resolver
    pub fn load_resolver(&self) -> schemaeval_core::Result<AliasResolver> {
        let dir = self.mappings_dir();
        if !dir.exists() {
            tracing::warn!("No mappings directory at {:?}, names are compared verbatim", dir);
            return Ok(AliasResolver::empty());
        }
        AliasResolver::from_dir(&dir)
    }

    pub fn read_ground_truth(&self, prompt_id: &str) -> Result<String> {
        let path = self.ground_truth_path(prompt_id);
        fs::read_to_string(&path)
            .with_context(|| format!("cannot read ground truth {}", path.display()))
    }

    /// Cache a raw generation, pretty-printed when it is valid JSON
    pub fn save_generated(&self, prompt_id: &str, raw: &str) -> Result<PathBuf> {
        fs::create_dir_all(self.generated_dir())?;
        let path = self.generated_path(prompt_id);

        let contents = match serde_json::from_str::<serde_json::Value>(raw.trim()) {
            Ok(value) => serde_json::to_string_pretty(&value)?,
            Err(_) => raw.to_string(),
        };

        AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(contents.as_bytes()))
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(path)
    }
}
