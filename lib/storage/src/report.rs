// CSV report and run summary
use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use schemaeval_core::EvaluationResult;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

const LIST_SEPARATOR: &str = "; ";

/// One CSV row; list columns are joined with `"; "`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRow {
    pub prompt_id: String,
    pub schema_count_match: bool,
    pub field_coverage: f64,
    pub type_accuracy: f64,
    pub structure_score: f64,
    pub semantic_score: f64,
    pub overall_score: f64,
    pub errors: String,
    pub generation_time_ms: f64,
    pub extra_forms: String,
}

impl From<&EvaluationResult> for ReportRow {
    fn from(result: &EvaluationResult) -> Self {
        Self {
            prompt_id: result.prompt_id.clone(),
            schema_count_match: result.schema_count_match,
            field_coverage: result.field_coverage,
            type_accuracy: result.type_accuracy,
            structure_score: result.structure_score,
            semantic_score: result.semantic_score,
            overall_score: result.overall_score,
            errors: result.errors.join(LIST_SEPARATOR),
            generation_time_ms: result.generation_time_ms,
            extra_forms: result.extra_forms.join(LIST_SEPARATOR),
        }
    }
}

/// Render results as CSV with a header row
pub fn render_csv(results: &[EvaluationResult]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for result in results {
        writer.serialize(ReportRow::from(result))?;
    }
    writer.into_inner().context("cannot flush CSV buffer")
}

/// Write the report atomically; nothing is written for an empty run
pub fn write_report<P: AsRef<Path>>(path: P, results: &[EvaluationResult]) -> Result<bool> {
    if results.is_empty() {
        return Ok(false);
    }
    let path = path.as_ref();
    let bytes = render_csv(results)?;
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| f.write_all(&bytes))
        .with_context(|| format!("cannot write report {}", path.display()))?;
    Ok(true)
}

/// Aggregate numbers of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_prompts: usize,
    pub failed_prompts: usize,
    pub average_overall_score: f64,
    pub average_generation_time_ms: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn new(results: &[EvaluationResult], started_at: DateTime<Utc>) -> Self {
        let n = results.len();
        let mean = |f: fn(&EvaluationResult) -> f64| {
            if n == 0 {
                0.0
            } else {
                results.iter().map(f).sum::<f64>() / n as f64
            }
        };
        Self {
            total_prompts: n,
            failed_prompts: results.iter().filter(|r| r.is_failed()).count(),
            average_overall_score: mean(|r| r.overall_score),
            average_generation_time_ms: mean(|r| r.generation_time_ms),
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result(id: &str, overall: f64, errors: Vec<&str>) -> EvaluationResult {
        EvaluationResult {
            prompt_id: id.to_string(),
            schema_count_match: errors.is_empty(),
            field_coverage: overall,
            type_accuracy: overall,
            structure_score: overall,
            semantic_score: overall,
            overall_score: overall,
            errors: errors.into_iter().map(String::from).collect(),
            generation_time_ms: 100.0,
            generated_schemas: 3,
            extra_forms: vec!["Review".into(), "Tag".into()],
        }
    }

    #[test]
    fn test_csv_columns_and_joining() {
        let bytes = render_csv(&[result("p1", 0.5, vec!["a", "b"])]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "prompt_id,schema_count_match,field_coverage,type_accuracy,structure_score,\
             semantic_score,overall_score,errors,generation_time_ms,extra_forms"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("p1,false,0.5,"));
        assert!(row.contains("a; b"));
        assert!(row.ends_with("Review; Tag"));
    }

    #[test]
    fn test_write_report_roundtrips_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        let results = vec![result("p1", 1.0, vec![]), result("p2", 0.0, vec!["Parse error"])];

        assert!(write_report(&path, &results).unwrap());

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<ReportRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].prompt_id, "p1");
        assert_eq!(rows[1].errors, "Parse error");
    }

    #[test]
    fn test_empty_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        assert!(!write_report(&path, &[]).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_summary() {
        let results = vec![result("p1", 1.0, vec![]), result("p2", 0.0, vec!["boom"])];
        let summary = RunSummary::new(&results, Utc::now());
        assert_eq!(summary.total_prompts, 2);
        assert_eq!(summary.failed_prompts, 1);
        assert_eq!(summary.average_overall_score, 0.5);
        assert_eq!(summary.average_generation_time_ms, 100.0);
        assert!(summary.elapsed_secs() >= 0.0);
    }
}
