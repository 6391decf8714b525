use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use schemaeval::{
    CachedGenerator, ChatCompletionsClient, EvalLayout, Generator, GeneratorConfig, RunConfig,
    RunSummary, Runner, SchemaEvaluator, ScoreWeights, write_report,
};
use schemaeval_api::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Score AI-generated form schemas against ground truth
#[derive(Parser, Debug)]
#[command(name = "schemaeval")]
#[command(about = "Score AI-generated form schemas against ground truth", long_about = None)]
struct Args {
    /// Evaluation directory (prompts.json, mappings/, ground_truth/)
    #[arg(short, long, default_value = ".")]
    eval_dir: PathBuf,

    /// CSV report, relative to the evaluation directory unless absolute
    #[arg(short, long, default_value = "report.csv")]
    output: PathBuf,

    /// Rescore outputs saved in generated_schemas/ instead of calling the model
    #[arg(long)]
    offline: bool,

    /// JSON file overriding the metric weights
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Prompts evaluated concurrently
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Timeout of one generation request, in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Retries after a failed generation request
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Chat-completions endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Model name sent with every request
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Completion token limit
    #[arg(long, default_value_t = 1024)]
    max_tokens: u32,

    /// API key for the endpoint
    #[arg(long, env = "SCHEMAEVAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting SchemaEval v{}", env!("CARGO_PKG_VERSION"));
    info!("Evaluation directory: {:?}", args.eval_dir);

    let layout = EvalLayout::new(&args.eval_dir);
    let prompts = layout.load_prompts()?;
    let resolver = layout.load_resolver().context("cannot load alias tables")?;
    info!(
        "Loaded {} prompts, {} field aliases, {} type aliases",
        prompts.len(),
        resolver.field_aliases().len(),
        resolver.type_aliases().len()
    );

    let weights = match &args.weights {
        Some(path) => ScoreWeights::from_file(path).context("invalid weights file")?,
        None => ScoreWeights::default(),
    };
    let evaluator = SchemaEvaluator::new(Arc::new(resolver)).with_weights(weights);

    let generator_config = GeneratorConfig {
        endpoint: args.endpoint,
        model: args.model,
        api_key: args.api_key,
        max_tokens: args.max_tokens,
        timeout: Duration::from_secs(args.timeout_secs),
        max_retries: args.max_retries,
        ..Default::default()
    };

    let generator: Arc<dyn Generator> = if args.offline {
        info!("Offline mode: replaying {:?}", layout.generated_dir());
        Arc::new(CachedGenerator::new(layout.generated_dir()))
    } else {
        let client = ChatCompletionsClient::new(generator_config.clone())
            .context("live run needs --api-key or SCHEMAEVAL_API_KEY")?;
        info!("Generating with {} at {}", generator_config.model, generator_config.endpoint);
        Arc::new(client)
    };

    let config = RunConfig {
        concurrency: args.concurrency,
        generation_deadline: generator_config.deadline(),
        save_generated: !args.offline,
        output: args.output,
    };
    let output = layout.output_path(&config.output);

    let started_at = Utc::now();
    let runner = Runner::new(layout, evaluator, generator, config);
    let results = runner.run(&prompts).await;

    if write_report(&output, &results)? {
        info!("Report written to {:?}", output);
    } else {
        warn!("No prompts evaluated, report not written");
    }

    let summary = RunSummary::new(&results, started_at);
    info!(
        "Evaluated {} prompts ({} failed) in {:.1}s: mean overall {:.3}, mean generation {:.0}ms",
        summary.total_prompts,
        summary.failed_prompts,
        summary.elapsed_secs(),
        summary.average_overall_score,
        summary.average_generation_time_ms
    );

    Ok(())
}
