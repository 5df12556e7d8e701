//! CLI command definitions for bug-forge.
//!
//! One command does the whole job: load the corpus, inject and verify bugs
//! in parallel, print the counts and write the buggy problems to disk.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::corpus::{load_problems, Corpus};
use crate::export::{write_result_mapping, RunSummary};
use crate::injection::{LlmBugInjector, DEFAULT_MODEL};
use crate::llm::{LiteLlmClient, LlmProvider, OpenRouterProvider};
use crate::oracle::{OracleValidator, PythonOracle, DEFAULT_INTERPRETER};
use crate::pipeline::config::parse_seconds;
use crate::pipeline::{
    DispatchConfig, Dispatcher, PipelineConfig, RetryController, SkipReason,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_WORKERS,
};

/// Default corpus location.
const DEFAULT_PROBLEMS: &str = "HumanEval.jsonl.gz";

/// Default output file.
const DEFAULT_OUTPUT: &str = "buggy_problems.json";

/// Buggy-solution dataset generator.
#[derive(Parser)]
#[command(name = "bug-forge")]
#[command(about = "Inject subtle bugs into reference solutions and keep the ones the tests catch")]
#[command(version)]
#[command(
    long_about = "bug-forge asks a language model to plant a subtle bug in each reference solution of a HumanEval-style corpus, runs the candidate against the problem's tests, and keeps it only if the tests fail.\n\nExample usage:\n  bug-forge generate --problems HumanEval.jsonl.gz --model gpt-4o-mini --output buggy_problems.json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate buggy variants of every problem in a corpus.
    #[command(alias = "gen")]
    Generate(GenerateArgs),
}

/// Arguments for `bug-forge generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Problem corpus in JSONL format, optionally gzip-compressed.
    #[arg(short = 'p', long, default_value = DEFAULT_PROBLEMS)]
    pub problems: PathBuf,

    /// Where to write the buggy problems JSON.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Model asked to inject bugs.
    #[arg(short = 'm', long, env = "BUGFORGE_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Generate-validate attempts per problem.
    #[arg(long, env = "BUGFORGE_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Problems processed concurrently.
    #[arg(short = 'w', long, env = "BUGFORGE_MAX_WORKERS", default_value_t = DEFAULT_MAX_WORKERS)]
    pub max_workers: usize,

    /// Give up on a problem after this many seconds (unset or 0 waits indefinitely).
    #[arg(long, env = "BUGFORGE_ITEM_TIMEOUT_SECS")]
    pub item_timeout: Option<u64>,

    /// Seconds a single candidate may run in the oracle.
    #[arg(long, env = "BUGFORGE_ORACLE_TIMEOUT_SECS", default_value = "3")]
    pub oracle_timeout: f64,

    /// Python interpreter used to run candidates.
    #[arg(long, env = "BUGFORGE_PYTHON", default_value = DEFAULT_INTERPRETER)]
    pub python: String,

    /// Only process the first N problems (in task id order).
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// OpenRouter API key. Without one, LITELLM_API_BASE/LITELLM_API_KEY are used.
    #[arg(long, env = "OPENROUTER_API_KEY")]
    pub api_key: Option<String>,

    /// Print the summary as JSON instead of plain text.
    #[arg(short = 'j', long)]
    pub json: bool,
}

impl GenerateArgs {
    /// Pipeline configuration described by these arguments.
    pub fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let config = PipelineConfig::new()
            .with_model(self.model.clone())
            .with_max_attempts(self.max_attempts)
            .with_max_workers(self.max_workers)
            .with_item_timeout(
                self.item_timeout
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs),
            )
            .with_oracle_timeout(parse_seconds(self.oracle_timeout, "--oracle-timeout")?)
            .with_python(self.python.clone());
        config.validate()?;
        Ok(config)
    }
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => run_generate_command(args).await,
    }
}

/// JSON form of the end-of-run summary.
#[derive(Serialize)]
struct JsonSummary<'a> {
    #[serde(flatten)]
    summary: &'a RunSummary,
    output: String,
    skipped: &'a std::collections::BTreeMap<String, SkipReason>,
}

async fn run_generate_command(args: GenerateArgs) -> anyhow::Result<()> {
    let config = args.pipeline_config()?;

    let mut corpus = load_problems(&args.problems)
        .with_context(|| format!("Failed to load problems from {}", args.problems.display()))?;
    if let Some(limit) = args.limit {
        corpus = limit_corpus(corpus, limit);
    }

    let (provider, model) = build_llm_client(args.api_key.clone(), config.model.clone())?;
    let injector = Arc::new(LlmBugInjector::new(provider, model));
    let validator = Arc::new(OracleValidator::new(PythonOracle::new(
        config.python.clone(),
        config.oracle_timeout,
    )));
    let controller =
        RetryController::new(injector, validator).with_max_attempts(config.max_attempts);
    let dispatcher = Dispatcher::new(Arc::new(controller), DispatchConfig::from(&config));

    info!(
        problems = corpus.len(),
        model = %config.model,
        "Starting bug generation"
    );
    let report = dispatcher.run(&corpus).await;

    let summary = RunSummary::new(corpus.len(), &report.buggy);
    if args.json {
        let json = JsonSummary {
            summary: &summary,
            output: args.output.display().to_string(),
            skipped: &report.skipped,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", summary.render());
    }

    write_result_mapping(&args.output, &report.buggy)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        buggy = summary.buggy_problems,
        total = summary.total_problems,
        success_rate = format!("{:.1}%", summary.success_rate()),
        "Bug generation finished"
    );
    Ok(())
}

/// Keeps the first `limit` problems in task id order.
fn limit_corpus(corpus: Corpus, limit: usize) -> Corpus {
    corpus.into_iter().take(limit).collect()
}

/// Picks the provider and the model name to send it.
///
/// OpenRouter needs vendor-qualified ids, so a bare model name is assumed to
/// be an OpenAI one.
fn build_llm_client(
    api_key: Option<String>,
    model: String,
) -> anyhow::Result<(Arc<dyn LlmProvider>, String)> {
    let resolved_api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .or_else(|| std::env::var("OPENROUTER_API_KEY").ok());

    if let Some(key) = resolved_api_key {
        let model = openrouter_model_id(model);
        info!(model = %model, "Using OpenRouter with specified API key");
        let provider = OpenRouterProvider::with_model(key, model.clone())?;
        Ok((Arc::new(provider), model))
    } else {
        info!("Using LiteLLM client from environment");
        let client = LiteLlmClient::from_env().map_err(|e| {
            anyhow::anyhow!(
                "Failed to initialize LLM client: {}. Please provide --api-key or set OPENROUTER_API_KEY / LITELLM_API_BASE.",
                e
            )
        })?;
        Ok((Arc::new(client), model))
    }
}

fn openrouter_model_id(model: String) -> String {
    if model.contains('/') {
        model
    } else {
        format!("openai/{}", model)
    }
}
