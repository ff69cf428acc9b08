use anyhow::Result;
use clap::Parser;
use compass::config::{self, Config};
use compass::diagnostics::DiagnosticSink;
use compass::llm::{prompts, LlmClient, Model, Usage};
use compass::plan::ReviewPlan;
use compass::recover;
use compass::report;
use compass::store::PlanStore;
use compass::tree::{render_tree_markdown, RepoScanner};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "compass",
    about = "An AI review-planning companion for your codebase",
    version
)]
struct Args {
    /// Path to the repository (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Review a single file's methods instead of planning the whole repository
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print the generated prompt and exit without calling the API
    #[arg(long)]
    dry_run: bool,

    /// Skip writing diagnostic side files for unparsable responses
    #[arg(long)]
    no_diagnostics: bool,

    /// Configure the OpenRouter API key
    #[arg(long)]
    setup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.setup {
        config::setup_api_key_interactive().map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let root = args.path.canonicalize()?;
    let config = Config::load();
    let store = PlanStore::new(&root);
    let mut sink = if args.no_diagnostics || !config.diagnostics {
        DiagnosticSink::disabled()
    } else {
        DiagnosticSink::rooted_at(&store.diagnostics_dir())
    };

    match &args.file {
        Some(file) => run_file_review(&root, file, &config, &store, &mut sink, args.dry_run).await,
        None => run_plan(&root, &config, &store, &mut sink, args.dry_run).await,
    }
}

async fn run_plan(
    root: &Path,
    config: &Config,
    store: &PlanStore,
    sink: &mut DiagnosticSink,
    dry_run: bool,
) -> Result<()> {
    eprintln!("🔍 Scanning repository...");
    let scanner = RepoScanner::new();
    let files = scanner.scan(root)?;
    let tree = render_tree_markdown(&files);

    let repo_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "repository".to_string());
    let user = prompts::plan_user_prompt(&repo_name, &tree);

    if dry_run {
        println!("{}", user);
        return Ok(());
    }

    let client = LlmClient::from_config(config)?;
    eprintln!("  🤖 Requesting a review plan ({} files)...", files.len());
    let response = client
        .chat(prompts::PLAN_SYSTEM, &user, Model::Smart, true)
        .await?;

    let recovery = recover::recover_plan(&response.content, sink);
    let report_md = report::render_plan_markdown(&recovery.plan, &recovery.diagnostics);
    if let Err(err) = store.save_plan(&recovery.plan, &report_md) {
        eprintln!("  Warning: Failed to persist plan: {}", err);
    }

    print_plan_summary(&recovery.plan, store);
    if !recovery.diagnostics.is_empty() {
        eprintln!("  📋 Response needed repair; raw material saved under .compass/diagnostics/");
    }
    print_usage(response.usage);
    Ok(())
}

async fn run_file_review(
    root: &Path,
    file: &Path,
    config: &Config,
    store: &PlanStore,
    sink: &mut DiagnosticSink,
    dry_run: bool,
) -> Result<()> {
    let absolute = root.join(file);
    let content = fs::read_to_string(&absolute)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", absolute.display(), e))?;
    let display_path = file.to_string_lossy().to_string();
    let user = prompts::file_review_user_prompt(&display_path, &content);

    if dry_run {
        println!("{}", user);
        return Ok(());
    }

    let client = LlmClient::from_config(config)?;
    eprintln!("🔍 Reviewing {}...", display_path);
    let response = client
        .chat(prompts::FILE_REVIEW_SYSTEM, &user, Model::Speed, true)
        .await?;

    let review = recover::recover_file_review(&response.content, &display_path, sink);
    let report_md = report::render_review_markdown(&review);

    match store.save_review(&review, &report_md) {
        Ok(path) => eprintln!("  ✨ {} methods noted. Report: {}", review.methods.len(), path.display()),
        Err(err) => {
            eprintln!("  Warning: Failed to persist review: {}", err);
            eprintln!("  ✨ {} methods noted.", review.methods.len());
        }
    }
    print_usage(response.usage);
    Ok(())
}

fn print_plan_summary(plan: &ReviewPlan, store: &PlanStore) {
    eprintln!();
    eprintln!("  ✨ {}", plan.title);
    let mut ordered: Vec<_> = plan.categories.iter().collect();
    ordered.sort_by_key(|c| c.priority);
    for category in ordered {
        eprintln!(
            "     {}. {} ({} files)",
            category.priority,
            category.name,
            category.files.len()
        );
    }
    eprintln!();
    eprintln!("  Report: {}", store.report_path().display());
}

fn print_usage(usage: Option<Usage>) {
    if let Some(usage) = usage {
        eprintln!(
            "  💰 {} tokens (${:.4})",
            usage.total_tokens,
            usage.cost()
        );
    }
}
