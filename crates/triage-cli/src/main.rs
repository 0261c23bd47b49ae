//! 📨 triage CLI: classify inquiries, run batches, onboarding and status.
//!
//! Usage:
//!   triage classify "<text>"  Classify a typed inquiry and draft a reply
//!   triage batch <file>       Classify a JSON or line-based inquiry file
//!   triage samples            Classify the built-in sample inquiries
//!   triage onboard            Create a default configuration
//!   triage status             Show current configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use triage_core::catalog::{product_for, sample_inquiries};
use triage_core::config::Config;
use triage_core::engine::{BatchProgress, TriageEngine};
use triage_core::inquiry::{AnalysisResult, Inquiry, InquiryOrigin};

#[derive(Parser)]
#[command(
    name = "triage",
    version,
    about = "Route customer inquiries to the right product",
    long_about = "📨 triage classifies customer inquiries into product categories.\n\nUses a remote LLM when configured and falls back to deterministic keyword rules."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single, manually typed inquiry
    Classify {
        /// Inquiry text
        text: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Skip the remote backend
        #[arg(long)]
        local: bool,
    },

    /// Classify every inquiry in a file
    Batch {
        /// JSON array of inquiries, or plain text with one inquiry per line
        file: std::path::PathBuf,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,

        /// Skip the remote backend
        #[arg(long)]
        local: bool,

        /// Inquiries in flight at once (overrides config)
        #[arg(short, long)]
        concurrency: Option<usize>,
    },

    /// Classify the built-in sample inquiries
    Samples {
        /// Print the results as JSON
        #[arg(long)]
        json: bool,

        /// Skip the remote backend
        #[arg(long)]
        local: bool,
    },

    /// Create or reset the default configuration
    Onboard,

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Classify { text, json, local }) => cmd_classify(&text, json, local).await?,
        Some(Commands::Batch {
            file,
            json,
            local,
            concurrency,
        }) => cmd_batch(&file, json, local, concurrency).await?,
        Some(Commands::Samples { json, local }) => cmd_samples(json, local).await?,
        Some(Commands::Onboard) => cmd_onboard()?,
        Some(Commands::Status) | None => cmd_status()?,
    }

    Ok(())
}

// ── Shared Setup ────────────────────────────────────────────────────

fn validate_config(config: &Config) -> Result<()> {
    if let Err(errors) = config.validate() {
        eprintln!("\n  \x1b[31m❌ Configuration errors:\x1b[0m");
        for e in &errors {
            eprintln!("     • {}", e);
        }
        eprintln!();
        anyhow::bail!("Fix the above {} error(s) in config.json", errors.len());
    }
    Ok(())
}

/// Load and validate config, apply command-line overrides, build the engine.
fn setup_engine(local: bool, concurrency: Option<usize>) -> Result<TriageEngine> {
    let mut config = Config::load()?;
    if local {
        config.classifier.use_remote = false;
    }
    if let Some(n) = concurrency {
        config.classifier.max_concurrency = n;
    }
    validate_config(&config)?;

    Ok(TriageEngine::from_config(&config, reqwest::Client::new()))
}

/// Cancel `token` on Ctrl+C so in-flight remote calls are abandoned.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n  ⏳ Cancelling remote calls, finishing locally...");
            token.cancel();
        }
    });
}

// ── Commands ────────────────────────────────────────────────────────

async fn cmd_classify(text: &str, json: bool, local: bool) -> Result<()> {
    let engine = setup_engine(local, None)?;

    let inquiry = Inquiry::manual(format!("manual-{}", uuid::Uuid::new_v4()), text)
        .with_date(chrono::Local::now().format("%Y-%m-%d").to_string());

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());
    let result = engine.classify_with_cancel(&inquiry, &cancel).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    print_result(&result);
    if let Some(reply) = &result.customer_response {
        println!("  Reply:");
        for line in reply.lines() {
            println!("     {}", line);
        }
        println!();
    }
    Ok(())
}

async fn cmd_batch(
    file: &Path,
    json: bool,
    local: bool,
    concurrency: Option<usize>,
) -> Result<()> {
    let inquiries = read_inquiries(file)?;
    info!(file = %file.display(), count = inquiries.len(), "Loaded inquiries");
    let engine = setup_engine(local, concurrency)?;
    run_batch(&engine, &inquiries, json).await
}

async fn cmd_samples(json: bool, local: bool) -> Result<()> {
    let engine = setup_engine(local, None)?;
    run_batch(&engine, &sample_inquiries(), json).await
}

async fn run_batch(engine: &TriageEngine, inquiries: &[Inquiry], json: bool) -> Result<()> {
    if !json {
        println!();
        println!(
            "  📨 Classifying {} inquiries ({})",
            inquiries.len(),
            engine.remote_name().unwrap_or("local rules")
        );
        println!("  ─────────────────────────────────────");
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let (tx, mut rx) = mpsc::channel::<BatchProgress>(16);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if !json {
                println!(
                    "  [{}/{}] {} → {} ({:.0}%)",
                    event.completed,
                    event.total,
                    event.result.inquiry.id,
                    event.result.recommended_product_category,
                    event.result.confidence * 100.0
                );
            }
        }
    });

    let results = engine.classify_all_with(inquiries, Some(tx), &cancel).await;
    printer.await.context("Progress printer failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("  ─────────────────────────────────────");
    println!();
    for result in &results {
        print_result(result);
    }
    Ok(())
}

fn cmd_onboard() -> Result<()> {
    let path = Config::write_default_template()?;
    println!();
    println!("  ✅ Configuration created at:");
    println!("     {}", path.display());
    println!();
    println!("  Next steps:");
    println!("  1. Edit the config file and add your API key");
    println!("  2. Run `triage samples` to classify the sample inquiries");
    println!();
    Ok(())
}

fn cmd_status() -> Result<()> {
    let config_path = Config::default_path();
    let config = Config::load()?;

    println!();
    println!("  📨 triage status");
    println!("  ─────────────────────────────────────");

    // Config file
    if config_path.exists() {
        println!("  Config:      {}", config_path.display());
    } else {
        println!("  Config:      ⚠️  Not found (run `triage onboard`), using defaults");
    }

    // Provider
    match config.providers.find_active() {
        Some((kind, entry)) => {
            let model = entry.model.as_deref().unwrap_or(kind.default_model());
            println!("  Provider:    ✅ {} ({})", kind, model);
        }
        None => println!("  Provider:    ❌ None configured, local rules only"),
    }
    if !config.classifier.use_remote {
        println!("  Remote:      disabled");
    }

    // Classifier
    println!("  Timeout:     {}s", config.classifier.request_timeout().as_secs());
    println!("  Concurrency: {}", config.classifier.max_concurrency);

    if let Err(errors) = config.validate() {
        for e in &errors {
            println!("  ⚠️  {}", e);
        }
    }

    println!();
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

fn print_result(result: &AnalysisResult) {
    let category = result.recommended_product_category;
    let product = product_for(category).map(|p| p.name).unwrap_or("-");

    println!("  📝 {}", result.inquiry.id);
    if let Some(customer) = &result.inquiry.customer {
        println!("     Customer:   {}", customer);
    }
    println!(
        "     Category:   {} · {} ({:.0}%)",
        category,
        product,
        result.confidence * 100.0
    );
    println!("     Analysis:   {}", result.analysis);
    if let Some(question) = &result.follow_up_question {
        println!("     Follow-up:  {}", question);
    }
    println!();
}

/// Read a batch file: a JSON array of inquiries, or one inquiry per
/// non-empty line of plain text.
///
/// `.json` files must be valid JSON. Other files are tried as JSON only when
/// they start with `[` and are read line by line if that fails.
fn read_inquiries(path: &Path) -> Result<Vec<Inquiry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json_file = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json_file {
        return serde_json::from_str(&content)
            .with_context(|| format!("Invalid inquiry JSON in {}", path.display()));
    }

    if content.trim_start().starts_with('[') {
        match serde_json::from_str(&content) {
            Ok(inquiries) => return Ok(inquiries),
            Err(e) => info!(file = %path.display(), error = %e, "Not an inquiry JSON array, reading lines"),
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(parse_lines(&content, &file_name))
}

fn parse_lines(content: &str, file_name: &str) -> Vec<Inquiry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| {
            Inquiry::new(format!("line-{}", i + 1), line, InquiryOrigin::Upload)
                .with_source_file(file_name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines_skips_blank_lines() {
        let inquiries = parse_lines("Chatbot gesucht\n\n   \nAnrufe transkribieren\n", "anfragen.txt");
        assert_eq!(inquiries.len(), 2);
        assert_eq!(inquiries[0].id, "line-1");
        assert_eq!(inquiries[1].id, "line-2");
        assert_eq!(inquiries[1].text, "Anrufe transkribieren");
        assert_eq!(inquiries[0].origin, InquiryOrigin::Upload);
        assert_eq!(inquiries[0].source_file.as_deref(), Some("anfragen.txt"));
    }

    #[test]
    fn test_read_json_inquiries() {
        let dir = std::env::temp_dir().join(format!("triage-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("batch.json");
        std::fs::write(
            &path,
            r#"[{"id": "a", "text": "Chatbot"}, {"id": "b", "text": "Hallo", "origin": "manual"}]"#,
        )
        .unwrap();

        let inquiries = read_inquiries(&path).unwrap();
        assert_eq!(inquiries.len(), 2);
        assert_eq!(inquiries[0].origin, InquiryOrigin::Upload);
        assert!(inquiries[1].is_manual());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bracket_prefixed_text_is_read_as_lines() {
        let dir = std::env::temp_dir().join(format!("triage-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("anfragen.txt");
        std::fs::write(&path, "[Dringend] Wir brauchen einen Chatbot\nHallo\n").unwrap();

        let inquiries = read_inquiries(&path).unwrap();
        assert_eq!(inquiries.len(), 2);
        assert_eq!(inquiries[0].id, "line-1");
        assert_eq!(inquiries[0].text, "[Dringend] Wir brauchen einen Chatbot");
        assert_eq!(inquiries[1].text, "Hallo");
        assert_eq!(inquiries[1].source_file.as_deref(), Some("anfragen.txt"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_invalid_json_file_is_error() {
        let dir = std::env::temp_dir().join(format!("triage-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("batch.json");
        std::fs::write(&path, "[Dringend] Wir brauchen einen Chatbot\n").unwrap();

        assert!(read_inquiries(&path).is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_read_missing_file_is_error() {
        assert!(read_inquiries(Path::new("/nonexistent/triage.txt")).is_err());
    }
}
