//! Documentation Generator - Main entry point
//!
//! Generates technical documentation for a source file in a git repository
//! using a hosted LLM.

use anyhow::Context;
use docgen::{
    cli::Cli, open_repository, AnalysisSummary, CodeAnalyzer, DocumentGenerator, DocumentResult,
};
use std::process;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging
    let default_filter = if cli.verbose { "docgen=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // Validate arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        process::exit(EXIT_CONFIGURATION);
    }

    // Run the application
    match run(cli).await {
        Ok(DocumentResult::Success(_)) => {}
        Ok(failure) => {
            if let Some(kind) = failure.failure_kind() {
                log::info!("Documentation request failed: {}", kind.as_str());
            }
            eprintln!("{}", failure);
            process::exit(EXIT_REQUEST_FAILED);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(exit_code(&e));
        }
    }
}

const EXIT_ERROR: i32 = 1;
const EXIT_REQUEST_FAILED: i32 = 2;
const EXIT_CONFIGURATION: i32 = 3;

/// Configuration problems (bad arguments, no API key) get their own status.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<docgen::Error>() {
        Some(e) if e.is_configuration() => EXIT_CONFIGURATION,
        _ => EXIT_ERROR,
    }
}

async fn run(cli: Cli) -> anyhow::Result<DocumentResult> {
    // Open and validate git repository
    let repo = open_repository(&cli.repo)?;

    if cli.verbose {
        println!("Git repository found at: {}", repo.root_path().display());
        if let Some(branch) = repo.current_branch() {
            println!("Branch: {}", branch);
        }
        if let Some(commit) = repo.head_commit() {
            println!("HEAD: {} {}", commit.short_hash(), commit.summary());
        }
    }

    let source_path = cli.source_path();
    let code = std::fs::read_to_string(&source_path)
        .with_context(|| format!("Failed to read {}", source_path.display()))?;

    let analysis = match &cli.analysis {
        Some(path) => AnalysisSummary::from_json_file(path)
            .with_context(|| format!("Failed to load analysis from {}", path.display()))?,
        None => CodeAnalyzer::new()?.analyze(&code),
    };

    if cli.verbose {
        println!("Analysis: {:#?}", analysis);
    }

    // Fails here, before any request, when no API key can be found
    let generator = DocumentGenerator::new(cli.to_config(), &cli.credential_chain())?;

    let result = generator.generate_documentation(&code, &analysis).await;

    if let DocumentResult::Success(text) = &result {
        match &cli.output {
            Some(path) => {
                std::fs::write(path, text)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                if cli.verbose {
                    println!("Documentation written to {}", path.display());
                }
            }
            None => println!("{}", text),
        }
    }

    Ok(result)
}
