//! `sorry-checkr` — scan a Lean project for `sorry` placeholders and open one
//! tracking issue per proof obligation.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Verify external requirements (`gh` CLI, `GEMINI_API_KEY`, repository
//!    path) — failures here abort before any scanning begins.
//! 3. Load config ([`config::load_config`]).
//! 4. Resolve repository identity ([`services::github::repo_info`]).
//! 5. Fetch reference URLs ([`services::webfetch`]).
//! 6. Walk the tree, scanning declarations and resolving imports per file
//!    ([`walker`], [`scanner`], [`resolver`]).
//! 7. `--dry-run`: print the listing ([`report`]) and stop.
//! 8. Enrich every obligation concurrently ([`pipeline::enrich_all`]).
//! 9. Publish with deduplication ([`pipeline::publish_all`]).

mod cli;
mod config;
mod models;
mod pipeline;
mod report;
mod resolver;
mod scanner;
mod services;
mod walker;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cli::Cli;
use config::load_config;
use resolver::{ImportResolver, PackageMap};
use scanner::Scanner;
use services::{gemini, github, webfetch};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup-fatal checks: missing tooling or a bad repository path abort the
    // whole run before any scanning.
    if let Err(err) = github::check_cli().await {
        eprintln!(" {} {}", "✗".red(), err);
        eprintln!("   Install it from https://cli.github.com/");
        std::process::exit(1);
    }

    let Ok(api_key) = std::env::var("GEMINI_API_KEY") else {
        eprintln!(" {} GEMINI_API_KEY is not set", "✗".red());
        eprintln!("   Create an API key at https://aistudio.google.com/apikey");
        std::process::exit(1);
    };

    let repo_root = cli
        .repo_path
        .canonicalize()
        .unwrap_or_else(|_| cli.repo_path.clone());
    if !repo_root.is_dir() {
        eprintln!(
            " {} repository path not found at '{}'",
            "✗".red(),
            repo_root.display()
        );
        std::process::exit(1);
    }

    let config = load_config(&repo_root, cli.config.as_deref())?;
    let label = cli.label.unwrap_or(config.scan.label);
    let model = cli.model.unwrap_or(config.scan.model);

    let repo = github::repo_info(&repo_root).await?;
    if !cli.quiet {
        eprintln!(" {} detected repository: {}", "✓".green(), repo.name_with_owner);
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let reference_context = webfetch::fetch_reference_urls(&client, &cli.reference_url).await;

    let packages = PackageMap::build(&repo_root);
    if !cli.quiet && !packages.is_empty() {
        eprintln!(
            " {} {} dependency package(s) in .lake/packages",
            "→".cyan(),
            packages.len()
        );
    }

    let scanner = Scanner::new()?;
    let resolver = ImportResolver::new(&repo_root, packages, config.scan.max_import_bytes)?;
    let web = cli
        .web_search
        .then(|| gemini::WebSearch::new(client.clone(), api_key.clone(), model.clone()));

    let search_path = if cli.search_path.is_absolute() {
        cli.search_path.clone()
    } else {
        repo_root.join(&cli.search_path)
    };

    if !cli.quiet {
        eprintln!(
            " {} scanning for `sorry` placeholders in {}...",
            "→".cyan(),
            search_path.display()
        );
    }

    let obligations = walker::collect_obligations(
        &search_path,
        &repo_root,
        &scanner,
        &resolver,
        web.as_ref(),
        &config.scan.exclude_dirs,
    )
    .await;

    if obligations.is_empty() {
        println!(" {} no `sorry` placeholders found", "✓".green());
        return Ok(());
    }

    if cli.dry_run {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&obligations)?);
        } else {
            println!("\n DRY RUN: would process the following obligations:\n");
            report::render_listing(&obligations);
        }
        return Ok(());
    }

    let enriched = pipeline::enrich_all(
        &client,
        &api_key,
        &model,
        &reference_context,
        obligations,
        cli.quiet,
    )
    .await?;

    let stats = pipeline::publish_all(&enriched, &repo, &label).await;

    println!(
        " {} done: {} created, {} skipped, {} failed",
        "✓".green(),
        stats.created,
        stats.skipped,
        stats.failed
    );

    Ok(())
}
