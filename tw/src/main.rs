//! TripWeaver - multi-source itinerary data orchestration
//!
//! CLI entry point: plan, validate, and inspect the knowledge base.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tokio::sync::broadcast;
use tracing::{info, warn};

use tripweaver::cli::{Cli, Command, OutputFormat};
use tripweaver::config::Config;
use tripweaver::coordinator::{CoordinationResult, PlanningCoordinator, PlanningRequest};
use tripweaver::events::{CollectionEvent, create_event_bus, default_runs_dir, spawn_event_logger};
use tripweaver::integrator::Integrator;
use tripweaver::orchestrator::Orchestrator;
use tripweaver::provider::{KnowledgeBase, Providers, StaticProvider};

fn setup_logging(level: &str) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripweaver")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to the log file, never stdout/stderr
    let level: tracing::Level = level
        .parse()
        .map_err(|_| eyre::eyre!("Invalid log level: {}", level))?;
    let log_file = fs::File::create(log_dir.join("tripweaver.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    setup_logging(&level).context("Failed to setup logging")?;

    match cli.command {
        Command::Plan { request, format } => cmd_plan(&config, &request, format).await,
        Command::Validate { request } => cmd_validate(&request),
        Command::Knowledge => cmd_knowledge(&config),
    }
}

fn load_knowledge(config: &Config) -> Result<KnowledgeBase> {
    KnowledgeBase::load_or_builtin(config.knowledge.path.as_deref()).context("Failed to load knowledge base")
}

/// Run the whole pipeline and print the result
async fn cmd_plan(config: &Config, request_path: &Path, format: Option<OutputFormat>) -> Result<()> {
    let format = format.unwrap_or(config.output.format);
    let request = PlanningRequest::load(request_path)?;
    request.validate()?;

    let provider = Arc::new(StaticProvider::new(load_knowledge(config)?));
    let integrator = Integrator::new(provider.routes().clone());
    let event_bus = create_event_bus(config.orchestrator.event_capacity);

    let logger = if config.events.record {
        let runs_dir = match &config.events.dir {
            Some(dir) => dir.clone(),
            None => default_runs_dir()?,
        };
        info!(runs_dir = %runs_dir.display(), "Recording run events");
        Some(spawn_event_logger(event_bus.clone(), runs_dir))
    } else {
        None
    };
    let progress = (format == OutputFormat::Text).then(|| tokio::spawn(report_failures(event_bus.subscribe())));

    let orchestrator =
        Orchestrator::new(Providers::from_all(provider), config.orchestrator.clone()).with_events(event_bus.clone());
    let coordinator = PlanningCoordinator::new(orchestrator, integrator);

    let outcome = coordinator
        .run_until(&request, async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            warn!("Interrupted, cancelling planning run");
        })
        .await;

    // Close the bus so the consumers drain and exit
    drop(coordinator);
    drop(event_bus);
    if let Some(handle) = logger
        && let Err(e) = handle.await
    {
        warn!(error = %e, "Event logger task failed");
    }
    if let Some(handle) = progress {
        let _ = handle.await;
    }

    let result = outcome?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_result(&request, &result),
    }
    Ok(())
}

/// Print task failures to stderr as they happen
async fn report_failures(mut rx: broadcast::Receiver<CollectionEvent>) {
    loop {
        match rx.recv().await {
            Ok(CollectionEvent::TaskFailed {
                destination,
                category,
                reason,
                ..
            }) => {
                eprintln!("{} {}/{}: {}", "✗".red(), destination, category.as_str(), reason);
            }
            Ok(CollectionEvent::BudgetFailed { reason, .. }) => {
                eprintln!("{} budget: {}", "✗".red(), reason);
            }
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_result(request: &PlanningRequest, result: &CoordinationResult) {
    let framework = &request.framework;
    println!(
        "{} {} ({} days, budget {})",
        "Trip:".bold(),
        framework.theme.primary_theme,
        framework.duration_days,
        framework.total_budget
    );
    println!();

    let quality = &result.quality_report;
    let completeness = format!("{:.0}%", quality.completeness * 100.0);
    let completeness = if quality.needs_completion {
        completeness.yellow()
    } else {
        completeness.green()
    };
    println!("{} {}", "Data completeness:".bold(), completeness);
    for issue in &quality.issues {
        let marker = if issue.critical { "!".red() } else { "-".normal() };
        println!("  {} {}/{}: {}", marker, issue.destination, issue.category.as_str(), issue.reason);
    }
    if !quality.budget_available {
        println!("  {} budget breakdown unavailable", "-".normal());
    }
    println!();

    println!("{}", "Destinations".bold());
    for summary in &result.integrated_view.summaries {
        let counts = &summary.option_counts;
        println!(
            "  {:<12} stay {:<24} attractions {:>2}  flights {} trains {} local {} lodging {}",
            summary.destination.as_str().cyan(),
            summary.recommended_stay.as_str(),
            summary.attraction_count,
            counts.flights,
            counts.trains,
            counts.local,
            counts.lodging
        );
        if let Some(weather) = &summary.weather {
            println!(
                "  {:<12} {} on {}, {}..{}°C, {}% rain",
                "",
                weather.condition,
                weather.date,
                weather.low_temp,
                weather.high_temp,
                weather.precipitation_probability
            );
        }
    }
    println!();

    let graph = &result.integrated_view.transport_graph;
    if !graph.edges.is_empty() {
        println!("{}", "Routes".bold());
        for edge in &graph.edges {
            println!("  {} -> {}: {}", edge.from, edge.to, edge.recommendation);
        }
        println!();
    }

    let filtered = &result.filtered_dataset;
    if !filtered.applied.is_empty() || !filtered.ignored.is_empty() {
        println!("{}", "Constraints".bold());
        for applied in &filtered.applied {
            println!("  {} {} ({} rejected)", "✓".green(), applied.text, applied.rejected);
        }
        for mismatch in &filtered.ignored {
            println!("  {} {}", "-".normal(), mismatch);
        }
        println!();
    }

    let insights = &result.insight_set;
    print_section("Findings", insights.findings.iter().map(|i| i.message.normal()));
    print_section(
        "Recommendations",
        insights.recommendations.iter().map(|i| i.message.normal()),
    );
    print_section("Warnings", insights.warnings.iter().map(|i| i.message.yellow()));
    print_section("Opportunities", insights.opportunities.iter().map(|i| i.message.green()));
}

fn print_section<I>(title: &str, lines: I)
where
    I: Iterator<Item = colored::ColoredString>,
{
    let lines: Vec<_> = lines.collect();
    if lines.is_empty() {
        return;
    }
    println!("{}", title.bold());
    for line in lines {
        println!("  • {}", line);
    }
    println!();
}

/// Validate a request file without collecting
fn cmd_validate(request_path: &Path) -> Result<()> {
    let request = PlanningRequest::load(request_path)?;
    request.validate()?;

    println!(
        "{} {}: {} destination(s), {} constraint(s), {} deep preference(s)",
        "✓".green(),
        request_path.display(),
        request.framework.destinations.len(),
        request.needs.constraints.len(),
        request.needs.deep_preferences.len()
    );
    Ok(())
}

/// Print the active knowledge base
fn cmd_knowledge(config: &Config) -> Result<()> {
    let kb = load_knowledge(config)?;
    print!("{}", kb.to_yaml()?);
    Ok(())
}
