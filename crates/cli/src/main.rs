//! sessionplan CLI - plan work sessions across the fast and deep tiers.

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use sessionplan_core::{
    AllocationConstraints, ComplexityMetrics, ModelTier, PlanId, RiskAssessment, SessionPlan, TierHours,
    ValidationResult,
};
use sessionplan_planner::{PlanService, PlannerConfig, SessionPlanner, TaskCatalog};
use sessionplan_storage::{JsonStorage, TimeRange};

#[derive(Parser)]
#[command(name = "sessionplan")]
#[command(about = "Plan work sessions under weekly tier quotas", long_about = None)]
struct Cli {
    /// Storage directory
    #[arg(long, global = true, default_value = ".sessionplan")]
    storage: PathBuf,

    /// Planner configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List task templates
    Catalog,
    /// Build a plan from complexity and risk signals
    Plan {
        /// JSON file with `complexity` and `risk`
        #[arg(long)]
        input: PathBuf,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-shape a stored plan
    Optimize {
        /// Plan ID
        id: PlanId,
        /// Ceiling on fast tier minutes
        #[arg(long)]
        max_fast_minutes: Option<u32>,
        /// Ceiling on deep tier minutes
        #[arg(long)]
        max_deep_minutes: Option<u32>,
        /// Tier to favor (fast or deep)
        #[arg(long)]
        prefer: Option<ModelTier>,
    },
    /// Validate a stored plan against recorded usage
    Validate {
        /// Plan ID
        id: PlanId,
    },
    /// Record current weekly usage
    Quota {
        /// Fast tier hours used
        #[arg(long)]
        fast_used: f64,
        /// Deep tier hours used
        #[arg(long)]
        deep_used: f64,
    },
    /// List recent plans
    History {
        /// How many days back
        #[arg(long, default_value = "7")]
        days: i64,
    },
}

#[derive(Deserialize)]
struct PlanInput {
    complexity: ComplexityMetrics,
    risk: RiskAssessment,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let planner = SessionPlanner::new().with_config(config);

    match cli.command {
        Commands::Catalog => print_catalog(planner.catalog()),
        Commands::Plan { input, json } => {
            let raw = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("reading {}", input.display()))?;
            let input: PlanInput = serde_json::from_str(&raw).context("parsing plan input")?;

            let mut service = open_service(&cli.storage, planner).await?;
            let plan = service.create_plan(&input.complexity, &input.risk).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
        }
        Commands::Optimize { id, max_fast_minutes, max_deep_minutes, prefer } => {
            let constraints = AllocationConstraints {
                max_fast_minutes,
                max_deep_minutes,
                preferred_tier: prefer,
            };
            let mut service = open_service(&cli.storage, planner).await?;
            let plan = service.reoptimize(id, &constraints).await?;
            print_plan(&plan);
        }
        Commands::Validate { id } => {
            let service = open_service(&cli.storage, planner).await?;
            let result = service.validate(id).await?;
            print_validation(&result);
        }
        Commands::Quota { fast_used, deep_used } => {
            let mut service = open_service(&cli.storage, planner).await?;
            let snapshot = service.record_usage(TierHours::new(fast_used, deep_used)).await?;
            for tier in ModelTier::ALL {
                let usage = snapshot.get(tier);
                println!(
                    "  {:<4} {:>6.1}h / {:>5.1}h ({:.0}%)",
                    tier.as_str(), usage.used_hours, usage.limit_hours, usage.percentage
                );
            }
        }
        Commands::History { days } => {
            let service = open_service(&cli.storage, planner).await?;
            let plans = service.history(&TimeRange::last_days(days)).await?;
            println!("Plans ({})", plans.len());
            for plan in plans {
                println!(
                    "  {} | {} | {} sessions | {:.1}h | confidence {}",
                    plan.id,
                    plan.created_at.format("%Y-%m-%d %H:%M"),
                    plan.session_sequence.len(),
                    plan.total_hours(),
                    plan.confidence,
                );
            }
        }
    }

    Ok(())
}

async fn open_service(storage: &Path, planner: SessionPlanner) -> Result<PlanService<JsonStorage>> {
    let storage = JsonStorage::new(storage).await?;
    Ok(PlanService::new(planner, storage))
}

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    let Some(path) = path else {
        return Ok(PlannerConfig::default());
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = PlannerConfig::from_json(&raw)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn print_catalog(catalog: &TaskCatalog) {
    println!("Task templates ({})", catalog.len());
    for template in catalog.list() {
        println!(
            "  {:<28} | {:<14} | c{:<2} | {:>4} min | {:>6} tokens",
            template.name,
            template.category.as_str(),
            template.base_complexity,
            template.base_minutes,
            template.base_tokens,
        );
        if !template.dependencies.is_empty() {
            println!("      after: {}", template.dependencies.join(", "));
        }
    }
}

fn print_plan(plan: &SessionPlan) {
    println!("Plan: {}", plan.id);
    println!("  Total: {:.1}h, confidence {}", plan.total_hours(), plan.confidence);
    for tier in ModelTier::ALL {
        let allocation = plan.model_allocation.get(tier);
        println!(
            "  {:<4} {:>5} min ({}%), {} tokens",
            tier.as_str(),
            allocation.estimated_minutes,
            allocation.percentage,
            plan.token_budget.by_tier.get(tier),
        );
    }
    println!("  Token budget: {}", plan.token_budget.total_tokens);

    println!("Sessions ({})", plan.session_sequence.len());
    for (i, session) in plan.session_sequence.iter().enumerate() {
        println!(
            "  {:>2}. {:<28} | {:<4} | p{:<2} | {:>4} min | {:>6} tokens",
            i + 1,
            session.name,
            session.tier.as_str(),
            session.priority,
            session.estimated_minutes,
            session.estimated_tokens,
        );
    }

    if !plan.recommendations.is_empty() {
        println!("Recommendations");
        for recommendation in &plan.recommendations {
            println!("  - {}", recommendation);
        }
    }
}

fn print_validation(result: &ValidationResult) {
    println!("Valid: {}", if result.is_valid { "yes" } else { "NO" });
    for error in &result.errors {
        println!("  ERROR   {}", error);
    }
    for warning in &result.warnings {
        println!("  WARNING {}", warning);
    }
    for suggestion in &result.suggestions {
        println!("  SUGGEST {}", suggestion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_catalog_and_optimize() {
        let cli = Cli::try_parse_from(["sessionplan", "catalog"]).unwrap();
        assert!(matches!(cli.command, Commands::Catalog));
        assert_eq!(cli.storage, PathBuf::from(".sessionplan"));

        let id = PlanId::new();
        let id_arg = id.to_string();
        let cli = Cli::try_parse_from([
            "sessionplan",
            "optimize",
            id_arg.as_str(),
            "--max-deep-minutes",
            "120",
            "--prefer",
            "fast",
        ])
        .unwrap();
        match cli.command {
            Commands::Optimize { id: parsed, max_deep_minutes, prefer, .. } => {
                assert_eq!(parsed, id);
                assert_eq!(max_deep_minutes, Some(120));
                assert_eq!(prefer, Some(ModelTier::Fast));
            }
            _ => panic!("expected optimize"),
        }
    }
}
