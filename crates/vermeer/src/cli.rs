//! Command-line interface.

use crate::{VermeerConfig, load_plans};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vermeer_core::ContentPlan;
use vermeer_error::{ConfigError, VermeerResult};
use vermeer_scheduler::{CronSchedule, validate_schedule};

/// Vermeer - scheduled content generation with human review
#[derive(Parser, Debug)]
#[command(name = "vermeer")]
#[command(about = "Scheduled content generation with human review", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file layered over the defaults
    #[arg(long, global = true, env = "VERMEER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Validate a cron expression
    CheckCron {
        /// Five-field cron expression
        expression: String,

        /// IANA timezone the expression is evaluated in
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },

    /// Print the next fire times of a cron expression
    NextRuns {
        /// Five-field cron expression
        expression: String,

        /// IANA timezone the expression is evaluated in
        #[arg(long, default_value = "UTC")]
        timezone: String,

        /// How many fire times to print
        #[arg(long, default_value_t = 5)]
        count: usize,
    },

    /// Validate a plan file and print each plan's next fire time
    Plans {
        /// Path to a TOML file with [[plans]] tables
        file: PathBuf,
    },

    /// Print the effective configuration
    ShowConfig,
}

/// Result of checking a batch of plans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    /// One line per plan
    pub lines: Vec<String>,
    /// Enabled plans whose schedule was rejected
    pub invalid: usize,
}

fn describe(at: DateTime<Utc>, schedule: &CronSchedule) -> String {
    let local = at.with_timezone(&schedule.timezone());
    format!("{} ({})", local.format("%Y-%m-%d %H:%M %Z"), at.to_rfc3339())
}

/// Validate `expression` in `timezone` and describe its next run.
pub fn check_cron(expression: &str, timezone: &str, now: DateTime<Utc>) -> VermeerResult<String> {
    validate_schedule(expression, timezone, now)?;
    let schedule = CronSchedule::parse(expression, timezone)?;
    let next = schedule
        .next_after(now)
        .map(|at| describe(at, &schedule))
        .unwrap_or_default();
    Ok(format!(
        "'{}' is valid in {}; next run {}",
        expression, timezone, next
    ))
}

/// The next `count` fire times of `expression`, one per line.
pub fn next_runs(
    expression: &str,
    timezone: &str,
    count: usize,
    now: DateTime<Utc>,
) -> VermeerResult<Vec<String>> {
    let schedule = CronSchedule::parse(expression, timezone)?;
    Ok(schedule
        .upcoming(now, count)
        .into_iter()
        .map(|at| describe(at, &schedule))
        .collect())
}

/// Check every plan's schedule.
pub fn plan_report(plans: &[ContentPlan], now: DateTime<Utc>) -> PlanReport {
    let mut lines = Vec::with_capacity(plans.len());
    let mut invalid = 0;

    for plan in plans {
        let label = if plan.name.is_empty() {
            plan.id.to_string()
        } else {
            format!("{} ({})", plan.name, plan.id)
        };

        if !plan.enabled {
            lines.push(format!("{}: disabled", label));
            continue;
        }

        let next = validate_schedule(&plan.cron_expression, &plan.timezone, now)
            .and_then(|()| CronSchedule::parse(&plan.cron_expression, &plan.timezone));
        match next {
            Ok(schedule) => {
                let at = schedule
                    .next_after(now)
                    .map(|at| describe(at, &schedule))
                    .unwrap_or_default();
                lines.push(format!(
                    "{}: {} [{}] next run {}",
                    label, plan.cron_expression, plan.publish_mode, at
                ));
            }
            Err(e) => {
                invalid += 1;
                lines.push(format!("{}: invalid schedule: {}", label, e));
            }
        }
    }

    PlanReport { lines, invalid }
}

/// Execute a parsed command, printing to stdout.
pub fn run(command: &Commands, config: &VermeerConfig) -> VermeerResult<()> {
    let now = Utc::now();
    match command {
        Commands::CheckCron {
            expression,
            timezone,
        } => {
            println!("{}", check_cron(expression, timezone, now)?);
        }

        Commands::NextRuns {
            expression,
            timezone,
            count,
        } => {
            for line in next_runs(expression, timezone, *count, now)? {
                println!("{}", line);
            }
        }

        Commands::Plans { file } => {
            let plans = load_plans(file)?;
            let report = plan_report(&plans, now);
            for line in &report.lines {
                println!("{}", line);
            }
            if report.invalid > 0 {
                return Err(ConfigError::new(format!(
                    "{} of {} plans have an invalid schedule",
                    report.invalid,
                    plans.len()
                ))
                .into());
            }
        }

        Commands::ShowConfig => {
            let rendered = toml::to_string_pretty(config)
                .map_err(|e| ConfigError::new(format!("Failed to render configuration: {}", e)))?;
            print!("{}", rendered);
        }
    }

    Ok(())
}
