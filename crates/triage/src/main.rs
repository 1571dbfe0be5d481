//! Triage Board Engine CLI
//!
//! Classifies tracker work items into named buckets using declarative rules
//! loaded from a configuration file, against a JSON snapshot produced by an
//! external fetch layer. Designed for deterministic, machine-friendly output
//! and automation.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::Parser;

use triage::cli::{Cli, Commands};
use triage::engine::Classification;
use triage::output::{ExitCode, JsonError, JsonOutput, OutputContext};
use triage::schema::SchemaTarget;
use triage::{load_config, load_snapshot, CompiledSet, ConfigErrors};

/// Helper to determine exit code from error message
fn error_to_exit_code(error: &anyhow::Error) -> ExitCode {
    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return match io_error.kind() {
            std::io::ErrorKind::NotFound => ExitCode::NotFound,
            _ => ExitCode::ExternalError,
        };
    }

    let error_msg = error.to_string().to_lowercase();
    if error_msg.contains("failed to read") || error_msg.contains("no collection") {
        ExitCode::NotFound
    } else if error_msg.contains("failed to parse") {
        ExitCode::ValidationFailed
    } else if error_msg.contains("invalid") {
        ExitCode::InvalidArgument
    } else {
        ExitCode::GenericError
    }
}

fn main() {
    let exit_code = match run() {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            error_to_exit_code(&e)
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Check { config, json } => {
            let output_ctx = OutputContext::new(quiet, json);
            let raw = load_config(&config)?;

            match CompiledSet::compile(&raw) {
                Ok(set) => {
                    if json {
                        let data = serde_json::json!({
                            "valid": true,
                            "rules": set.rules().len(),
                            "collections": set.collections().len(),
                        });
                        println!("{}", JsonOutput::success(data, "check").to_json_string()?);
                    } else {
                        let _ = output_ctx.print_success(format!(
                            "Configuration OK: {} rule(s), {} collection(s)",
                            set.rules().len(),
                            set.collections().len()
                        ));
                    }
                }
                Err(errors) => report_config_errors(&errors, json, "check"),
            }
        }

        Commands::Classify {
            config,
            snapshot,
            at,
            collection,
            json,
        } => {
            let output_ctx = OutputContext::new(quiet, json);
            let raw = load_config(&config)?;
            let set = match CompiledSet::compile(&raw) {
                Ok(set) => set,
                Err(errors) => report_config_errors(&errors, json, "classify"),
            };

            let snapshot = load_snapshot(&snapshot)?;
            let now = parse_evaluation_time(at.as_deref())?;
            let classification = set.classify(&snapshot, now);

            // Unknown collection id is a usage error, not an empty result
            if let Some(ref id) = collection {
                if classification.collection(id).is_none() {
                    if json {
                        let error = JsonError::new(
                            "COLLECTION_NOT_FOUND",
                            format!("no collection with id '{}'", id),
                            "classify",
                        );
                        println!("{}", error.to_json_string()?);
                        std::process::exit(error.exit_code().code());
                    }
                    return Err(anyhow!("no collection with id '{}'", id));
                }
            }

            if json {
                let data = match collection {
                    Some(ref id) => serde_json::to_value(classification.collection(id))?,
                    None => serde_json::to_value(&classification)?,
                };
                println!("{}", JsonOutput::success(data, "classify").to_json_string()?);
            } else {
                print_classification(&output_ctx, &classification, collection.as_deref());
            }
        }

        Commands::Rules { config, json } => {
            let output_ctx = OutputContext::new(quiet, json);
            let raw = load_config(&config)?;
            let set = match CompiledSet::compile(&raw) {
                Ok(set) => set,
                Err(errors) => report_config_errors(&errors, json, "rules"),
            };

            if json {
                let rules: Vec<serde_json::Value> = set
                    .rules()
                    .iter()
                    .map(|rule| {
                        serde_json::json!({
                            "rule": rule.id.clone(),
                            "name": rule.name.clone(),
                            "resolution": rule.resolution.clone(),
                            "type": rule.kind,
                            "filters": rule.filter_count(),
                        })
                    })
                    .collect();
                let data = serde_json::json!({ "count": rules.len(), "rules": rules });
                println!("{}", JsonOutput::success(data, "rules").to_json_string()?);
            } else {
                let _ = output_ctx.print_info(format!("{} rule(s):", set.rules().len()));
                for rule in set.rules() {
                    let kind = match rule.kind {
                        Some(kind) => format!("{:?}", kind),
                        None => "any".to_string(),
                    };
                    println!(
                        "  {} | {} | {} | {} filter(s)",
                        rule.id,
                        rule.name,
                        kind,
                        rule.filter_count()
                    );
                }
            }
        }

        Commands::Schema { target } => {
            let target = SchemaTarget::parse(&target).ok_or_else(|| {
                anyhow!(
                    "invalid schema target '{}' (expected config, snapshot, or result)",
                    target
                )
            })?;
            println!("{}", serde_json::to_string_pretty(&triage::schema::generate(target))?);
        }
    }

    Ok(())
}

/// Print every configuration error and exit with the validation code.
fn report_config_errors(errors: &ConfigErrors, json: bool, command: &str) -> ! {
    if json {
        let details: Vec<String> = errors.errors().iter().map(|e| e.to_string()).collect();
        let error = JsonError::new(
            "CONFIG_INVALID",
            format!("{} configuration error(s)", errors.len()),
            command,
        )
        .with_details(serde_json::json!(details));
        if let Ok(text) = error.to_json_string() {
            println!("{}", text);
        }
    } else {
        eprint!("{}", errors);
    }
    std::process::exit(ExitCode::ValidationFailed.code());
}

/// Parse the --at flag; defaults to the current time.
fn parse_evaluation_time(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| anyhow!("invalid --at timestamp '{}': {}", text, e)),
        None => Ok(Utc::now()),
    }
}

/// Human-readable classification report.
fn print_classification(
    output_ctx: &OutputContext,
    classification: &Classification<'_>,
    only: Option<&str>,
) {
    for result in &classification.collections {
        if let Some(id) = only {
            if result.id != id {
                continue;
            }
        }

        let mode = match result.display {
            triage::DisplayMode::List => "list",
            triage::DisplayMode::Kanban => "kanban",
        };
        let _ = output_ctx.print_info(format!("== {} ({}) [{}] ==", result.name, result.id, mode));

        for rule in &result.rules {
            let hidden = if rule.overflow > 0 {
                format!(", {} hidden", rule.overflow)
            } else {
                String::new()
            };
            println!("{} | {} match(es){}", rule.name, rule.total, hidden);
            for item in &rule.visible {
                println!("  {} | {}", item.id, item.title);
            }
        }
        println!();
    }
}
