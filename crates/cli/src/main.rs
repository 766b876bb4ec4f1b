//! `unitconv` – command-line front end for the conversion engine.
//!
//! Every subcommand goes through the engine's command registry, so the
//! output envelope is the same whether a conversion comes from here, a
//! scenario file, or the socket daemon.

mod config;
mod logging;
mod serve;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use unitconv_engine::types::*;
use unitconv_engine::{CommandRegistry, ConversionEngine};

// ===========================================================================
// CLI definition
// ===========================================================================

#[derive(Parser)]
#[command(
    name = "unitconv",
    version,
    about = "Convert units, currencies and crypto from the command line"
)]
struct Cli {
    /// Config file (default: ./global_config.yaml, then the shipped one).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Never touch the network; rate categories use the bundled snapshot.
    #[arg(long, global = true)]
    offline: bool,

    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List categories in catalog order.
    Categories,

    /// List the units of one category.
    Units {
        /// Category key (e.g. "length").
        category: String,
    },

    /// Convert a value between two units.
    Convert {
        /// Value to convert.
        #[arg(allow_negative_numbers = true)]
        value: String,
        /// Source unit key.
        from: String,
        /// Target unit key.
        to: String,
        /// Category key; inferred from the two units when omitted.
        #[arg(long)]
        category: Option<String>,
    },

    /// Show the rate table conversions would use right now.
    Rates {
        /// currency | crypto
        kind: String,
    },

    /// Invoke an engine command by name with JSON args.
    Call {
        /// Command name (e.g. "convert", "units", "find_category").
        cmd: String,
        /// JSON args to pass to the command.
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Run a scripted scenario from a YAML file.
    RunScenario {
        /// Path to the scenario YAML file.
        file: PathBuf,
    },

    /// Start daemon mode over a Unix socket.
    Serve {
        /// Path for the Unix domain socket.
        #[arg(long)]
        socket: PathBuf,
    },
}

// ===========================================================================
// Main
// ===========================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(status) => status.exit_code(),
        Err(e) => {
            eprintln!("error: {:#}", e);
            Status::Error.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<Status> {
    let cfg = config::load_config(cli.config.as_deref()).context("loading configuration")?;
    logging::init_logging(&cfg.logging);

    let engine = ConversionEngine::from_config(&cfg.engine, cli.offline)
        .context("building conversion engine")?;
    let registry = CommandRegistry::new();
    let json = cli.json;

    let status = match cli.command {
        Commands::Categories => {
            run_command("categories", Value::Null, json, &engine, &registry).await
        }
        Commands::Units { category } => {
            let args = json!({ "category": category });
            run_command("units", args, json, &engine, &registry).await
        }
        Commands::Convert {
            value,
            from,
            to,
            category,
        } => {
            let args = json!({ "value": value, "from": from, "to": to, "category": category });
            run_command("convert", args, json, &engine, &registry).await
        }
        Commands::Rates { kind } => {
            let args = json!({ "kind": kind });
            run_command("rates", args, json, &engine, &registry).await
        }
        Commands::Call { cmd, args } => cmd_call(&cmd, &args, json, &engine, &registry).await,
        Commands::RunScenario { file } => {
            cmd_run_scenario(&file, json, &engine, &registry).await
        }
        Commands::Serve { socket } => {
            serve::run_daemon(socket, Arc::new(engine), Arc::new(registry)).await?;
            Status::Pass
        }
    };
    Ok(status)
}

// ===========================================================================
// Subcommand implementations
// ===========================================================================

async fn run_command(
    name: &str,
    args: Value,
    json: bool,
    engine: &ConversionEngine,
    registry: &CommandRegistry,
) -> Status {
    let mut result = registry.execute(name, args, engine).await;
    result.command = name.to_string();
    output_result(&result, json)
}

async fn cmd_call(
    cmd: &str,
    args_str: &str,
    json: bool,
    engine: &ConversionEngine,
    registry: &CommandRegistry,
) -> Status {
    let args: Value = match serde_json::from_str(args_str) {
        Ok(v) => v,
        Err(e) => {
            let r = result_err(
                "call",
                cmd,
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                format!("invalid JSON args: {}", e),
            );
            return output_result(&r, json);
        }
    };

    let result = registry.execute(cmd, args, engine).await;
    output_result(&result, json)
}

async fn cmd_run_scenario(
    file: &Path,
    json: bool,
    engine: &ConversionEngine,
    registry: &CommandRegistry,
) -> Status {
    let target = file.display().to_string();
    let scenario = match std::fs::read_to_string(file) {
        Ok(yaml) => unitconv_engine::scenario::load_scenario(&yaml),
        Err(e) => Err(format!("cannot read scenario file: {}", e)),
    };
    let scenario = match scenario {
        Ok(s) => s,
        Err(msg) => {
            let r = result_err(
                "run-scenario",
                &target,
                &new_run_id(),
                0,
                ErrorCode::InvalidInput,
                msg,
            );
            return output_result(&r, json);
        }
    };

    let result = unitconv_engine::scenario::run_scenario(&scenario, engine, registry).await;

    if json {
        print_json(&result);
    } else {
        println!("Scenario: {}", result.name.as_deref().unwrap_or("<unnamed>"));
        println!("Overall: {}", status_label(result.overall_status));
        for (i, sr) in result.step_results.iter().enumerate() {
            let detail = sr
                .error
                .as_ref()
                .map(|e| format!(" – {} {}", e.code, e.message))
                .unwrap_or_default();
            println!(
                "  Step {}: {} -> {} ({}ms){}",
                i,
                sr.target,
                status_label(sr.status),
                sr.timing_ms,
                detail
            );
        }
    }
    result.overall_status
}

// ===========================================================================
// Output helpers
// ===========================================================================

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(j) => println!("{}", j),
        Err(e) => eprintln!("error: cannot serialize result: {}", e),
    }
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Pass => "PASS",
        Status::Fail => "FAIL",
        Status::Error => "ERROR",
    }
}

fn output_result(result: &CommandResult, json: bool) -> Status {
    if json {
        print_json(result);
    } else {
        print_human(result);
    }
    result.status
}

fn print_human(r: &CommandResult) {
    if let Some(ref err) = r.error {
        println!("[{}] {} {}", status_label(r.status), r.command, r.target);
        println!("  error:  {} – {}", err.code, err.message);
        return;
    }
    let Some(ref data) = r.data else {
        println!("[{}] {} {}", status_label(r.status), r.command, r.target);
        return;
    };

    match r.target.as_str() {
        "convert" => println!(
            "{} {} = {} {}  ({})",
            text(&data["input"]),
            text(&data["from"]),
            text(&data["formatted"]),
            text(&data["to"]),
            text(&data["category"]),
        ),
        "categories" => {
            for c in data["categories"].as_array().into_iter().flatten() {
                println!("{} {:<26} {}", text(&c["icon"]), text(&c["key"]), text(&c["display_name"]));
            }
        }
        "units" => {
            for u in data["units"].as_array().into_iter().flatten() {
                println!("{:<28} {}", text(&u["key"]), text(&u["display_name"]));
            }
        }
        "rates" => {
            println!(
                "{} rates ({}, fetched_at_ms={})",
                text(&data["kind"]),
                text(&data["source"]),
                data["fetched_at_ms"]
            );
            if let Some(values) = data["values"].as_object() {
                for (code, rate) in values {
                    println!("  {:<8} {}", code, rate);
                }
            }
        }
        _ => match serde_json::to_string_pretty(data) {
            Ok(s) => println!("{}", s),
            Err(_) => println!("{}", data),
        },
    }
}

/// A JSON string without quotes, anything else as JSON.
fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
