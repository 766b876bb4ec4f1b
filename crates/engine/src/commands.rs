//! Command registry and the built-in conversion commands.
//!
//! Commands are registered by name and invoked with JSON input/output, so the
//! CLI, the socket daemon and scenario files all share one surface.

use crate::convert::{format_result, parse_value, RawValue};
use crate::engine::ConversionEngine;
use crate::error::{ConversionError, ConversionErrorKind};
use crate::rates::RateKind;
use crate::types::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

pub type CommandFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, CommandError>> + Send + 'a>>;

/// Signature for all engine commands.
pub type CommandHandler = for<'a> fn(Value, &'a ConversionEngine) -> CommandFuture<'a>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("{0}")]
    Other(String),
}

impl CommandError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CommandError::InvalidInput(_) => ErrorCode::InvalidInput,
            CommandError::Conversion(e) => match e.kind() {
                ConversionErrorKind::InvalidValue => ErrorCode::InvalidValue,
                ConversionErrorKind::UnknownCategory => ErrorCode::UnknownCategory,
                ConversionErrorKind::UnknownUnit => ErrorCode::UnknownUnit,
            },
            CommandError::Other(_) => ErrorCode::InternalError,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct CommandRegistry {
    handlers: HashMap<String, CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut reg = Self {
            handlers: HashMap::new(),
        };
        reg.register("categories", cmd_categories);
        reg.register("units", cmd_units);
        reg.register("convert", cmd_convert);
        reg.register("find_category", cmd_find_category);
        reg.register("rates", cmd_rates);
        reg
    }

    pub fn register(&mut self, name: &str, handler: CommandHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Execute a command by name and return a full CommandResult.
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        engine: &ConversionEngine,
    ) -> CommandResult {
        let run_id = new_run_id();
        let start = Instant::now();

        let handler = match self.handlers.get(name) {
            Some(h) => h,
            None => {
                return result_err(
                    "call",
                    name,
                    &run_id,
                    elapsed_ms(start),
                    ErrorCode::InvalidInput,
                    format!("unknown command: {}", name),
                );
            }
        };

        match handler(args, engine).await {
            Ok(data) => {
                let mut r = result_ok("call", name, &run_id, elapsed_ms(start));
                r.data = Some(data);
                r
            }
            Err(e) => {
                tracing::debug!(command = name, error = %e, "command failed");
                result_err("call", name, &run_id, elapsed_ms(start), e.error_code(), e.to_string())
            }
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, CommandError> {
    // `call foo` without --args arrives as null.
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| CommandError::InvalidInput(e.to_string()))
}

fn to_data<T: serde::Serialize>(value: &T) -> Result<Value, CommandError> {
    serde_json::to_value(value).map_err(|e| CommandError::Other(e.to_string()))
}

// ===========================================================================
// Built-in commands
// ===========================================================================

/// `categories` – every category in catalog order.
///
/// Returns: `{ "categories": [{ "key", "display_name", "icon" }, ...] }`
fn cmd_categories(_args: Value, engine: &ConversionEngine) -> CommandFuture<'_> {
    Box::pin(async move { Ok(json!({ "categories": to_data(&engine.categories())? })) })
}

#[derive(Deserialize)]
struct UnitsArgs {
    category: String,
}

/// `units` – unit definitions of one category.
///
/// Args: `{ "category": "length" }`
fn cmd_units(args: Value, engine: &ConversionEngine) -> CommandFuture<'_> {
    Box::pin(async move {
        let args: UnitsArgs = parse_args(args)?;
        let units = engine.units(&args.category)?;
        Ok(json!({ "category": args.category, "units": to_data(&units)? }))
    })
}

#[derive(Deserialize)]
struct ConvertArgs {
    value: RawValue,
    from: String,
    to: String,
    #[serde(default)]
    category: Option<String>,
}

/// `convert` – run one conversion. Without `category`, the first category
/// holding both units is used.
///
/// Args: `{ "value": 1, "from": "kilometers", "to": "meters", "category"?: "length" }`
/// Returns: `{ "input": 1.0, "value": 1000.0, "formatted": "1000.000000", "from", "to", "category" }`
fn cmd_convert(args: Value, engine: &ConversionEngine) -> CommandFuture<'_> {
    Box::pin(async move {
        let args: ConvertArgs = parse_args(args)?;
        let value = parse_value(&args.value)?;

        let category = match args.category {
            Some(c) => c,
            None => engine
                .find_category(&args.from, &args.to)
                .map(|c| c.key.clone())
                .ok_or_else(|| {
                    CommandError::InvalidInput(format!(
                        "no category contains both '{}' and '{}'",
                        args.from, args.to
                    ))
                })?,
        };

        let result = engine.convert(value, &args.from, &args.to, &category).await?;
        Ok(json!({
            "input": value,
            "value": result,
            "formatted": format_result(result),
            "from": args.from,
            "to": args.to,
            "category": category,
        }))
    })
}

#[derive(Deserialize)]
struct FindCategoryArgs {
    from: String,
    to: String,
}

/// `find_category` – `{ "category": "volume" }`, or `null` when no category
/// holds both units.
fn cmd_find_category(args: Value, engine: &ConversionEngine) -> CommandFuture<'_> {
    Box::pin(async move {
        let args: FindCategoryArgs = parse_args(args)?;
        let key = engine.find_category(&args.from, &args.to).map(|c| c.key.clone());
        Ok(json!({ "category": key }))
    })
}

#[derive(Deserialize)]
struct RatesArgs {
    kind: String,
}

/// `rates` – the table a conversion would use right now.
///
/// Args: `{ "kind": "currency" | "crypto" }`
fn cmd_rates(args: Value, engine: &ConversionEngine) -> CommandFuture<'_> {
    Box::pin(async move {
        let args: RatesArgs = parse_args(args)?;
        let kind: RateKind = args.kind.parse().map_err(CommandError::InvalidInput)?;
        let table = engine.rates(kind).await;
        to_data(table.as_ref())
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{engine_with, offline_engine};
    use crate::rates::testing::{FakeTransport, CURRENCY_BODY};

    #[tokio::test]
    async fn test_unknown_command() {
        let engine = offline_engine();
        let reg = CommandRegistry::new();
        let result = reg.execute("nonexistent", json!({}), &engine).await;
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.error.unwrap().code, ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_convert_with_category() {
        let engine = offline_engine();
        let reg = CommandRegistry::new();
        let r = reg
            .execute(
                "convert",
                json!({ "value": 1, "from": "kilometers", "to": "meters", "category": "length" }),
                &engine,
            )
            .await;
        assert_eq!(r.status, Status::Pass);
        let data = r.data.unwrap();
        assert_eq!(data["value"], 1000.0);
        assert_eq!(data["formatted"], "1000.000000");
    }

    #[tokio::test]
    async fn test_convert_infers_category() {
        let engine = offline_engine();
        let reg = CommandRegistry::new();
        let r = reg
            .execute("convert", json!({ "value": "2", "from": "cups", "to": "milliliters" }), &engine)
            .await;
        assert_eq!(r.status, Status::Pass);
        assert_eq!(r.data.unwrap()["category"], "volume");

        let r = reg
            .execute("convert", json!({ "value": 1, "from": "meters", "to": "grams" }), &engine)
            .await;
        assert_eq!(r.error.unwrap().code, ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_conversion_errors_map_to_codes() {
        let engine = offline_engine();
        let reg = CommandRegistry::new();

        let cases = [
            (json!({ "value": "abc", "from": "meters", "to": "feet", "category": "length" }), ErrorCode::InvalidValue),
            (json!({ "value": 1, "from": "meters", "to": "feet", "category": "nope" }), ErrorCode::UnknownCategory),
            (json!({ "value": 1, "from": "doesnotexist", "to": "feet", "category": "length" }), ErrorCode::UnknownUnit),
            (json!({ "from": "meters", "to": "feet" }), ErrorCode::InvalidInput),
        ];
        for (args, code) in cases {
            let r = reg.execute("convert", args.clone(), &engine).await;
            assert_eq!(r.status, Status::Error, "{}", args);
            assert_eq!(r.error.unwrap().code, code, "{}", args);
        }
    }

    #[tokio::test]
    async fn test_units_and_categories() {
        let engine = offline_engine();
        let reg = CommandRegistry::new();

        let r = reg.execute("categories", Value::Null, &engine).await;
        let cats = r.data.unwrap()["categories"].as_array().unwrap().len();
        assert_eq!(cats, 19);

        let r = reg.execute("units", json!({ "category": "temperature" }), &engine).await;
        let units = r.data.unwrap()["units"].as_array().unwrap().clone();
        assert_eq!(units.len(), 4);
        assert_eq!(units[0]["key"], "celsius");

        let r = reg.execute("units", json!({ "category": "nope" }), &engine).await;
        assert_eq!(r.error.unwrap().code, ErrorCode::UnknownCategory);
    }

    #[tokio::test]
    async fn test_find_category() {
        let engine = offline_engine();
        let reg = CommandRegistry::new();
        let r = reg
            .execute("find_category", json!({ "from": "cups_flour", "to": "grams" }), &engine)
            .await;
        assert_eq!(r.data.unwrap()["category"], "cooking_weight");

        let r = reg
            .execute("find_category", json!({ "from": "meters", "to": "grams" }), &engine)
            .await;
        assert!(r.data.unwrap()["category"].is_null());
    }

    #[tokio::test]
    async fn test_rates_command() {
        let transport = FakeTransport::replying(200, CURRENCY_BODY);
        let engine = engine_with(&transport);
        let reg = CommandRegistry::new();

        let r = reg.execute("rates", json!({ "kind": "currency" }), &engine).await;
        let data = r.data.unwrap();
        assert_eq!(data["source"], "live");
        assert_eq!(data["values"]["EUR"], 0.5);

        let r = reg.execute("rates", json!({ "kind": "gold" }), &engine).await;
        assert_eq!(r.error.unwrap().code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_list_commands() {
        let reg = CommandRegistry::new();
        assert_eq!(
            reg.list(),
            vec!["categories", "convert", "find_category", "rates", "units"]
        );
    }
}
