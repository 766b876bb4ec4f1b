//! Daemon mode – newline-delimited JSON requests over a Unix socket.
//!
//! Each connection gets its own task; all of them share one engine, so
//! concurrent conversions hit the same rate cache.

use anyhow::Context;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use unitconv_engine::types::*;
use unitconv_engine::{CommandRegistry, ConversionEngine};

pub async fn run_daemon(
    socket_path: PathBuf,
    engine: Arc<ConversionEngine>,
    registry: Arc<CommandRegistry>,
) -> anyhow::Result<()> {
    // Remove stale socket if it exists
    let _ = std::fs::remove_file(&socket_path);

    let listener = UnixListener::bind(&socket_path)
        .with_context(|| format!("cannot bind socket {}", socket_path.display()))?;

    tracing::info!(socket = %socket_path.display(), "daemon listening");
    eprintln!("unitconv daemon listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let engine = Arc::clone(&engine);
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    let (reader, writer) = stream.into_split();
                    serve_connection(reader, writer, &engine, &registry).await;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
            }
        }
    }
}

/// Answer requests line by line until the peer hangs up.
async fn serve_connection<R, W>(
    reader: R,
    mut writer: W,
    engine: &ConversionEngine,
    registry: &CommandRegistry,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_request(&line, engine, registry).await;
        let mut resp_json = serde_json::to_string(&response).unwrap_or_else(|_| "{}".into());
        resp_json.push('\n');
        if writer.write_all(resp_json.as_bytes()).await.is_err() {
            break;
        }
    }
}

fn error_response(id: String, message: String) -> DaemonResponse {
    DaemonResponse {
        id,
        result: None,
        error: Some(ErrorInfo {
            code: ErrorCode::InvalidInput,
            message,
            details: Value::Null,
        }),
    }
}

async fn handle_request(
    line: &str,
    engine: &ConversionEngine,
    registry: &CommandRegistry,
) -> DaemonResponse {
    let req: DaemonRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => return error_response("unknown".into(), format!("invalid JSON request: {}", e)),
    };

    let result = match req.method.as_str() {
        "call" => {
            let Some(cmd_name) = req.params.get("cmd").and_then(|v| v.as_str()) else {
                return error_response(req.id, "missing 'cmd' string param".into());
            };
            let args = req
                .params
                .get("args")
                .cloned()
                .unwrap_or_else(|| json!({}));
            let r = registry.execute(cmd_name, args, engine).await;
            serde_json::to_value(r)
        }
        "list" => Ok(json!({ "commands": registry.list() })),
        other => return error_response(req.id, format!("unknown method: {}", other)),
    };

    match result {
        Ok(result) => DaemonResponse {
            id: req.id,
            result: Some(result),
            error: None,
        },
        Err(e) => DaemonResponse {
            id: req.id,
            result: None,
            error: Some(ErrorInfo {
                code: ErrorCode::InternalError,
                message: e.to_string(),
                details: Value::Null,
            }),
        },
    }
}
