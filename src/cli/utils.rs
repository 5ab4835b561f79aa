use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::cli::{session_file, CliContext, OutputFormat};
use crate::client::PortalClient;
use crate::session::AuthGate;

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

/// Output a success message in the appropriate format
pub fn output_success(ctx: &CliContext, message: &str, data: Option<Value>) -> Result<()> {
    match ctx.output {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message,
            });
            if let Some(data_value) = data {
                response["data"] = data_value;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Resolve the server URL: flag, then env, then the saved session.
pub fn resolve_server(ctx: &CliContext, saved: Option<&session_file::SessionFile>) -> String {
    ctx.server
        .clone()
        .or_else(|| std::env::var("HUB_SERVER_URL").ok())
        .or_else(|| saved.map(|s| s.server.clone()))
        .unwrap_or_else(|| DEFAULT_SERVER.to_string())
}

/// Build a portal client, pre-loading the saved token if one exists.
pub async fn connected_client(
    ctx: &CliContext,
) -> Result<(Arc<PortalClient>, Option<session_file::SessionFile>)> {
    let saved = session_file::load()?;
    let server = resolve_server(ctx, saved.as_ref());

    let gate = Arc::new(AuthGate::new());
    let client = Arc::new(PortalClient::new(&server, gate)?);
    if let Some(session) = &saved {
        client.set_token(Some(session.token.clone())).await;
    }

    Ok((client, saved))
}

/// Read a password from the terminal when it was not passed as a flag.
pub fn prompt_password(prompt: &str) -> Result<String> {
    print!("{}: ", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
