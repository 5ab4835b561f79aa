use clap::Subcommand;
use serde_json::Value;

use crate::cli::utils::connected_client;
use crate::cli::{CliContext, OutputFormat};

#[derive(Subcommand)]
pub enum ClientCommands {
    #[command(about = "List clients with request/asset counts (admin)")]
    List,
}

pub async fn handle(cmd: ClientCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        ClientCommands::List => {
            let (client, _) = connected_client(ctx).await?;
            let clients = client.list_clients().await?;

            match ctx.output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&clients)?);
                }
                OutputFormat::Text => {
                    let rows = clients.as_array().map(Vec::as_slice).unwrap_or_default();
                    if rows.is_empty() {
                        println!("No clients.");
                    }
                    for row in rows {
                        println!(
                            "{}  {:<30}  requests: {:<3}  assets: {}",
                            row.get("id").and_then(Value::as_str).unwrap_or("?"),
                            row.get("email").and_then(Value::as_str).unwrap_or("?"),
                            row.get("request_count").and_then(Value::as_i64).unwrap_or(0),
                            row.get("asset_count").and_then(Value::as_i64).unwrap_or(0),
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
