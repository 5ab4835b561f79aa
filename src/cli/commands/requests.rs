use clap::Subcommand;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::cli::utils::{connected_client, output_success};
use crate::cli::{CliContext, OutputFormat};
use crate::database::models::request::DesignRequest;

#[derive(Subcommand)]
pub enum RequestCommands {
    #[command(about = "Submit a creative-request brief")]
    Submit {
        #[arg(help = "Request kind: brand, website, or product")]
        kind: String,
        #[arg(help = "Short title for the brief")]
        title: String,
        #[arg(long, default_value = "", help = "Longer description")]
        description: String,
        #[arg(long, help = "Structured brief fields as a JSON object")]
        details: Option<String>,
    },

    #[command(about = "List requests visible to the signed-in user")]
    List,

    #[command(about = "Move a request to another board column (admin)")]
    SetStatus {
        #[arg(help = "Request id")]
        id: Uuid,
        #[arg(help = "Target status: new, in_progress, review, or done")]
        status: String,
    },
}

pub async fn handle(cmd: RequestCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        RequestCommands::Submit { kind, title, description, details } => {
            let details: Value = match details {
                Some(raw) => serde_json::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("--details is not valid JSON: {}", e))?,
                None => json!({}),
            };

            let (client, _) = connected_client(ctx).await?;
            let request = client
                .submit_request(&kind, &title, &description, details)
                .await?;

            output_success(
                ctx,
                &format!("Request {} submitted", request.id),
                Some(serde_json::to_value(&request)?),
            )
        }
        RequestCommands::List => {
            let (client, _) = connected_client(ctx).await?;
            let requests = client.list_requests().await?;

            match ctx.output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&requests)?);
                }
                OutputFormat::Text => {
                    if requests.is_empty() {
                        println!("No requests.");
                    }
                    for request in &requests {
                        print_request_line(request);
                    }
                }
            }
            Ok(())
        }
        RequestCommands::SetStatus { id, status } => {
            let (client, _) = connected_client(ctx).await?;
            let request = client.set_request_status(id, &status).await?;
            output_success(
                ctx,
                &format!("Request {} is now {}", request.id, request.status),
                Some(serde_json::to_value(&request)?),
            )
        }
    }
}

fn print_request_line(request: &DesignRequest) {
    println!(
        "{}  [{:<11}]  {:<8}  {}",
        request.id, request.status, request.kind, request.title
    );
}
