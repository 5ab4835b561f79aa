use clap::Subcommand;
use serde_json::Value;

use crate::cli::utils::connected_client;
use crate::cli::{CliContext, OutputFormat};

#[derive(Subcommand)]
pub enum AssetCommands {
    #[command(about = "List the asset library, grouped by category")]
    List,
}

pub async fn handle(cmd: AssetCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        AssetCommands::List => {
            let (client, _) = connected_client(ctx).await?;
            let library = client.library().await?;

            match ctx.output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&library)?);
                }
                OutputFormat::Text => print_library(&library),
            }
            Ok(())
        }
    }
}

fn print_library(library: &Value) {
    let shelves = library.as_array().map(Vec::as_slice).unwrap_or_default();
    if shelves.is_empty() {
        println!("The library is empty.");
        return;
    }
    for shelf in shelves {
        let title = shelf.get("title").and_then(Value::as_str).unwrap_or("?");
        println!("{}", title);
        let assets = shelf
            .get("assets")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for asset in assets {
            println!(
                "  {}  {}  ({} bytes)",
                asset.get("id").and_then(Value::as_str).unwrap_or("?"),
                asset.get("label").and_then(Value::as_str).unwrap_or("?"),
                asset.get("size_bytes").and_then(Value::as_i64).unwrap_or(0),
            );
        }
    }
}
