use std::time::Duration;

use clap::Subcommand;

use crate::cli::utils::connected_client;
use crate::cli::CliContext;
use crate::session::{ActivityState, RefreshCoordinator, RefreshOutcome};

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Keep the session fresh, treating each tick as a focus event")]
    Watch {
        #[arg(long, default_value_t = 60, help = "Seconds between ticks")]
        interval: u64,
    },
}

pub async fn handle(cmd: SessionCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        SessionCommands::Watch { interval } => watch(interval, ctx).await,
    }
}

/// Poll-driven stand-in for browser focus events: every tick is handed to
/// the refresh coordinator, which applies its own guards and throttle.
async fn watch(interval: u64, ctx: &CliContext) -> anyhow::Result<()> {
    let (client, _) = connected_client(ctx).await?;

    if !client.bootstrap().await? {
        anyhow::bail!("Not signed in. Run `hub auth login <email>` first.");
    }

    let gate = client.gate();
    let coordinator = RefreshCoordinator::new(client.clone(), client.clone());
    let mut versions = coordinator.subscribe();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));

    println!("Watching session (every {}s, ctrl-c to stop)", interval.max(1));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = coordinator
                    .on_focus(&gate, ActivityState::foreground())
                    .await;
                if let RefreshOutcome::Aborted(reason) = outcome {
                    eprintln!("refresh aborted ({:?}), session kept", reason);
                }
            }
            changed = versions.changed() => {
                if changed.is_err() {
                    break;
                }
                println!(
                    "data version {} - dependent views should re-fetch",
                    *versions.borrow_and_update()
                );
            }
        }

        if let Some(notice) = gate.active_notice().await {
            eprintln!("! {}", notice.message);
            break;
        }
    }

    Ok(())
}
