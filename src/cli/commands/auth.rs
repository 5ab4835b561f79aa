use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connected_client, output_success, prompt_password, resolve_server};
use crate::cli::{session_file, CliContext, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the portal")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and discard the saved session")]
    Logout,

    #[command(about = "Show the saved session status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password("Password")?,
            };

            let (client, saved) = connected_client(ctx).await?;
            let outcome = client.login(&email, &password).await?;

            let server = resolve_server(ctx, saved.as_ref());
            session_file::save(&session_file::SessionFile::new(
                server,
                outcome.user.email.clone(),
                outcome.token.clone(),
            ))?;

            output_success(
                ctx,
                &format!("Signed in as {} ({})", outcome.user.email, outcome.user.role),
                Some(json!({ "user": outcome.user, "profile": outcome.profile })),
            )
        }
        AuthCommands::Logout => {
            let (client, _) = connected_client(ctx).await?;
            client.logout().await;
            session_file::delete()?;
            output_success(ctx, "Signed out", None)
        }
        AuthCommands::Status => match session_file::load()? {
            Some(session) => output_success(
                ctx,
                &format!("Session for {} on {}", session.email, session.server),
                Some(json!({
                    "email": session.email,
                    "server": session.server,
                    "saved_at": session.saved_at,
                })),
            ),
            None => {
                anyhow::bail!("Not signed in. Run `hub auth login <email>` first.")
            }
        },
        AuthCommands::Whoami => {
            let (client, _) = connected_client(ctx).await?;
            let authenticated = client.bootstrap().await?;
            if !authenticated {
                anyhow::bail!("Session is no longer valid. Run `hub auth login <email>`.")
            }
            let session = client
                .gate()
                .current()
                .await
                .ok_or_else(|| anyhow::anyhow!("no active session"))?;

            match ctx.output {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "user": session.user,
                            "profile": session.profile,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("{} ({})", session.user.email, session.user.role);
                    if !session.profile.full_name.is_empty() {
                        println!("  name:    {}", session.profile.full_name);
                    }
                    if let Some(company) = &session.profile.company {
                        println!("  company: {}", company);
                    }
                }
            }
            Ok(())
        }
    }
}
