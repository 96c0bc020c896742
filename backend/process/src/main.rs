use anyhow::Result;
use bank::{Backend, remote::RemoteBank};
use chrono::Utc;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "BACKEND_URL")]
    backend_url: String,

    #[arg(long, env = "BACKEND_ANON_KEY", hide_env_values = true)]
    anon_key: String,

    #[arg(long, env = "ADMIN_EMAIL")]
    email: String,

    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert default membership plans that are missing from the catalog
    SeedPlans,

    /// Print every associate with their latest plan
    Associates {
        /// Only associates that are switched on
        #[arg(long)]
        active: bool,
    },

    /// Mark active subscriptions past their end date as expired
    Expire,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let backend = RemoteBank::new(&args.backend_url, &args.anon_key)?;
    let token = process::sign_in(&backend, &args.email, &args.password).await?;

    let outcome = match args.command {
        Command::SeedPlans => process::seed_plans(&backend, &token).await.map(drop),
        Command::Associates { active } => process::list_associates(&backend, &token, active)
            .await
            .map(|table| println!("{table}")),
        Command::Expire => process::expire(&backend, &token, Utc::now()).await.map(drop),
    };

    if let Err(e) = backend.sign_out(&token).await {
        eprintln!("Failed to sign out: {e}");
    }

    outcome
}
