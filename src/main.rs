use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rex_claims::{
    config::Config,
    domain::{Answers, ClaimStatus},
    persistence::JsonStore,
    relay::HttpCallRelay,
    store::{CallOutcome, Credentials, DomainStore, SignUpInput},
};

/// Rex claims workspace CLI.
#[derive(Parser, Debug)]
#[command(name = "rex-claims", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign in with an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Clear the current session
    Logout,

    /// Create a policy from a JSON answer bag
    CreatePolicy {
        /// Wizard answers as a JSON object, e.g. '{"coverageLimit":"75000"}'
        #[arg(long, default_value = "{}")]
        answers: String,
    },

    /// File a claim from a JSON answer bag
    FileClaim {
        /// Wizard answers as a JSON object, e.g. '{"damageEstimate":1000}'
        #[arg(long, default_value = "{}")]
        answers: String,
    },

    /// Update a claim's status
    UpdateClaim {
        claim_id: String,
        /// New status, e.g. "Approved", "Paid", "Needs info"
        status: String,
        /// Approved payout; falls back to the estimated payout
        #[arg(long)]
        payout: Option<f64>,
    },

    /// List the current user's claims
    Claims,

    /// List the current user's policies
    Policies,

    /// Show dashboard metrics for the current user
    Metrics,

    /// Request a callback (recorded locally, relayed best-effort)
    RequestCall {
        #[arg(long)]
        phone: String,
        #[arg(long)]
        topic: String,
    },

    /// Inspect the remote call-request queue
    RemoteQueue,

    /// Probe the call-intake service's health endpoint
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let persistence = match JsonStore::new(&config.store.path) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to prepare store file");
            return Err(e.into());
        }
    };

    let relay = match HttpCallRelay::new(&config.relay, &config.request) {
        Ok(r) => {
            info!(base_url = %config.relay.base_url, "Relay client initialized");
            Arc::new(r)
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize relay client");
            return Err(e.into());
        }
    };

    let mut store = DomainStore::open(persistence, relay.clone());

    match cli.command {
        Commands::Signup {
            name,
            email,
            password,
        } => {
            let user = store.sign_up(SignUpInput {
                full_name: name,
                email,
                password,
            })?;
            println!("Signed up and logged in as {} <{}>", user.full_name, user.email);
        }

        Commands::Login { email, password } => {
            let user = store.login(Credentials { email, password })?;
            println!("Logged in as {} <{}>", user.full_name, user.email);
        }

        Commands::Logout => {
            store.logout();
            println!("Logged out.");
        }

        Commands::CreatePolicy { answers } => {
            let policy = store.create_policy(parse_answers(&answers)?)?;
            println!(
                "Created policy {} ({}) with limit ${:.0} / deductible ${:.0}",
                policy.policy_number, policy.status, policy.coverage_limit, policy.deductible
            );
        }

        Commands::FileClaim { answers } => {
            let claim = store.create_claim(parse_answers(&answers)?)?;
            println!(
                "Filed claim {} ({}) - estimated payout ${:.0}",
                claim.claim_number, claim.status, claim.estimated_payout
            );
        }

        Commands::UpdateClaim {
            claim_id,
            status,
            payout,
        } => {
            let status: ClaimStatus = status
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let claim =
                store.update_claim_status(&claim_id, status, payout.map(|p| p.into()))?;
            println!(
                "Claim {} is now {} (approved payout ${:.0})",
                claim.claim_number, claim.status, claim.approved_payout
            );
        }

        Commands::Claims => {
            let claims = store.user_claims();
            if claims.is_empty() {
                println!("No claims.");
            }
            for claim in claims {
                println!(
                    "{}  {}  {}  est ${:.0}  approved ${:.0}",
                    claim.claim_number, claim.status, claim.incident_type,
                    claim.estimated_payout, claim.approved_payout
                );
            }
        }

        Commands::Policies => {
            let policies = store.user_policies();
            if policies.is_empty() {
                println!("No policies.");
            }
            for policy in policies {
                println!(
                    "{}  {}  limit ${:.0}  premium ${:.0}/mo",
                    policy.policy_number, policy.status, policy.coverage_limit,
                    policy.monthly_premium
                );
            }
        }

        Commands::Metrics => {
            let metrics = store.metrics();
            println!("Workflow accuracy:      {}%", metrics.workflow_accuracy);
            println!("Open claims exposure:   ${:.0}", metrics.open_claims_exposure);
            println!("Closed claims recovered: ${:.0}", metrics.closed_claims_recovered);
        }

        Commands::RequestCall { phone, topic } => {
            match store.create_call_request(phone, topic).await? {
                CallOutcome::SubmittedRemotely(call) => {
                    println!(
                        "Call request {} submitted (remote id {})",
                        call.id,
                        call.remote_request_id.as_deref().unwrap_or("-")
                    );
                }
                CallOutcome::QueuedLocally(call) => {
                    println!(
                        "Call request {} queued locally; the intake service was unreachable",
                        call.id
                    );
                }
            }
        }

        Commands::RemoteQueue => {
            let items = relay.list_call_requests().await?;
            if items.is_empty() {
                println!("Remote queue is empty.");
            }
            for item in items {
                println!(
                    "{}  {}  {}  {}",
                    item.request_id,
                    item.status,
                    item.topic.as_deref().unwrap_or("-"),
                    item.created_at
                );
            }
        }

        Commands::Health => {
            let health = relay.health().await?;
            println!(
                "{}: {}",
                health.service,
                if health.ok { "ok" } else { "not ok" }
            );
        }
    }

    Ok(())
}

fn parse_answers(raw: &str) -> anyhow::Result<Answers> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    value
        .as_object()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("answers must be a JSON object"))
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        rex_claims::config::LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        rex_claims::config::LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
