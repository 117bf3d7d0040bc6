use std::sync::Arc;
use std::time::Duration;

use amsterdam_client::models::Operation;
use amsterdam_client::{AmsterdamClient, ClientConfig};
use clap::{Parser, Subcommand};
use credential_store::{CredentialStore, FileCredentialStore};
use session_manager::{RegisterOutcome, RegisterProfile, SessionManager, SessionState};

#[derive(Parser)]
#[command(name = "amsterdam")]
#[command(about = "CLI for the Amsterdam website API")]
#[command(version)]
struct Cli {
    /// Base URL of the API, including the /api prefix
    #[arg(long, env = "API_BASE_URL")]
    api_base: Option<String>,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        email: String,
        password: String,
    },
    /// Register a new account
    Register {
        email: String,
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "25")]
        age: u32,
    },
    /// Verify a registered email with the code from the verification mail
    Verify {
        user_id: i64,
        code: String,
    },
    /// Log out and drop the stored token
    Logout,
    /// Show the current user's profile
    Profile,
    /// Run a calculation, e.g. `amsterdam calc 5 + 3`
    Calc {
        num1: f64,
        operation: Operation,
        num2: f64,
    },
    /// Show the calculation history with statistics
    History,
    /// Show Amsterdam history facts
    Facts,
    /// Show canal water life content
    Water,
    /// Show admin statistics (admin account required)
    Stats,
    /// Start a Google OAuth login in the browser and wait for the token
    Google,
    /// Check whether the API is up
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = ClientConfig::new();
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }

    let data_dir = dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("amsterdam-client");
    let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(&data_dir));
    let client = Arc::new(AmsterdamClient::new(&config, Arc::clone(&store), None)?);
    let manager = SessionManager::new(Arc::clone(&client), store, None);

    match cli.command {
        Commands::Login { email, password } => {
            let user = manager.login(&email, &password).await?;
            println!("Logged in as {} (id {})", user.email, user.id);
        }
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
            age,
        } => {
            let outcome = manager
                .register(RegisterProfile {
                    email,
                    password,
                    first_name,
                    last_name,
                    age,
                })
                .await?;
            match outcome {
                RegisterOutcome::LoggedIn(user) => {
                    println!("Registered and logged in as {} (id {})", user.email, user.id);
                }
                RegisterOutcome::VerificationRequired { user_id } => {
                    println!("Registered, verification required.");
                    println!("Run `amsterdam verify {user_id} <code>` with the emailed code.");
                }
            }
        }
        Commands::Verify { user_id, code } => {
            let user = manager.verify_email(user_id, &code).await?;
            println!("Email verified, logged in as {}", user.email);
        }
        Commands::Logout => {
            manager.logout().await;
            println!("Logged out.");
        }
        Commands::Profile => {
            if let SessionState::Authenticated(user) = manager.restore().await {
                println!("{} {} <{}>", user.first_name, user.last_name, user.email);
                if let Some(age) = user.user_age {
                    println!("  age: {age}");
                }
                println!("  admin: {}", user.is_admin);
                println!("  email verified: {}", user.email_verified);
            } else {
                println!("Not logged in.");
            }
        }
        Commands::Calc {
            num1,
            operation,
            num2,
        } => {
            let calculation = client.calculate(num1, num2, operation).await?;
            println!("{}", calculation.expression);
        }
        Commands::History => {
            let history = client.calculation_history().await?;
            for record in &history.calculations {
                println!("{}  ({})", record.expression, record.timestamp);
            }
            println!("Total: {}", history.statistics.total);
            for (operation, count) in &history.statistics.operations {
                println!("  {operation}: {count}");
            }
        }
        Commands::Facts => {
            let content = client.history_content().await?;
            for fact in &content.facts {
                println!("{}", fact.title);
                println!("  {}", fact.content);
            }
        }
        Commands::Water => {
            let content = client.water_content().await?;
            println!("{}", content.intro);
            println!();
            for species in &content.fish_species {
                println!("{}: {}", species.name, species.description);
            }
            println!();
            for fact in &content.ecosystem_facts {
                println!("- {fact}");
            }
        }
        Commands::Stats => {
            let stats = client.admin_stats().await?;
            println!("Users: {} ({} verified, {} via Google)",
                stats.total_users, stats.verified_users, stats.google_users);
            println!("Calculations: {}", stats.total_calculations);
        }
        Commands::Google => {
            let url = client.google_auth_url();
            println!("Opening {url} ...");
            webbrowser::open(&url)?;
            println!("Waiting for the login to land in the local credential store...");
            let user = manager
                .complete_oauth_login_within(Duration::from_secs(120))
                .await?;
            println!("Logged in as {} (id {})", user.email, user.id);
        }
        Commands::Health => {
            let health = client.health().await?;
            println!("{}: {}", health.status, health.message);
        }
    }

    Ok(())
}
