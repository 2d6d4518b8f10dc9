use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};

use aws_types::SdkConfig;
use clap::{Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use ec2rm::aws::{s3::SnapshotObject, secrets, ssm::ParameterClient, sts::RoleSessions};
use ec2rm::config::{self, EnvConfig, DEFAULT_CONFIG_PATH, DEFAULT_HOST, DEFAULT_PORT};
use ec2rm::identity::AzureAdClient;
use ec2rm::models::AppState;
use ec2rm::services::{inventory, Dispatcher, InstanceDirectory, ScheduleStore, StatusStore};
use ec2rm::{Error, Result};

#[derive(Parser)]
#[command(
    name = "ec2rm",
    author,
    version,
    about = "EC2 Restart Manager",
    long_about = r#"EC2 Restart Manager: a small dashboard that lists running EC2 instances from an
inventory snapshot in S3 and sends patch, upgrade, restart or custom commands to them through
SSM Run Command, assuming a role in each owning account.

The active section of the YAML config is chosen with the ENVIRONMENT variable (default: test).

Examples:
  1) Run the dashboard:
      ec2rm serve --config config/config.yaml
  2) Validate configuration and AWS access:
      ec2rm check-config
  3) Print the current inventory:
      ec2rm inventory
"#,
    after_help = "Use `ec2rm <subcommand> --help` to get subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value_t = String::from(DEFAULT_HOST))]
        host: String,
        /// Port to bind to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Path to the YAML configuration file
        #[arg(long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
        config: String,
        /// Path to .env file
        #[arg(long)]
        env_file: Option<String>,
        /// Path to a custom stylesheet to serve instead of the default
        #[arg(long)]
        stylesheet: Option<String>,
    },
    /// Validate configuration, the client secret and the schedule parameter
    #[command(about = "Validate configuration and AWS access.", long_about = "Load the YAML configuration for the active environment, resolve the Azure AD client secret and read the schedule parameter and inventory snapshot once.")]
    CheckConfig {
        #[arg(long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
        config: String,
        #[arg(long)]
        env_file: Option<String>,
    },
    /// Print the running instances from the inventory snapshot
    Inventory {
        #[arg(long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
        config: String,
        #[arg(long)]
        env_file: Option<String>,
    },
    /// Print the stored maintenance schedule
    Schedule {
        #[arg(long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
        config: String,
        #[arg(long)]
        env_file: Option<String>,
    },
}

fn init_tracing() {
    let default_level = if config::debug_enabled() { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn fatal(context: &str, e: impl std::fmt::Display) -> ! {
    tracing::error!(%e, "{}", context);
    eprintln!("{}: {}", yansi::Paint::red(context), e);
    process::exit(1);
}

fn load_settings(path: &str) -> EnvConfig {
    let environment = config::current_environment();
    match config::load_config(Path::new(path), &environment) {
        Ok(cfg) => cfg,
        Err(e) => fatal("Failed to load configuration", e),
    }
}

/// Client secret from the environment, or from Secrets Manager when the
/// config names a secret.
async fn resolve_client_secret(settings: &EnvConfig, sdk: &SdkConfig) -> Result<String> {
    if let Some(secret) = config::client_secret_from_env() {
        return Ok(secret);
    }
    match (&settings.azure_ad.secret_name, &settings.azure_ad.secret_key) {
        (Some(name), Some(key)) => secrets::fetch_secret_key(sdk, name, key).await,
        _ => Err(Error::Config(format!(
            "{} is not set and azure_ad.secret_name/secret_key are not configured",
            config::CLIENT_SECRET_ENV
        ))),
    }
}

async fn build_state(settings: EnvConfig, sdk: &SdkConfig, client_secret: String) -> AppState {
    let settings = Arc::new(settings);
    let directory = InstanceDirectory::new();
    let statuses = StatusStore::new();
    let schedule = ScheduleStore::new(
        Arc::new(ParameterClient::new(sdk)),
        settings.schedule_parameter_name(),
    );
    if let Err(e) = schedule.load().await {
        tracing::error!(%e, parameter = %schedule.parameter_name(), "Error loading schedule configuration");
    }

    let sessions = Arc::new(RoleSessions::new(sdk, &settings.role_name));
    let dispatcher = Dispatcher::new(directory.clone(), statuses.clone(), schedule.clone(), sessions);
    let source = Arc::new(SnapshotObject::new(sdk, &settings.s3.bucket, &settings.s3.key));

    let http = match reqwest::Client::builder()
        .user_agent(format!("ec2-restart-manager/{}", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(c) => c,
        Err(e) => fatal("Failed to create HTTP client", e),
    };

    AppState {
        public_base_url: settings.public_base_url(),
        identity: AzureAdClient::new(settings.azure_ad.clone(), client_secret, http),
        settings,
        sessions: Arc::new(Mutex::new(HashMap::new())),
        flash_store: Arc::new(Mutex::new(HashMap::new())),
        directory,
        statuses,
        schedule,
        dispatcher,
        inventory: source,
        custom_css: None,
    }
}

async fn start_server(mut state: AppState, host: &str, port: u16, stylesheet: Option<String>) {
    if let Some(path) = stylesheet {
        match std::fs::read_to_string(&path) {
            Ok(css) => {
                state.custom_css = Some(css);
                tracing::info!("Loaded custom stylesheet from {}", path);
            }
            Err(e) => fatal("Failed to read custom stylesheet", e),
        }
    }

    match inventory::refresh(state.inventory.as_ref(), &state.directory).await {
        Ok(count) => tracing::info!(count, "Initial inventory loaded"),
        Err(e) => tracing::warn!(%e, "Initial inventory load failed; the refresher will retry"),
    }
    inventory::spawn_refresher(
        state.inventory.clone(),
        state.directory.clone(),
        state.settings.inventory_refresh_interval(),
    );

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => fatal("Invalid host/port format", e),
    };
    let app = ec2rm::build_router(state);
    tracing::info!(%addr, "Starting EC2 Restart Manager");
    println!(
        "{} {}",
        yansi::Paint::new("Web server running on").green(),
        yansi::Paint::new(format!("http://{}", addr)).cyan()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                fatal("Server error", e);
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address; is the port already in use?");
            eprintln!(
                "{}: {}\n{}",
                yansi::Paint::new(format!("Failed to bind to {}", addr)).red(),
                e,
                yansi::Paint::new("Please stop any process using this port, or start the server with a different --port value.").yellow()
            );
            process::exit(1);
        }
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table
}

async fn print_inventory(settings: &EnvConfig, sdk: &SdkConfig) {
    let source = SnapshotObject::new(sdk, &settings.s3.bucket, &settings.s3.key);
    let directory = InstanceDirectory::new();
    if let Err(e) = inventory::refresh(&source, &directory).await {
        fatal("Failed to load inventory", e);
    }
    let records = directory.list();
    if records.is_empty() {
        println!("(no running instances)");
        return;
    }
    let mut table = new_table();
    table.set_header(vec!["Name", "ID", "Account", "Region", "Environment", "Service", "Owner"]);
    for r in &records {
        table.add_row(vec![
            r.name.as_str(),
            r.id.as_str(),
            r.account_name.as_str(),
            r.region.as_str(),
            r.environment_class.as_str(),
            r.service.as_str(),
            r.owner.as_str(),
        ]);
    }
    println!("\n{table}\n");
    println!("{} running instances", records.len());
}

async fn print_schedule(settings: &EnvConfig, sdk: &SdkConfig) {
    let store = ScheduleStore::new(Arc::new(ParameterClient::new(sdk)), settings.schedule_parameter_name());
    let schedule = match store.load().await {
        Ok(s) => s,
        Err(e) => fatal("Failed to load schedule", e),
    };
    let mut table = new_table();
    table.set_header(vec!["Window", "Day", "Time"]);
    table.add_row(vec!["dev / stg", schedule.stg_dev_day.as_str(), schedule.stg_dev_time.as_str()]);
    table.add_row(vec!["prod", schedule.prod_day.as_str(), schedule.prod_time.as_str()]);
    println!("\n{table}\n");
    println!("Parameter: {}", store.parameter_name());
}

async fn check_config(settings: &EnvConfig, sdk: &SdkConfig) {
    let mut ok = true;
    match resolve_client_secret(settings, sdk).await {
        Ok(_) => println!("{}", yansi::Paint::new("Azure AD client secret resolved").green()),
        Err(e) => {
            eprintln!("{}: {}", yansi::Paint::new("Client secret").red(), e);
            ok = false;
        }
    }
    let store = ScheduleStore::new(Arc::new(ParameterClient::new(sdk)), settings.schedule_parameter_name());
    match store.load().await {
        Ok(_) => println!("{} {}", yansi::Paint::new("Schedule parameter readable:").green(), store.parameter_name()),
        Err(e) => {
            eprintln!("{}: {}", yansi::Paint::new("Schedule parameter").red(), e);
            ok = false;
        }
    }
    let source = SnapshotObject::new(sdk, &settings.s3.bucket, &settings.s3.key);
    match inventory::refresh(&source, &InstanceDirectory::new()).await {
        Ok(count) => println!("{} ({} running instances)", yansi::Paint::new("Inventory snapshot readable").green(), count),
        Err(e) => {
            eprintln!("{}: {}", yansi::Paint::new("Inventory snapshot").red(), e);
            ok = false;
        }
    }
    if !ok {
        process::exit(1);
    }
    println!("{}", yansi::Paint::new("Configuration looks valid").green());
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    // Dispatch CLI commands. If no command provided, serve the web app with defaults
    let command = cli.command.unwrap_or(Commands::Serve {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PORT,
        config: DEFAULT_CONFIG_PATH.to_string(),
        env_file: None,
        stylesheet: None,
    });

    match command {
        Commands::Serve { host, port, config: path, env_file, stylesheet } => {
            config::load_env_file(env_file.as_deref());
            init_tracing();
            let settings = load_settings(&path);
            let sdk = ec2rm::aws::load_config(Some(settings.region.clone())).await;
            let secret = match resolve_client_secret(&settings, &sdk).await {
                Ok(s) => s,
                Err(e) => fatal("Failed to load Azure AD client secret", e),
            };
            let state = build_state(settings, &sdk, secret).await;
            start_server(state, &host, port, stylesheet).await;
        }
        Commands::CheckConfig { config: path, env_file } => {
            config::load_env_file(env_file.as_deref());
            init_tracing();
            let settings = load_settings(&path);
            let sdk = ec2rm::aws::load_config(Some(settings.region.clone())).await;
            check_config(&settings, &sdk).await;
        }
        Commands::Inventory { config: path, env_file } => {
            config::load_env_file(env_file.as_deref());
            init_tracing();
            let settings = load_settings(&path);
            let sdk = ec2rm::aws::load_config(Some(settings.region.clone())).await;
            print_inventory(&settings, &sdk).await;
        }
        Commands::Schedule { config: path, env_file } => {
            config::load_env_file(env_file.as_deref());
            init_tracing();
            let settings = load_settings(&path);
            let sdk = ec2rm::aws::load_config(Some(settings.region.clone())).await;
            print_schedule(&settings, &sdk).await;
        }
    }
}
