//! AssetDesk CLI - Command-line front end for the AssetDesk backend
//!
//! Drives the client library from a terminal: notices are printed to stderr,
//! response bodies to stdout.

use anyhow::{anyhow, bail, Context, Result};
use assetdesk_client::{
    AssetDeskClient, CallOutcome, ComplaintFilters, Credentials, Payload, QueryParams, Registration,
    SystemFilters, UiEvent, UiEvents,
};
use assetdesk_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, ClientConfig,
    LogFormat, LoggingConfig, NoticeLevel, PaginationConfig, Role,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "assetdesk")]
#[command(about = "Command-line client for the AssetDesk IT-asset backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL, overriding the configuration
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Backend(BackendCommand),

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Set a configuration value (key=value format)
        #[arg(long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(long)]
        get: Option<String>,

        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

/// Commands that talk to the backend or the stored session
#[derive(Subcommand)]
enum BackendCommand {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        email: String,

        /// Password (falls back to ASSETDESK_PASSWORD)
        #[arg(short, long, env = "ASSETDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in operator
    Whoami,

    /// Create a new account
    Register {
        #[arg(long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "ASSETDESK_PASSWORD", hide_env_values = true)]
        password: String,

        /// Admin, IT_Personnel or User
        #[arg(long, default_value = "User", value_parser = parse_role)]
        role: Role,

        #[arg(long)]
        department: Option<u32>,
    },

    /// Managed systems
    Systems {
        #[command(subcommand)]
        action: SystemAction,
    },

    /// Peripherals
    Peripherals {
        #[command(subcommand)]
        action: PeripheralAction,
    },

    /// Complaint tickets
    Complaints {
        #[command(subcommand)]
        action: ComplaintAction,
    },

    /// Audit logs
    Logs {
        /// Filter as key=value; may be repeated
        #[arg(short, long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,

        #[command(flatten)]
        paging: PageArgs,
    },

    /// Print the download link of a report
    ReportUrl {
        #[arg(value_enum)]
        report: ReportKind,

        #[arg(long)]
        department: Option<u64>,

        #[arg(long)]
        network: Option<u64>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        priority: Option<String>,
    },
}

#[derive(Subcommand)]
enum SystemAction {
    /// List systems
    List {
        #[arg(long)]
        department: Option<u64>,

        #[arg(long)]
        network: Option<u64>,

        #[command(flatten)]
        paging: PageArgs,
    },
    /// Show one system
    Show { id: u64 },
    /// Add a system from a JSON object
    Add {
        #[arg(long)]
        data: String,
    },
    /// Update a system from a JSON object
    Update {
        id: u64,

        #[arg(long)]
        data: String,
    },
    /// Delete a system
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum PeripheralAction {
    List {
        #[command(flatten)]
        paging: PageArgs,
    },
    Add {
        #[arg(long)]
        data: String,
    },
    Update {
        id: u64,

        #[arg(long)]
        data: String,
    },
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum ComplaintAction {
    /// List the complaints visible to the current operator
    List {
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        user: Option<String>,

        #[command(flatten)]
        paging: PageArgs,
    },
    Add {
        #[arg(long)]
        data: String,
    },
    Update {
        id: u64,

        #[arg(long)]
        data: String,
    },
}

/// Which page of a list to print
#[derive(Args, Clone, Copy, Debug, PartialEq, Eq)]
struct PageArgs {
    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Items per page; defaults to pagination.items_per_page
    #[arg(long)]
    per_page: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportKind {
    Systems,
    Complaints,
    Peripherals,
    Logs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = Some(api_url.clone());
    }

    let logging_config = if cli.verbose {
        LoggingConfig {
            format: config.logging.format,
            ..LoggingConfig::verbose()
        }
    } else {
        config.logging.clone()
    };
    init_logging(&logging_config).map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting AssetDesk CLI v{}", env!("CARGO_PKG_VERSION"));

    let command = match cli.command {
        Commands::Config {
            show,
            init,
            set,
            get,
            reset,
            validate,
        } => return handle_config(cli.config.as_deref(), show, init, set, get, reset, validate),
        Commands::Backend(command) => command,
    };

    let (client, mut events) =
        AssetDeskClient::from_config(&config).context("Failed to set up the client")?;
    let restored = client.initialize().context("Failed to read the stored session")?;
    debug!(logged_in = restored.is_some(), "Session loaded");
    // The login request emitted by initialize is only relevant to commands that need a session
    drain_events(&mut events, false);

    let result = run_command(command, &client, &config).await;
    drain_events(&mut events, true);
    result
}

async fn run_command(
    command: BackendCommand,
    client: &AssetDeskClient,
    config: &ClientConfig,
) -> Result<()> {
    match command {
        BackendCommand::Login { email, password } => handle_login(client, email, password).await,
        BackendCommand::Logout => handle_logout(client).await,
        BackendCommand::Whoami => handle_whoami(client),
        BackendCommand::Register {
            name,
            email,
            password,
            role,
            department,
        } => {
            let registration = Registration {
                full_name: name,
                email,
                password,
                role,
                department_id: department,
            };
            handle_register(client, &registration).await
        }
        BackendCommand::Systems { action } => {
            require_session(client)?;
            handle_systems(client, action, &config.pagination).await
        }
        BackendCommand::Peripherals { action } => {
            require_session(client)?;
            handle_peripherals(client, action, &config.pagination).await
        }
        BackendCommand::Complaints { action } => {
            require_session(client)?;
            handle_complaints(client, action, &config.pagination).await
        }
        BackendCommand::Logs { filters, paging } => {
            require_session(client)?;
            let params = filters
                .into_iter()
                .fold(QueryParams::new(), |params, (key, value)| params.with(key, value));
            let outcome = client.api().logs().list(&params).await;
            print_page("logs", outcome, &config.pagination, paging)
        }
        BackendCommand::ReportUrl {
            report,
            department,
            network,
            status,
            priority,
        } => {
            let reports = client.api().reports();
            let url = match report {
                ReportKind::Systems => reports.systems(&SystemFilters {
                    department_id: department,
                    network_id: network,
                }),
                ReportKind::Complaints => reports.complaints(&ComplaintFilters {
                    status,
                    priority,
                    user_id: None,
                }),
                ReportKind::Peripherals => reports.peripherals(),
                ReportKind::Logs => reports.logs(),
            };
            debug!(base_url = %config.resolve_base_url(), "Built report link");
            println!("{}", url);
            Ok(())
        }
    }
}

/// Print queued notices; navigation requests are only shown when `show_navigation`
fn drain_events(events: &mut UiEvents, show_navigation: bool) {
    while let Ok(event) = events.try_recv() {
        match event {
            UiEvent::Notice(notice) => {
                let marker = match notice.level {
                    NoticeLevel::Success => "✅",
                    NoticeLevel::Info => "ℹ️ ",
                    NoticeLevel::Error => "❌",
                };
                eprintln!("{} {}", marker, notice.message);
            }
            UiEvent::Navigate(view) if show_navigation => {
                eprintln!("➡️  Please continue at the {:?} view ({})", view, view.page());
            }
            UiEvent::Navigate(_) => {}
            UiEvent::SessionChanged(identity) => {
                debug!(logged_in = identity.is_some(), "Session changed");
            }
        }
    }
}

fn load_config(config_path: Option<&Path>) -> Result<ClientConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        return ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()));
    }

    for path in default_config_paths().into_iter().flatten() {
        if path.exists() {
            info!("Loading configuration from {:?}", path);
            return ClientConfig::from_file(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()));
        }
    }

    info!("No configuration file found, using defaults");
    Ok(ClientConfig::default())
}

fn default_config_paths() -> [Option<PathBuf>; 3] {
    [
        dirs::config_dir().map(|d| d.join("assetdesk").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".assetdesk").join("config.toml")),
        Some(PathBuf::from("assetdesk.toml")),
    ]
}

fn require_session(client: &AssetDeskClient) -> Result<()> {
    if client.session().is_logged_in() {
        Ok(())
    } else {
        bail!("Not logged in. Run `assetdesk login` first.")
    }
}

async fn handle_login(client: &AssetDeskClient, email: String, password: String) -> Result<()> {
    log_operation_start!("login", email = %email);

    match client.login(&Credentials::new(email, password)).await {
        Ok(identity) => {
            log_operation_success!("login", user_id = %identity.user_id);
            println!("Logged in as {} <{}> ({})", identity.name, identity.email, identity.role);
            Ok(())
        }
        Err(rejected) => {
            log_operation_error!("login", rejected);
            Err(rejected.into())
        }
    }
}

async fn handle_logout(client: &AssetDeskClient) -> Result<()> {
    if client.logout(true) {
        client.session().wait_for_navigation().await;
    } else {
        println!("No active session");
    }
    Ok(())
}

fn handle_whoami(client: &AssetDeskClient) -> Result<()> {
    match client.session().current() {
        Some(identity) => {
            println!("User ID: {}", identity.user_id);
            println!("Name:    {}", identity.name);
            println!("Email:   {}", identity.email);
            println!("Role:    {}", identity.role);
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

async fn handle_register(client: &AssetDeskClient, registration: &Registration) -> Result<()> {
    log_operation_start!("register", email = %registration.email, role = %registration.role);
    let outcome = client.api().auth().register(registration).await;
    if outcome.is_success() {
        log_operation_success!("register");
        Ok(())
    } else {
        let message = outcome
            .error_message("Registration failed")
            .unwrap_or_else(|| "Session expired".to_string());
        log_operation_error!("register", message);
        bail!(message)
    }
}

async fn handle_systems(
    client: &AssetDeskClient,
    action: SystemAction,
    pagination: &PaginationConfig,
) -> Result<()> {
    let systems = client.api().systems();
    let outcome = match action {
        SystemAction::List {
            department,
            network,
            paging,
        } => {
            let filters = SystemFilters {
                department_id: department,
                network_id: network,
            };
            return print_page("systems", systems.list(&filters).await, pagination, paging);
        }
        SystemAction::Show { id } => systems.get(id).await,
        SystemAction::Add { data } => systems.create(&parse_body(&data)?).await,
        SystemAction::Update { id, data } => systems.update(id, &parse_body(&data)?).await,
        SystemAction::Delete { id } => systems.delete(id).await,
    };
    print_outcome("systems", outcome)
}

async fn handle_peripherals(
    client: &AssetDeskClient,
    action: PeripheralAction,
    pagination: &PaginationConfig,
) -> Result<()> {
    let peripherals = client.api().peripherals();
    let outcome = match action {
        PeripheralAction::List { paging } => {
            return print_page("peripherals", peripherals.list().await, pagination, paging);
        }
        PeripheralAction::Add { data } => peripherals.create(&parse_body(&data)?).await,
        PeripheralAction::Update { id, data } => peripherals.update(id, &parse_body(&data)?).await,
        PeripheralAction::Delete { id } => peripherals.delete(id).await,
    };
    print_outcome("peripherals", outcome)
}

async fn handle_complaints(
    client: &AssetDeskClient,
    action: ComplaintAction,
    pagination: &PaginationConfig,
) -> Result<()> {
    let complaints = client.api().complaints();
    let outcome = match action {
        ComplaintAction::List {
            status,
            priority,
            user,
            paging,
        } => {
            let filters = ComplaintFilters {
                status,
                priority,
                user_id: user,
            };
            let outcome = complaints.list_visible(&filters).await;
            return print_page("complaints", outcome, pagination, paging);
        }
        ComplaintAction::Add { data } => complaints.create(&parse_body(&data)?).await,
        ComplaintAction::Update { id, data } => complaints.update(id, &parse_body(&data)?).await,
    };
    print_outcome("complaints", outcome)
}

/// Print the response body; failed calls become errors carrying the server's message
fn print_outcome(operation: &str, outcome: CallOutcome) -> Result<()> {
    match outcome {
        CallOutcome::Completed(envelope) if envelope.ok => {
            log_operation_success!(operation, status = envelope.status);
            let rendered = match &envelope.data {
                Payload::Json(value) => serde_json::to_string_pretty(value)?,
                Payload::Text(text) => text.clone(),
            };
            println!("{}", rendered);
            Ok(())
        }
        CallOutcome::AuthExpired => bail!("Session expired. Please log in again."),
        other => {
            let message = other
                .error_message("Request failed")
                .unwrap_or_else(|| "Request failed".to_string());
            log_operation_error!(operation, message);
            bail!(message)
        }
    }
}

/// Print one page of the list stored under `field` (e.g. `systems`) in the response
///
/// Bodies without such a list are printed whole.
fn print_page(
    field: &str,
    outcome: CallOutcome,
    pagination: &PaginationConfig,
    paging: PageArgs,
) -> Result<()> {
    let items = match &outcome {
        CallOutcome::Completed(envelope) if envelope.ok => {
            envelope.field(field).and_then(Value::as_array)
        }
        _ => None,
    };
    let Some(items) = items else {
        return print_outcome(field, outcome);
    };

    let (rendered, window) = render_page(items, pagination, paging)?;
    log_operation_success!(field, items = window.total_items, page = window.page);
    println!("{}", rendered);
    eprintln!(
        "Page {}/{} ({} {})",
        window.page,
        window.total_pages(),
        window.total_items,
        field
    );
    Ok(())
}

fn render_page(
    items: &[Value],
    pagination: &PaginationConfig,
    paging: PageArgs,
) -> Result<(String, assetdesk_core::PageWindow)> {
    let window = pagination.window(paging.page, paging.per_page, items.len())?;
    let rendered = serde_json::to_string_pretty(&items[window.range()])?;
    Ok((rendered, window))
}

fn parse_body(data: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(data).context("--data must be valid JSON")?;
    if !value.is_object() {
        bail!("--data must be a JSON object");
    }
    Ok(value)
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse()
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

fn handle_config(
    config_path: Option<&Path>,
    show: bool,
    init: bool,
    set: Option<String>,
    get: Option<String>,
    reset: bool,
    validate: bool,
) -> Result<()> {
    let target = match config_path {
        Some(path) => path.to_path_buf(),
        None => get_config_path()?,
    };

    if init {
        ClientConfig::default().save_to_file(&target)?;
        println!("✅ Configuration initialized at: {:?}", target);
        println!("📝 Edit the file to point api_url at your backend.");
    }

    if show {
        let config = load_config(config_path)?;
        println!("📋 Current configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
    }

    if reset {
        ClientConfig::default().save_to_file(&target)?;
        println!("🔄 Configuration reset to defaults at: {:?}", target);
    }

    if validate {
        let config = load_config(config_path)?;
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e.into());
            }
        }
    }

    if let Some(key_value) = set {
        let Some((key, value)) = key_value.split_once('=') else {
            bail!("Invalid format. Use key=value format, e.g. --set api_url=http://localhost:8000");
        };
        let mut config = if target.exists() {
            ClientConfig::from_file(&target)?
        } else {
            ClientConfig::default()
        };
        set_config_value(&mut config, key, value)?;
        config.validate()?;
        config.save_to_file(&target)?;
        println!("✅ Set {} = {}", key, value);
    }

    if let Some(key) = get {
        let config = load_config(config_path)?;
        println!("{} = {}", key, get_config_value(&config, &key)?);
    }

    Ok(())
}

/// Get the default configuration file path
fn get_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("assetdesk").join("config.toml"))
        .ok_or_else(|| anyhow!("Could not determine a configuration directory; pass --config"))
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid value for {}: {}", key, value))
}

fn set_config_value(config: &mut ClientConfig, key: &str, value: &str) -> Result<()> {
    let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());

    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        ["api_url"] => config.api_url = optional(value),
        ["page_origin"] => config.page_origin = optional(value),
        ["fallback_api_url"] => config.fallback_api_url = value.to_string(),
        ["request_timeout_ms"] => config.request_timeout_ms = parse_value(key, value)?,
        ["notice_duration_ms"] => config.notice_duration_ms = parse_value(key, value)?,
        ["logout_redirect_delay_ms"] => {
            config.logout_redirect_delay_ms = parse_value(key, value)?
        }
        ["user_agent"] => config.user_agent = value.to_string(),
        ["storage", "path"] => config.storage.path = optional(value),
        ["pagination", "items_per_page"] => {
            config.pagination.items_per_page = parse_value(key, value)?
        }
        ["logging", "level"] => config.logging.level = value.to_string(),
        ["logging", "format"] => {
            config.logging.format = value.parse::<LogFormat>().map_err(|e| anyhow!(e))?
        }
        _ => bail!("Unknown configuration key: {} (use --show to see available keys)", key),
    }
    Ok(())
}

fn get_config_value(config: &ClientConfig, key: &str) -> Result<String> {
    let parts: Vec<&str> = key.split('.').collect();
    let value = match parts.as_slice() {
        ["api_url"] => config.api_url.clone().unwrap_or_default(),
        ["base_url"] => config.resolve_base_url(),
        ["page_origin"] => config.page_origin.clone().unwrap_or_default(),
        ["fallback_api_url"] => config.fallback_api_url.clone(),
        ["request_timeout_ms"] => config.request_timeout_ms.to_string(),
        ["notice_duration_ms"] => config.notice_duration_ms.to_string(),
        ["logout_redirect_delay_ms"] => config.logout_redirect_delay_ms.to_string(),
        ["user_agent"] => config.user_agent.clone(),
        ["storage", "path"] => config.storage_path().display().to_string(),
        ["pagination", "items_per_page"] => config.pagination.items_per_page.to_string(),
        ["logging", "level"] => config.logging.level.clone(),
        ["logging", "format"] => format!("{:?}", config.logging.format).to_lowercase(),
        _ => bail!("Unknown configuration key: {} (use --show to see available keys)", key),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "assetdesk",
            "--api-url",
            "http://localhost:8000",
            "systems",
            "list",
            "--department",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:8000"));
        match cli.command {
            Commands::Backend(BackendCommand::Systems {
                action:
                    SystemAction::List {
                        department,
                        network,
                        paging,
                    },
            }) => {
                assert_eq!(department, Some(2));
                assert_eq!(network, None);
                assert_eq!(
                    paging,
                    PageArgs {
                        page: 1,
                        per_page: None
                    }
                );
            }
            _ => panic!("parsed the wrong command"),
        }
    }

    #[test]
    fn test_list_pages_by_configured_size() {
        let items: Vec<Value> = (1..=23).map(|id| serde_json::json!({ "id": id })).collect();
        let pagination = PaginationConfig::default();

        let (rendered, window) = render_page(
            &items,
            &pagination,
            PageArgs {
                page: 3,
                per_page: None,
            },
        )
        .unwrap();
        let shown: Vec<Value> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(shown.len(), 3);
        assert_eq!(shown[0]["id"], 21);
        assert_eq!(window.total_pages(), 3);

        let (rendered, _) = render_page(
            &items,
            &pagination,
            PageArgs {
                page: 1,
                per_page: Some(5),
            },
        )
        .unwrap();
        let shown: Vec<Value> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(shown.len(), 5);

        let unknown_size = PageArgs {
            page: 1,
            per_page: Some(7),
        };
        assert!(render_page(&items, &pagination, unknown_size).is_err());
    }

    #[test]
    fn test_page_flags_parse() {
        let cli = Cli::try_parse_from([
            "assetdesk",
            "complaints",
            "list",
            "--page",
            "2",
            "--per-page",
            "25",
        ])
        .unwrap();
        match cli.command {
            Commands::Backend(BackendCommand::Complaints {
                action: ComplaintAction::List { paging, .. },
            }) => assert_eq!(
                paging,
                PageArgs {
                    page: 2,
                    per_page: Some(25)
                }
            ),
            _ => panic!("parsed the wrong command"),
        }
    }

    #[test]
    fn test_register_role_must_be_exact() {
        let parsed = Cli::try_parse_from([
            "assetdesk", "register", "--name", "Grace", "--email", "g@example.com", "--password",
            "x", "--role", "IT_Personnel",
        ])
        .unwrap();
        assert!(matches!(
            parsed.command,
            Commands::Backend(BackendCommand::Register {
                role: Role::ItPersonnel,
                ..
            })
        ));

        assert!(Cli::try_parse_from([
            "assetdesk", "register", "--name", "Grace", "--email", "g@example.com", "--password",
            "x", "--role", "admin",
        ])
        .is_err());
    }

    #[test]
    fn test_log_filters_are_key_value() {
        assert_eq!(
            parse_key_value("action=LOGIN"),
            Ok(("action".to_string(), "LOGIN".to_string()))
        );
        assert!(parse_key_value("action").is_err());
    }

    #[test]
    fn test_set_and_get_config_values() {
        let mut config = ClientConfig::default();

        set_config_value(&mut config, "api_url", "http://localhost:8000").unwrap();
        set_config_value(&mut config, "request_timeout_ms", "5000").unwrap();
        set_config_value(&mut config, "logging.format", "json").unwrap();

        assert_eq!(get_config_value(&config, "base_url").unwrap(), "http://localhost:8000");
        assert_eq!(get_config_value(&config, "request_timeout_ms").unwrap(), "5000");
        assert_eq!(get_config_value(&config, "logging.format").unwrap(), "json");

        set_config_value(&mut config, "api_url", "").unwrap();
        assert_eq!(config.api_url, None);

        assert!(set_config_value(&mut config, "request_timeout_ms", "soon").is_err());
        assert!(set_config_value(&mut config, "llm.model", "x").is_err());
        assert!(get_config_value(&config, "nope").is_err());
    }

    #[test]
    fn test_explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assetdesk.toml");
        std::fs::write(&path, "api_url = \"http://backend.local:9000\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.resolve_base_url(), "http://backend.local:9000");

        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_data_must_be_an_object() {
        assert!(parse_body(r#"{"system_name": "PC-01"}"#).is_ok());
        assert!(parse_body("[1, 2]").is_err());
        assert!(parse_body("not json").is_err());
    }
}
