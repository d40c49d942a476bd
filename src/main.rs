#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use authgate::api::{self, AuthError, Credentials, RegisterRequest};
use authgate::config::{ConfigError, resolve_base_url};
use authgate::{
    ApiRequest, ClientConfig, FileStorage, GuardConfig, NavigationGuard, Notifier, Pipeline, RequestError, Router,
    RouterError, SessionStore, app_routes,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("http client build failed: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("{0}")]
    Request(#[from] RequestError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Router(#[from] RouterError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid query pair `{0}`; expected key=value")]
    InvalidQuery(String),
}

impl CliError {
    /// Classified request failures reach the user through the notifier
    /// before they propagate here.
    fn already_reported(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Auth(AuthError::Request(_)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "authgate", about = "Session-aware API client and route guard")]
struct Cli {
    /// Overrides AUTHGATE_API_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides AUTHGATE_SESSION_FILE.
    #[arg(long)]
    session_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "AUTHGATE_PASSWORD")]
        password: String,
    },
    /// Create an account and persist the session.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, env = "AUTHGATE_PASSWORD")]
        password: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long = "skill")]
        skills: Vec<String>,
    },
    /// Drop the stored session.
    Logout,
    /// Print the stored session.
    Whoami,
    /// Send a request through the pipeline.
    Api(ApiArgs),
    /// Run a navigation through the guard and print where it lands.
    Navigate { path: String },
}

#[derive(Args, Debug)]
struct ApiArgs {
    #[arg(value_parser = ["get", "post", "put", "delete"])]
    method: String,
    path: String,
    #[arg(long = "query", short = 'q')]
    query: Vec<String>,
    #[arg(long)]
    data: Option<String>,
}

/// Prints notifications for the terminal user.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.already_reported() {
                eprintln!("error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config.base_url = resolve_base_url(Some(base_url), config.production);
    }
    if let Some(path) = cli.session_file {
        config.session_file = path;
    }
    tracing::debug!(base_url = %config.base_url, session_file = %config.session_file.display(), "config loaded");

    let session = SessionStore::new(Arc::new(FileStorage::open(&config.session_file)));
    let notifier: Arc<dyn Notifier> = Arc::new(StderrNotifier);
    let guard = NavigationGuard::new(GuardConfig::default(), session.clone(), notifier.clone());
    let router = Arc::new(Router::new(app_routes(), guard));
    let pipeline = Pipeline::from_config(&config, session.clone(), notifier, router.clone())?;

    match cli.command {
        Command::Login { username, password } => {
            let user = api::login(&pipeline, &Credentials::new(username, password)).await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Register { username, password, role, skills } => {
            let request = RegisterRequest { username, password, role, skills };
            let user = api::register(&pipeline, &request).await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Logout => {
            api::logout(&pipeline);
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let snapshot = session.snapshot();
            print_json(&json!({
                "authenticated": snapshot.is_authenticated(),
                "user": snapshot.user,
            }))
        }
        Command::Api(args) => run_api(&pipeline, args).await,
        Command::Navigate { path } => {
            let landed = router.navigate(&path)?;
            println!("{landed}");
            Ok(())
        }
    }
}

async fn run_api(pipeline: &Pipeline, args: ApiArgs) -> Result<(), CliError> {
    let mut request = match args.method.as_str() {
        "post" => ApiRequest::post(args.path),
        "put" => ApiRequest::put(args.path),
        "delete" => ApiRequest::delete(args.path),
        _ => ApiRequest::get(args.path),
    };
    for pair in args.query {
        let (key, value) = pair.split_once('=').ok_or_else(|| CliError::InvalidQuery(pair.clone()))?;
        request = request.with_query(key, value);
    }
    if let Some(data) = args.data {
        request = request.with_body(serde_json::from_str::<Value>(&data)?);
    }
    let value = pipeline.send(request).await?;
    print_json(&value)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
