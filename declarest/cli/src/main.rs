//! declarest CLI - inspect, render and call declaratively defined REST endpoints

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use declarest::{Api, ApiBuilder, ApiConfig, DuplicateRequestsFilter, HttpTransport, Payload};
use serde_json::{Map, Value};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "declarest")]
#[command(about = "Inspect and call declaratively defined REST endpoints", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List endpoints and their actions
    List {
        /// API definition (YAML, or JSON with a .json extension)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// Print the request an action call would send, without sending it
    Render {
        #[command(flatten)]
        call: CallArgs,
    },

    /// Send an action call and print the response data
    Call {
        #[command(flatten)]
        call: CallArgs,

        /// Server that relative endpoint URLs are resolved against
        #[arg(long, value_name = "URL", default_value = "http://localhost")]
        base_url: String,

        /// Share identical in-flight requests
        #[arg(long)]
        dedupe: bool,
    },
}

#[derive(Args)]
struct CallArgs {
    /// API definition (YAML, or JSON with a .json extension)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    #[arg(value_name = "ENDPOINT")]
    endpoint: String,

    #[arg(value_name = "ACTION")]
    action: String,

    /// Request parameter; read as JSON when it parses and prints back unchanged, as a string otherwise
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    /// Request payload as JSON
    #[arg(long, value_name = "JSON", value_parser = parse_json)]
    data: Option<Value>,
}

impl CallArgs {
    fn params(&self) -> Option<Map<String, Value>> {
        if self.params.is_empty() {
            return None;
        }
        Some(self.params.iter().cloned().collect())
    }

    fn payload(&self) -> Option<Payload> {
        self.data.clone().map(Payload::Json)
    }
}

fn parse_param(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("missing parameter name in '{s}'"));
    }
    Ok((key.to_string(), param_value(value)))
}

/// Reads a parameter value as JSON, except for numbers whose JSON form
/// differs from the text given (`1e3`, ids beyond `u64`), which stay strings.
fn param_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Number(n)) if n.to_string() != raw => Value::String(raw.to_string()),
        Ok(value) => value,
        Err(_) => Value::String(raw.to_string()),
    }
}

fn parse_json(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,declarest=info".to_string(),
            2 => "info,declarest=debug".to_string(),
            _ => "debug,declarest=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn load_builder(path: &Path) -> Result<ApiBuilder> {
    let config = ApiConfig::from_path(path)
        .wrap_err_with(|| format!("Failed to load API definition from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        endpoints = config.endpoints.len(),
        "Loaded API definition"
    );
    Ok(Api::builder().config(config))
}

fn list(config: &Path) -> Result<()> {
    let api = load_builder(config)?.build()?;
    for endpoint in api.endpoints() {
        println!("{} {}", endpoint.name(), endpoint.url());
        for action in endpoint.actions() {
            let method = action.method().to_string();
            println!("  {:<8}{:<12}{}", method, action.name(), action.url());
        }
    }
    Ok(())
}

fn render(call: &CallArgs) -> Result<()> {
    let api = load_builder(&call.config)?.build()?;
    let request = api
        .endpoint(&call.endpoint)?
        .request_config(&call.action, call.params(), call.payload())?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

async fn send(call: &CallArgs, base_url: &str, dedupe: bool) -> Result<()> {
    let http = HttpTransport::from_base_url(base_url)?;
    let builder = load_builder(&call.config)?;
    let api = if dedupe {
        builder.transport(DuplicateRequestsFilter::new(http)).build()?
    } else {
        builder.transport(http).build()?
    };

    let response = api
        .endpoint(&call.endpoint)?
        .call(&call.action, call.params(), call.payload())
        .await?;
    println!("{}", serde_json::to_string_pretty(&response.to_json())?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    match cli.command {
        Commands::List { config } => list(&config),
        Commands::Render { call } => render(&call),
        Commands::Call {
            call,
            base_url,
            dedupe,
        } => send(&call, &base_url, dedupe).await,
    }
}
