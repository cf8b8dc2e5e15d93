//! routekit command line client.
//!
//! Resolves a route pattern against the configured base URL and sends one
//! request through the full middleware pipeline.
//!
//! ```text
//! routekit --base-url https://api.example.com -H accept:application/json \
//!     get "service/:uuid/(:type/)" -p uuid=qwerty -p count=25
//! ```

use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

use routekit::config::{load_config, ClientConfig};
use routekit::middleware::builtin;
use routekit::observability::logging::init_logging;
use routekit::{ClientBuilder, Middleware, Params, ResponseEnvelope, RouteError, Verb};

#[derive(Parser)]
#[command(name = "routekit")]
#[command(about = "Send a request through a routekit route template", long_about = None)]
struct Cli {
    /// TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured base URL.
    #[arg(short, long)]
    base_url: Option<String>,

    /// Extra header as `name:value`; repeatable.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Bearer token for the Authorization header.
    #[arg(long)]
    token: Option<String>,

    /// HTTP verb.
    #[arg(value_enum)]
    verb: VerbArg,

    /// Route pattern, e.g. `users/:id(/:tab)`.
    pattern: String,

    /// Parameter as `key=value`; values are parsed as JSON when possible.
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,
}

#[derive(Clone, Copy, ValueEnum)]
enum VerbArg {
    Get,
    Post,
    Put,
    Patch,
    #[value(alias = "del")]
    Delete,
}

impl From<VerbArg> for Verb {
    fn from(v: VerbArg) -> Self {
        match v {
            VerbArg::Get => Verb::Get,
            VerbArg::Post => Verb::Post,
            VerbArg::Put => Verb::Put,
            VerbArg::Patch => Verb::Patch,
            VerbArg::Delete => Verb::Delete,
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name:value, got '{}'", raw))
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }

    init_logging(&config.observability)?;

    let mut middleware = Middleware::new().post_request(builtin::trace_responses());
    if let Some(token) = &cli.token {
        middleware = middleware.before_send(builtin::bearer_auth(token.clone()));
    }

    let root = ClientBuilder::from_config(&config)
        .headers(cli.headers.into_iter().collect())
        .middleware(middleware)
        .build()?;

    let factory = root.request(cli.verb.into(), &cli.pattern)?;
    let params: Params = cli.params.into_iter().collect();

    tracing::debug!(url = %factory.url(), "Resolved route");

    match factory.invoke(params).await {
        Ok(res) => print_response(&res),
        Err(RouteError::Transport(res)) => {
            print_response(&res);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn print_response(res: &ResponseEnvelope) {
    match res.status {
        Some(status) => eprintln!("{} {} -> {}", res.request.method, res.request.url, status),
        None => eprintln!(
            "{} {} -> {}",
            res.request.method,
            res.request.url,
            res.error.as_deref().unwrap_or("no response")
        ),
    }

    match res.json::<Value>() {
        Ok(json) => match serde_json::to_string_pretty(&json) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", res.body),
        },
        Err(_) if !res.body.is_empty() => println!("{}", res.body),
        Err(_) => {}
    }
}
