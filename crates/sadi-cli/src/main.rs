//! sadi - hello サービスを HTTP で公開する CLI
//!
//! - `sadi [serve] --bind 127.0.0.1:8080 [--async] [--config sadi.json]`
//! - `sadi describe --format text/turtle`

mod hello;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::HOST;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use clap::{Args, Parser, Subcommand};
use sadi_core::format::FormatRegistry;
use sadi_core::service::describe;
use sadi_core::{Dispatcher, Invocation, Service, ServiceConfig, ServiceRequest};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::hello::HelloService;

const DEFAULT_SERVICE_URL: &str = "http://localhost:8080/";

#[derive(Parser)]
#[command(name = "sadi")]
#[command(about = "Publish the hello service over HTTP", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the hello service (default)
    Serve(ServeArgs),

    /// Print the service description
    Describe {
        /// Content type to print the description in
        #[arg(long, default_value = "text/turtle")]
        format: String,

        /// URL the description is published under
        #[arg(long, default_value = DEFAULT_SERVICE_URL)]
        service_url: String,
    },
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Externally visible URL (overrides the config file)
    #[arg(long)]
    service_url: Option<String>,

    /// Process every input asynchronously
    #[arg(long = "async")]
    asynchronous: bool,

    /// Evict completed tasks after this many seconds
    #[arg(long)]
    task_ttl_secs: Option<u64>,

    /// Artificial processing delay in milliseconds
    #[arg(long, default_value = "0")]
    delay_ms: u64,
}

impl ServeArgs {
    fn load_config(&self) -> anyhow::Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                ServiceConfig::from_json(&text)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => ServiceConfig::default(),
        };
        if let Some(url) = &self.service_url {
            config.service_url = Some(url.clone());
        }
        if let Some(ttl) = self.task_ttl_secs {
            config.task_ttl_secs = Some(ttl);
        }
        config.validate()?;
        Ok(config)
    }

    fn invocation(&self) -> Invocation {
        if self.asynchronous {
            Invocation::Async
        } else {
            Invocation::Sync
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve(cli.serve)) {
        Commands::Serve(args) => serve(args).await,
        Commands::Describe {
            format,
            service_url,
        } => print_description(&format, &service_url),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.load_config()?;
    if args.asynchronous && config.service_url.is_none() {
        warn!("async service without service_url; task URLs will follow the Host header");
    }

    let service = HelloService::new(args.invocation()).with_delay(Duration::from_millis(args.delay_ms));
    let dispatcher = Arc::new(
        Dispatcher::builder(Arc::new(service))
            .registry(FormatRegistry::standard())
            .config(config)
            .build()?,
    );
    let reaper = dispatcher.spawn_reaper();

    let app = Router::new()
        .fallback(handle)
        .with_state(Arc::clone(&dispatcher));

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind to {}", args.bind))?;
    info!(addr = %args.bind, asynchronous = args.asynchronous, "hello service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failure")?;

    if let Some(reaper) = reaper {
        reaper.shutdown_and_join().await;
    }
    let counts = dispatcher.tasks().counts().await;
    info!(
        total = counts.total(),
        running = counts.running,
        completed = counts.completed,
        failed = counts.failed,
        "hello service stopped"
    );
    Ok(())
}

/// axum → ServiceRequest → Dispatcher → axum
async fn handle(
    State(dispatcher): State<Arc<Dispatcher>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost")
        .to_string();
    let request = ServiceRequest {
        method,
        base_url: format!("http://{host}{}", uri.path()),
        query: uri.query().map(str::to_string),
        headers,
        body: body.to_vec(),
    };

    let response = dispatcher.dispatch(request).await;
    (response.status, response.headers, response.body).into_response()
}

fn print_description(format: &str, service_url: &str) -> anyhow::Result<()> {
    let registry = FormatRegistry::standard();
    let codec = registry.lookup(format)?;
    let service = HelloService::new(Invocation::Sync);
    let graph = describe(service_url, service.definition(), service.parameters().as_ref());
    let bytes = codec.encode(&graph).context("failed to encode description")?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_serves_with_defaults() {
        let cli = Cli::try_parse_from(["sadi"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.bind, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert!(!cli.serve.asynchronous);
    }

    #[test]
    fn flags_override_the_config() {
        let cli = Cli::try_parse_from([
            "sadi",
            "serve",
            "--async",
            "--service-url",
            "https://example.org/hello",
            "--task-ttl-secs",
            "30",
        ])
        .unwrap();
        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.service_url.as_deref(), Some("https://example.org/hello"));
        assert_eq!(config.task_ttl_secs, Some(30));
        assert_eq!(args.invocation(), Invocation::Async);
    }

    #[test]
    fn describe_takes_a_format() {
        let cli = Cli::try_parse_from(["sadi", "describe", "--format", "application/n-triples"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Describe { ref format, .. }) if format == "application/n-triples"
        ));
        assert!(print_description("application/n-triples", DEFAULT_SERVICE_URL).is_ok());
        assert!(print_description("image/png", DEFAULT_SERVICE_URL).is_err());
    }
}
