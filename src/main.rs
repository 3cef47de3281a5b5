use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use svc_locator::logging::{init_logging, LogFormat, LoggingConfig};
use svc_locator::{AppConfig, ContainerError, Factory, Registration, ServiceContainer};

/// Bootstraps a container with demo services and prints what it resolves.
#[derive(Debug, Parser)]
#[command(name = "svc-locator", version, about)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print container statistics as JSON when done
    #[arg(long)]
    stats: bool,
}

struct Greeter;

impl Greeter {
    fn say_hello(&self) -> &'static str {
        "Hello, I'm a pre-built object"
    }
}

struct RequestId(usize);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;

    let mut logging = if cli.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::from_settings(&config.logging)
    };
    if let Some(format) = cli.log_format {
        logging.format = format;
    }
    init_logging(logging).map_err(|e| anyhow::anyhow!(e))?;

    let container = ServiceContainer::with_config(config.container.clone());
    register_services(&container)?;

    println!("---------- Resolved ----------");
    println!("settings.db : {}", container.get_as::<String>("settings.db")?);
    println!("greeter     : {}", container.get_as::<Greeter>("greeter")?.say_hello());
    println!("anonymous   : {}", container.get_as::<&str>("anonymous")?);
    println!("closure     : {}", container.get_as::<String>("closure")?);
    for _ in 0..2 {
        println!("request.id  : {}", container.get_as::<RequestId>("request.id")?.0);
    }

    println!("---------- Raw output ----------");
    for key in container.keys() {
        let raw = container.output(&key)?;
        let kind = match raw.as_factory() {
            Some(factory) if factory.is_force_new() => "force-new factory",
            Some(_) => "factory",
            None => "value",
        };
        println!("{:<12}: {} ({})", key, kind, raw.type_name());
    }

    println!("---------- Errors ----------");
    if let Err(err) = container.set_value("settings.db", "override") {
        println!("{}", err);
    }
    if let Err(err) = container.force_new(Registration::value("Hello")) {
        println!("{}", err);
    }
    if let Err(err) = container.get("missing") {
        println!("{}", err);
    }

    if cli.stats {
        println!("{}", serde_json::to_string_pretty(&container.stats())?);
    }

    Ok(())
}

fn register_services(container: &ServiceContainer) -> Result<(), ContainerError> {
    container.set_factory("settings.db", |_| String::from("sqlite::memory:"))?;
    container.set_value("greeter", Greeter)?;
    container.set_factory("anonymous", |_| "Basic anonymous function")?;

    let suffix = "Hello";
    container.set_factory("closure", move |c: &ServiceContainer| {
        let db = c
            .get_as::<String>("settings.db")
            .map(|db| db.to_string())
            .unwrap_or_default();
        format!("{} {}", db, suffix)
    })?;

    let counter = Arc::new(AtomicUsize::new(0));
    let request_id = Factory::new(move |_| RequestId(counter.fetch_add(1, Ordering::SeqCst)));
    container.set("request.id", container.force_new(request_id)?)?;

    Ok(())
}
