mod config;
mod graphql;
mod http;

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::EmployeeRegistry;
use tracing::info;

use crate::{
    config::AppConfig,
    graphql::GraphqlData,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "hr-dashboard", version, about = "Employee management dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP + GraphQL server.
    Serve(ServeCommand),
    /// Replace the stored employees with the sample records.
    Seed {
        #[arg(long, value_name = "DIR", help = "Data directory (defaults to HR_DATA_DIR)")]
        data_dir: Option<PathBuf>,
    },
    /// Print the GraphQL schema snapshot.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "127.0.0.1")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, value_name = "DIR", help = "Data directory (defaults to HR_DATA_DIR)")]
    data_dir: Option<PathBuf>,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let obs = match cli.command {
        Command::Serve(_) => ObsConfig::default(),
        _ => ObsConfig::default().compact(),
    };
    init_tracing(obs)?;
    match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::Seed { data_dir } => run_seed(data_dir),
        Command::SchemaPrint { output } => schema_print(output),
    }
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = Arc::new(AppConfig::load()?.with_data_dir(cmd.data_dir.clone()));
    let store = config.open_store();
    info!(dir = %store.dir().display(), "opening employee store");
    let registry = Arc::new(Mutex::new(EmployeeRegistry::open(Arc::new(store))));
    let schema = graphql::build_schema(GraphqlData {
        registry: registry.clone(),
    });
    let state = AppState {
        registry,
        schema,
        cookie_key: config.cookie_key.clone(),
        config,
    };
    http::serve((&cmd).into(), state).await
}

fn run_seed(data_dir: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load()?.with_data_dir(data_dir);
    let store = config.open_store();
    let dir = store.dir().to_path_buf();
    let mut registry = EmployeeRegistry::open(Arc::new(store));
    let outcome = registry.reset_to_seed();
    if !outcome.persisted {
        bail!("failed to write sample employees to {}", dir.display());
    }
    info!(count = outcome.value, dir = %dir.display(), "sample employees stored");
    Ok(())
}

fn schema_print(path: Option<PathBuf>) -> Result<()> {
    let schema = graphql::build_schema(GraphqlData {
        registry: Arc::new(Mutex::new(EmployeeRegistry::with_employees(
            Arc::new(platform_store::MemoryStore::new()),
            Vec::new(),
        ))),
    });
    let sdl = schema.sdl();
    match path {
        Some(target) => {
            std::fs::write(&target, sdl)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!(path = %target.display(), "schema written");
        }
        None => print!("{sdl}"),
    }
    Ok(())
}
