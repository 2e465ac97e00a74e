//! Section router CLI.
//!
//! Drives the reconciliation engine from the command line: every invocation
//! boots at a path (a full reload), applies one action, and prints the
//! resulting state as JSON on stdout. Logs go to stderr.
//!
//! # Architecture Overview
//!
//! ```text
//!     path ──▶ routing (match) ──▶ reconcile (controller)
//!                                      │   ├─ session (section, screen, payloads)
//!                                      │   ├─ dispatch (per-section screen → view)
//!                                      │   └─ storage (durable slots)
//!                                      ▼
//!                               loader (deferred views, single retry)
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use section_router::config::{load_config, EngineConfig};
use section_router::dispatch::ViewKey;
use section_router::loader::{
    BoxError, DeferredLoader, ImportFuture, ViewModule, ViewRegistry,
};
use section_router::observability::{logging::init_logging, metrics::init_metrics};
use section_router::reconcile::{KnownIdentities, ReconciliationController, SectionMarkers};
use section_router::routing::RouteTable;
use section_router::session::{AdminPayload, DriverPayload, PassengerPayload, Screen, Section};
use section_router::storage::{DurableStateStore, FileStore, KeyValueStore, MemoryStore};

#[derive(Parser)]
#[command(name = "section-router")]
#[command(about = "Navigation and view-state reconciliation engine", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// State file. Overrides `storage.path` from the config.
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Sections with a signed-in identity. Repeatable.
    #[arg(short, long = "identity", value_parser = parse_section)]
    identities: Vec<Section>,

    /// Print Prometheus metrics to stderr on exit.
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Boot at a path and print the reconciled state
    Reconcile { path: String },
    /// Boot at a path, then ask the active section to show a screen
    SetScreen {
        path: String,
        #[arg(value_parser = parse_screen)]
        screen: Screen,
    },
    /// Boot at a path, then replace a section's payload with JSON
    Payload {
        path: String,
        #[arg(value_parser = parse_section)]
        section: Section,
        json: String,
    },
    /// Clear persisted state and return to the landing screen
    Reset,
    /// Print the persisted state without reconciling
    Show,
    /// List the route table, or resolve a single path against it
    Routes { path: Option<String> },
    /// Mount a view whose first `fail` import attempts fail
    Load {
        view: String,
        #[arg(long, default_value_t = 0)]
        fail: u32,
    },
}

#[derive(Serialize)]
struct ActionReport<T: Serialize> {
    accepted: bool,
    #[serde(flatten)]
    outcome: T,
}

#[derive(Serialize)]
struct RouteRow<'a> {
    pattern: &'a str,
    view: &'a ViewKey,
    wildcard: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(state) = &cli.state {
        config.storage.path = Some(state.clone());
    }
    if cli.metrics {
        config.observability.metrics_enabled = true;
    }

    init_logging(&config.observability);
    let prometheus = if config.observability.metrics_enabled {
        init_metrics()
    } else {
        None
    };

    tracing::debug!(
        routes = config.routes.len(),
        namespace = %config.storage.namespace,
        "Configuration loaded"
    );

    let routes = Arc::new(RouteTable::from_config(&config.routes).map_err(|errors| {
        section_router::config::ConfigError::Validation(errors)
    })?);

    let backend: Arc<dyn KeyValueStore> = match &config.storage.path {
        Some(path) => Arc::new(FileStore::new(path)),
        None => {
            tracing::warn!("No state file configured, state will not outlive this process");
            Arc::new(MemoryStore::new())
        }
    };
    let store = DurableStateStore::new(backend, config.storage.namespace.clone());

    let identities = KnownIdentities::with(cli.identities.iter().copied());
    let mut controller = ReconciliationController::new(
        Arc::clone(&routes),
        store.clone(),
        SectionMarkers::from_config(&config.sections),
        Arc::new(identities),
    );

    match cli.command {
        Commands::Reconcile { path } => {
            let outcome = controller.boot(&path)?;
            print_json(&outcome)?;
        }
        Commands::SetScreen { path, screen } => {
            controller.boot(&path)?;
            let accepted = controller.set_screen(screen);
            print_json(&ActionReport {
                accepted,
                outcome: controller.snapshot(),
            })?;
        }
        Commands::Payload {
            path,
            section,
            json,
        } => {
            controller.boot(&path)?;
            let accepted = match section {
                Section::Passenger => {
                    let next: PassengerPayload = serde_json::from_str(&json)?;
                    controller.update_passenger(|p| *p = next)
                }
                Section::Driver => {
                    let next: DriverPayload = serde_json::from_str(&json)?;
                    controller.update_driver(|p| *p = next)
                }
                Section::Admin => {
                    let next: AdminPayload = serde_json::from_str(&json)?;
                    controller.update_admin(|p| *p = next)
                }
                Section::None => return Err("the neutral section has no payload".into()),
            };
            print_json(&ActionReport {
                accepted,
                outcome: controller.session(),
            })?;
        }
        Commands::Reset => {
            controller.boot("/")?;
            print_json(&controller.reset())?;
        }
        Commands::Show => {
            print_json(&store.load())?;
        }
        Commands::Routes { path } => match path {
            Some(path) => {
                let pathname = section_router::routing::parse_target(&path)?;
                let view = routes.resolve(&pathname).map(|entry| entry.view());
                print_json(&serde_json::json!({ "pathname": pathname, "view": view }))?;
            }
            None => {
                let rows: Vec<RouteRow<'_>> = routes
                    .entries()
                    .iter()
                    .map(|entry| RouteRow {
                        pattern: entry.pattern(),
                        view: entry.view(),
                        wildcard: entry.is_wildcard(),
                    })
                    .collect();
                print_json(&rows)?;
            }
        },
        Commands::Load { view, fail } => {
            let loader = DeferredLoader::from_config(Arc::new(MemoryStore::new()), &config.loader);
            let mut registry = ViewRegistry::new(loader);
            let view = ViewKey::new(view);
            registry.register_deferred(view.clone(), failing_importer(fail));

            let mounted = registry.mount(&view, None).await;
            print_json(&mounted)?;
        }
    }

    if let Some(handle) = prometheus {
        eprintln!("{}", handle.render());
    }

    Ok(())
}

/// Importer whose first `failures` attempts fail.
fn failing_importer(failures: u32) -> impl Fn(&ViewKey) -> ImportFuture + Send + Sync {
    let attempts = AtomicU32::new(0);
    move |view: &ViewKey| -> ImportFuture {
        let view = view.clone();
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if attempt < failures {
                Err(BoxError::from(format!("failed to fetch chunk for `{view}`")))
            } else {
                Ok(ViewModule::new(view.clone(), format!("chunk-{}", view.as_str())))
            }
        })
    }
}

fn parse_section(value: &str) -> Result<Section, String> {
    Section::parse(value).ok_or_else(|| format!("unknown section `{value}`"))
}

fn parse_screen(value: &str) -> Result<Screen, String> {
    Screen::from_id(value).ok_or_else(|| format!("unknown screen `{value}`"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
