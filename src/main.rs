use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use component_registry::snapshot::{decode_backup, encode_backup};
use component_registry::{
    BulkAction, ChangeId, ComponentFilter, ComponentId, ComponentKind, ComponentPatch,
    ComponentStatus, ExportDocument, FjallSnapshotStore, NewComponent, Registry, RegistryError,
    RegistryState, RegistryStats, RollbackPolicy, SnapshotError, SnapshotService, SnapshotStore,
};

/// Key holding the working registry between CLI invocations.
const WORKSPACE_KEY: &str = "workspace";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Snapshot(#[from] SnapshotError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Registry not initialized at {0}; run `component-registry init` first")]
    NotInitialized(String),

    #[error("Stored workspace is unreadable: {0}")]
    CorruptWorkspace(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),
}

#[derive(Parser)]
#[command(name = "component-registry")]
#[command(about = "Track components with an append-only change log, rollback, locking, and backups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct StoreArgs {
    /// Store path
    #[arg(
        long,
        default_value = ".component-registry",
        env = "COMPONENT_REGISTRY_PATH"
    )]
    path: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new registry store
    Init {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Add a component
    Add {
        /// Display name
        name: String,

        #[arg(long, value_enum, default_value_t = ComponentKind::Component)]
        kind: ComponentKind,

        #[arg(long, value_enum, default_value_t = ComponentStatus::Active)]
        status: ComponentStatus,

        /// Size in KB
        #[arg(long, default_value_t = 0.0)]
        size: f64,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long = "component-version", default_value = "1.0.0")]
        version: String,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Id of a component this one depends on (repeatable)
        #[arg(long = "depends-on")]
        dependencies: Vec<String>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Remove a component
    Remove {
        id: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Update fields of a component
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_enum)]
        kind: Option<ComponentKind>,

        #[arg(long, value_enum)]
        status: Option<ComponentStatus>,

        #[arg(long)]
        size: Option<f64>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long = "component-version")]
        version: Option<String>,

        /// Replace the tag set (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Flip a component between active and inactive
    Toggle {
        id: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Rename a component
    Rename {
        id: String,
        name: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Lock the registry against changes
    Lock {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Unlock the registry
    Unlock {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Restore the component captured by a change record
    Rollback {
        /// Change id as shown by `log`
        change: u64,

        /// Fail if the registry is locked
        #[arg(long)]
        respect_lock: bool,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Apply one action to several components
    Bulk {
        #[arg(value_enum)]
        action: BulkAction,

        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// List components
    List {
        /// Match name, description, or tags (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        #[arg(long, value_enum)]
        kind: Option<ComponentKind>,

        #[arg(long, value_enum)]
        status: Option<ComponentStatus>,

        /// Print JSON instead of one line per component
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show one component as JSON
    Show {
        id: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show the change log, newest first
    Log {
        /// Maximum number of records to show
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show registry statistics
    Stats {
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Store a backup of the current registry
    Backup {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// List stored backups
    Backups {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Replace the registry with a stored backup
    Restore {
        key: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Export the registry as JSON
    Export {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Replace the registry with an exported JSON document
    Import {
        file: PathBuf,

        #[command(flatten)]
        store: StoreArgs,
    },
}

/// The registry as persisted between invocations, plus its snapshot service.
struct Workspace {
    store: Arc<FjallSnapshotStore>,
    snapshots: SnapshotService,
}

impl Workspace {
    fn init(path: &Path) -> Result<(), AppError> {
        let store = FjallSnapshotStore::init(path)?;
        let document = ExportDocument::from_state(&RegistryState::new(), 0);
        store.put(WORKSPACE_KEY, &encode_backup(&document)?)?;
        Ok(())
    }

    fn open(path: &Path, policy: RollbackPolicy) -> Result<Self, AppError> {
        let store = match FjallSnapshotStore::open(path) {
            Ok(store) => Arc::new(store),
            Err(SnapshotError::NotInitialized(p)) => return Err(AppError::NotInitialized(p)),
            Err(e) => return Err(e.into()),
        };
        let blob = store
            .get(WORKSPACE_KEY)?
            .ok_or_else(|| AppError::NotInitialized(path.display().to_string()))?;
        let state = decode_backup(&blob)
            .map_err(AppError::CorruptWorkspace)?
            .into_state()
            .map_err(|e| AppError::CorruptWorkspace(e.to_string()))?;

        let registry = Arc::new(Registry::from_state(state).with_rollback_policy(policy));
        let snapshots = SnapshotService::new(registry, store.clone());
        Ok(Self { store, snapshots })
    }

    fn registry(&self) -> &Registry {
        self.snapshots.registry()
    }

    fn save(&self) -> Result<(), AppError> {
        let document = self.snapshots.export_project();
        self.store.put(WORKSPACE_KEY, &encode_backup(&document)?)?;
        Ok(())
    }
}

fn open(store: &StoreArgs) -> Result<Workspace, AppError> {
    Workspace::open(&store.path, RollbackPolicy::default())
}

fn print_stats(stats: &RegistryStats) {
    println!("Components: {} ({} active)", stats.component_count, stats.active_count);
    for (kind, count) in &stats.by_kind {
        println!("  {}: {}", kind, count);
    }
    println!("Total size: {:.2} KB", stats.total_size);
    println!("Changes: {}", stats.change_count);
    println!("Backups: {}", stats.backup_count);
    println!("Locked: {}", if stats.is_locked { "yes" } else { "no" });
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { store } => {
            Workspace::init(&store.path)?;
            println!("Initialized registry at {}", store.path.display());
            Ok(())
        }
        Commands::Add {
            name,
            kind,
            status,
            size,
            description,
            version,
            tags,
            dependencies,
            store,
        } => {
            let ws = open(&store)?;
            let spec = NewComponent::new(name, kind)
                .with_status(status)
                .with_size(size)
                .with_description(description)
                .with_version(version)
                .with_tags(tags)
                .with_dependencies(dependencies.into_iter().map(ComponentId::from));
            let component = ws.registry().add_component(spec)?;
            ws.save()?;
            println!("Added {} '{}' ({})", component.kind, component.name, component.id);
            Ok(())
        }
        Commands::Remove { id, store } => {
            let ws = open(&store)?;
            let removed = ws.registry().remove_component(&ComponentId::from(id))?;
            ws.save()?;
            println!("Removed {} '{}'", removed.kind, removed.name);
            Ok(())
        }
        Commands::Update {
            id,
            name,
            kind,
            status,
            size,
            description,
            version,
            tags,
            store,
        } => {
            let ws = open(&store)?;
            let patch = ComponentPatch {
                name,
                kind,
                status,
                size,
                description,
                version,
                tags: (!tags.is_empty()).then(|| tags.into_iter().collect()),
                ..ComponentPatch::default()
            };
            let component = ws.registry().update_component(&ComponentId::from(id), patch)?;
            ws.save()?;
            println!("Updated '{}'", component.name);
            Ok(())
        }
        Commands::Toggle { id, store } => {
            let ws = open(&store)?;
            let component = ws.registry().toggle_status(&ComponentId::from(id))?;
            ws.save()?;
            println!("'{}' is now {}", component.name, component.status);
            Ok(())
        }
        Commands::Rename { id, name, store } => {
            let ws = open(&store)?;
            let component = ws.registry().rename_component(&ComponentId::from(id), name)?;
            ws.save()?;
            println!("Renamed to '{}'", component.name);
            Ok(())
        }
        Commands::Lock { store } => {
            let ws = open(&store)?;
            ws.registry().lock();
            ws.save()?;
            println!("Registry locked");
            Ok(())
        }
        Commands::Unlock { store } => {
            let ws = open(&store)?;
            ws.registry().unlock();
            ws.save()?;
            println!("Registry unlocked");
            Ok(())
        }
        Commands::Rollback {
            change,
            respect_lock,
            store,
        } => {
            let ws = Workspace::open(&store.path, RollbackPolicy::from_respect_lock(respect_lock))?;
            let restored = ws.registry().rollback(ChangeId::new(change))?;
            ws.save()?;
            println!("Restored {} '{}' ({})", restored.kind, restored.name, restored.id);
            Ok(())
        }
        Commands::Bulk { action, ids, store } => {
            let ws = open(&store)?;
            let ids: Vec<ComponentId> = ids.into_iter().map(ComponentId::from).collect();
            let report = ws.registry().bulk_action(&ids, action)?;
            ws.save()?;
            println!("{}: {} applied, {} skipped", action, report.applied.len(), report.skipped.len());
            for skip in &report.skipped {
                eprintln!("  Skipped '{}': {:?}", skip.id, skip.reason);
            }
            Ok(())
        }
        Commands::List {
            search,
            kind,
            status,
            json,
            store,
        } => {
            let ws = open(&store)?;
            let filter = ComponentFilter {
                search,
                kind,
                status,
            };
            let components = ws.registry().components(&filter);
            if json {
                println!("{}", serde_json::to_string_pretty(&components)?);
            } else if components.is_empty() {
                println!("No components found");
            } else {
                for c in components {
                    println!(
                        "{}  {:<10} {:<10} {:>8.2} KB  {} (v{})",
                        c.id, c.kind, c.status, c.size, c.name, c.version
                    );
                }
            }
            Ok(())
        }
        Commands::Show { id, store } => {
            let ws = open(&store)?;
            let component = ws
                .registry()
                .component(&ComponentId::from(id.as_str()))
                .ok_or(AppError::ComponentNotFound(id))?;
            println!("{}", serde_json::to_string_pretty(&component)?);
            Ok(())
        }
        Commands::Log { limit, store } => {
            let ws = open(&store)?;
            let changes = ws.registry().changes();
            if changes.is_empty() {
                println!("No changes recorded");
            }
            for record in changes.iter().take(limit.unwrap_or(usize::MAX)) {
                println!(
                    "{:>5} {:<9} {}{}",
                    record.id.to_string(),
                    record.kind,
                    record.description,
                    if record.is_reversible() { "  [reversible]" } else { "" }
                );
            }
            Ok(())
        }
        Commands::Stats { json, store } => {
            let ws = open(&store)?;
            let stats = ws.registry().stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats);
            }
            Ok(())
        }
        Commands::Backup { store } => {
            let ws = open(&store)?;
            let info = ws.snapshots.create_backup()?;
            ws.save()?;
            println!("Created backup {} (#{})", info.key, info.backup_count);
            Ok(())
        }
        Commands::Backups { store } => {
            let ws = open(&store)?;
            let keys = ws.snapshots.list_backups()?;
            if keys.is_empty() {
                println!("No backups found");
            } else {
                for key in keys {
                    println!("{}", key);
                }
            }
            Ok(())
        }
        Commands::Restore { key, store } => {
            let ws = open(&store)?;
            let stats = ws.snapshots.restore_backup(&key)?;
            ws.save()?;
            println!("Restored backup {}", key);
            print_stats(&stats);
            Ok(())
        }
        Commands::Export { output, store } => {
            let ws = open(&store)?;
            let json = ws.snapshots.export_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &json)?;
                    println!("Exported registry to {}", path.display());
                }
                None => println!("{}", json),
            }
            Ok(())
        }
        Commands::Import { file, store } => {
            let ws = open(&store)?;
            let input = std::fs::read_to_string(&file)?;
            let stats = ws.snapshots.import_project(&input)?;
            ws.save()?;
            println!("Imported {}", file.display());
            print_stats(&stats);
            Ok(())
        }
    }
}
