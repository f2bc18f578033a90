//! opscope CLI - locate an operator's definition and every call site

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use opscope::collector::{Collection, ModuleCollector};
use opscope::config::{self, OpscopeConfig};
use opscope::output::is_quiet;
use opscope::registry::discover_registry;
use opscope::resolver;
use opscope::ui;
use opscope::{FsPackageHost, Finder, Identifier, InMemoryRegistry, Report, SymbolRegistry};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "opscope")]
#[command(version = "0.1.0")]
#[command(about = "Find where an operator is defined and every place that calls it")]
#[command(long_about = r#"
opscope resolves an operator identifier (category.command) to the class that
implements it, then scans every collected module for call sites:
  • attribute calls such as bpy.ops.mesh.primitive_cube_add()
  • string registrations such as layout.operator("mesh.primitive_cube_add")

Example usage:
  opscope init
  opscope find mesh.primitive_cube_add --path ./addons
  opscope find bpy.ops.text.edit_operator --root my_addon --format json
  opscope def my_addon.do_thing
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./opscope.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an identifier and list its call sites
    Find {
        /// Operator identifier, optionally qualified (bpy.ops.cat.cmd)
        identifier: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: Format,
    },

    /// Print the editable definition of an identifier as file:line
    Def {
        /// Operator identifier, optionally qualified (bpy.ops.cat.cmd)
        identifier: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// List every registered identifier
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: Format,
    },

    /// Write a default opscope.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct ScopeArgs {
    /// Directory holding the packages to scan
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Root package to scan (repeatable; defaults to every top-level package)
    #[arg(short, long = "root")]
    roots: Vec<String>,

    /// Dotted module prefix to skip (repeatable)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Gitignore-style pattern hidden from package listings (repeatable)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Registry manifest (TOML or JSON); discovered from sources when absent
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Human,
    Json,
}

/// Config file values with command-line flags applied on top
struct Settings {
    search_path: PathBuf,
    roots: Vec<String>,
    exclude: Vec<String>,
    ignore: Vec<String>,
    manifest: Option<PathBuf>,
    builtins: Vec<Identifier>,
}

impl Settings {
    fn merge(config: OpscopeConfig, args: ScopeArgs) -> anyhow::Result<Self> {
        let builtins = config
            .builtins
            .iter()
            .map(|text| Identifier::parse(text))
            .collect::<opscope::Result<Vec<_>>>()
            .context("invalid builtin identifier in config")?;

        Ok(Self {
            search_path: args
                .path
                .or(config.search_path.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(".")),
            roots: if args.roots.is_empty() {
                config.roots
            } else {
                args.roots
            },
            exclude: config.exclude.into_iter().chain(args.exclude).collect(),
            ignore: config.ignore.into_iter().chain(args.ignore).collect(),
            manifest: args.manifest.or(config.manifest.map(PathBuf::from)),
            builtins,
        })
    }
}

/// Host, collected modules and registry for one invocation
struct Workspace {
    host: FsPackageHost,
    collection: Collection,
    registry: InMemoryRegistry,
}

impl Workspace {
    fn open(settings: &Settings) -> anyhow::Result<Self> {
        let host = FsPackageHost::new(&settings.search_path, Some(settings.ignore.as_slice()));
        let collection = ModuleCollector::new(&host)
            .with_exclude(settings.exclude.iter().cloned())
            .enumerate_from(&settings.roots);
        tracing::debug!(
            "Collected {} modules from {}",
            collection.modules.len(),
            settings.search_path.display()
        );

        let registry = match &settings.manifest {
            Some(path) => {
                let mut registry = InMemoryRegistry::load_manifest(path)
                    .with_context(|| format!("failed to load manifest {}", path.display()))?;
                for identifier in &settings.builtins {
                    registry.register_builtin(identifier);
                }
                registry
            }
            None => discover_registry(&collection.modules, &settings.builtins),
        };
        tracing::debug!("Registry holds {} identifiers", registry.len());

        Ok(Self {
            host,
            collection,
            registry,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);

    match cli.command {
        Commands::Find {
            identifier,
            scope,
            format,
        } => {
            let identifier = Identifier::from_qualified(&identifier)?;
            let settings = Settings::merge(load_or_default(&config_path)?, scope)?;
            let workspace = Workspace::open(&settings)?;

            let report = Finder::new(&workspace.registry, &workspace.host)
                .find_in(&identifier, &workspace.collection);

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                Format::Human => print_report(&report),
            }
        }

        Commands::Def { identifier, scope } => {
            let identifier = Identifier::from_qualified(&identifier)?;
            let settings = Settings::merge(load_or_default(&config_path)?, scope)?;
            let workspace = Workspace::open(&settings)?;

            let location = resolver::definition(&workspace.registry, &identifier)?;
            let path = location
                .file_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            match location.line {
                Some(line) => println!("{}:{}", path, line),
                None => println!("{}", path),
            }
        }

        Commands::List { scope, format } => {
            let settings = Settings::merge(load_or_default(&config_path)?, scope)?;
            let workspace = Workspace::open(&settings)?;
            let identifiers = workspace.registry.identifiers();

            match format {
                Format::Json => {
                    let locations: Vec<_> = identifiers
                        .iter()
                        .map(|id| resolver::resolve(&workspace.registry, id).location)
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&locations)?);
                }
                Format::Human => {
                    if !is_quiet() {
                        ui::header(&format!("{} registered operators", identifiers.len()));
                    }
                    for id in &identifiers {
                        let location = resolver::resolve(&workspace.registry, id).location;
                        let origin = ui::origin(location.origin_kind);
                        match location.type_name {
                            Some(type_name) => {
                                println!("  {} {} {}", id, ui::dim(&type_name), origin)
                            }
                            None => println!("  {} {}", id, origin),
                        }
                    }
                }
            }
        }

        Commands::Init { force } => {
            let defaults = OpscopeConfig {
                search_path: Some(".".to_string()),
                ..OpscopeConfig::default()
            };
            config::write_config(&config_path, &defaults, force)?;
            if !is_quiet() {
                ui::success(&format!("Wrote {}", config_path.display()));
            }
        }
    }

    Ok(())
}

fn load_or_default(path: &std::path::Path) -> anyhow::Result<OpscopeConfig> {
    let loaded = config::load_config(Some(path))
        .with_context(|| format!("failed to read config {}", path.display()))?;
    if loaded.is_some() {
        tracing::debug!("Loaded config from {}", path.display());
    }
    Ok(loaded.unwrap_or_default())
}

fn print_report(report: &Report) {
    // Quiet mode prints bare locations, one per line
    if is_quiet() {
        for call in &report.matches {
            println!("{}:{}:{}", call.file_path.display(), call.line, call.column);
        }
        return;
    }

    ui::header(&format!("{} ({})", report.identifier, ui::origin(report.origin_kind)));
    if let Some(definition) = &report.definition {
        let path = definition
            .file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        ui::location("Defined in", &path, definition.line);
        if let Some(type_name) = &definition.type_name {
            ui::info("Type", type_name);
        }
    }

    ui::section("Call sites");
    if report.matches.is_empty() {
        println!("  {}", ui::muted("no call sites found"));
    } else {
        println!("{}", ui::call_table(&report.matches));
    }

    ui::section("Summary");
    let scanned = report.modules_scanned.to_string();
    let skipped = report.modules_skipped.to_string();
    let calls = report.matches.len().to_string();
    println!(
        "{}",
        ui::stats_table(&[
            ("Modules scanned", scanned.as_str()),
            ("Modules skipped", skipped.as_str()),
            ("Call sites", calls.as_str()),
        ])
    );

    for diagnostic in &report.diagnostics {
        ui::diagnostic(diagnostic);
    }
}
