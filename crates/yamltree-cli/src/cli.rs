//! yamltree CLI - look up values in a tree of YAML configuration files
//!
//! Usage:
//!   yamltree get mcs.camera.exposure --root /etc/config -n cam=b1
//!   yamltree raw mcs.camera
//!   yamltree which mcs.camera.exposure

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use yamltree_core::{Binding, ConfigTree, Namespace, TreeOptions, Value};

/// yamltree - resolve dotted paths in a tree of YAML files
#[derive(Parser)]
#[command(name = "yamltree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a dotted path and print its value
    Get {
        /// Dotted path to the value (e.g., mcs.camera.exposure)
        path: String,

        #[command(flatten)]
        tree: TreeArgs,

        /// One-off namespace entries for this lookup only (name=value)
        #[arg(short = 'x', long = "extra", value_name = "NAME=VALUE")]
        extra: Vec<Binding>,

        /// Output format: text, json, yaml
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Value to print if the path cannot be resolved
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Print the unparsed YAML file that owns a dotted path
    Raw {
        /// Dotted path
        path: String,

        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Print the filesystem path of the YAML file that owns a dotted path
    Which {
        /// Dotted path
        path: String,

        #[command(flatten)]
        tree: TreeArgs,
    },
}

#[derive(Args)]
struct TreeArgs {
    /// Configuration root directory
    #[arg(short, long, env = "YAMLTREE_ROOT", default_value = ".")]
    root: PathBuf,

    /// Subdirectory of the root to start lookups from (e.g., an actor name)
    #[arg(short, long)]
    top_level: Option<String>,

    /// Namespace entries used to fill placeholders (name=value)
    #[arg(short = 'n', long = "namespace", value_name = "NAME=VALUE")]
    namespace: Vec<Binding>,
}

impl TreeArgs {
    fn build(self) -> ConfigTree {
        let namespace: Namespace = self.namespace.into_iter().collect();
        log::debug!(
            "config root {} (top level: {:?}, {} namespace entries)",
            self.root.display(),
            self.top_level,
            namespace.len()
        );
        ConfigTree::with_options(
            self.root,
            TreeOptions {
                top_level: self.top_level,
                namespace,
            },
        )
    }
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Get {
            path,
            tree,
            extra,
            format,
            default,
        } => cmd_get(tree.build(), &path, extra, &format, default),

        Commands::Raw { path, tree } => cmd_raw(tree.build(), &path),

        Commands::Which { path, tree } => cmd_which(tree.build(), &path),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // records from the `log` facade are forwarded by the subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn cmd_get(
    mut tree: ConfigTree,
    path: &str,
    extra: Vec<Binding>,
    format: &str,
    default: Option<String>,
) -> ExitCode {
    if !matches!(format, "text" | "json" | "yaml") {
        eprintln!("Unsupported format: {}. Use text, json, or yaml.", format);
        return ExitCode::from(2);
    }

    let result = if extra.is_empty() {
        tree.get(path)
    } else {
        let extra: Namespace = extra.into_iter().collect();
        tree.get_with(path, &extra)
    };

    match result {
        Ok(value) => match render(&value, format) {
            Ok(text) => {
                print!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red(), e);
                ExitCode::from(2)
            }
        },
        Err(e) => {
            if let Some(default_val) = default {
                log::info!("using default for '{}': {:?}", path, e.kind);
                println!("{}", default_val);
                ExitCode::SUCCESS
            } else {
                eprintln!("{} {}", "✗".red(), e);
                ExitCode::from(1)
            }
        }
    }
}

fn render(value: &Value, format: &str) -> Result<String, String> {
    match format {
        "json" => serde_json::to_string_pretty(value)
            .map(|s| s + "\n")
            .map_err(|e| e.to_string()),
        "yaml" => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        _ => match value {
            Value::Sequence(_) | Value::Mapping(_) => {
                serde_yaml::to_string(value).map_err(|e| e.to_string())
            }
            scalar => Ok(format!("{}\n", scalar)),
        },
    }
}

fn cmd_raw(tree: ConfigTree, path: &str) -> ExitCode {
    match tree.raw_config(path) {
        Ok(text) => {
            print!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            ExitCode::from(1)
        }
    }
}

fn cmd_which(mut tree: ConfigTree, path: &str) -> ExitCode {
    match tree.source(path) {
        Ok(file) => {
            println!("{}", file.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            ExitCode::from(1)
        }
    }
}
