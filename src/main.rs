use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use filetree::{
    normalize_forest, Config, FileTree, Filters, JsTreeWidget, Stats, TreeSource,
};

/// Env var holding the log filter (e.g. `FILETREE_LOG=filetree=debug`)
const LOG_ENV: &str = "FILETREE_LOG";

#[derive(Parser, Debug)]
#[command(name = "filetree")]
#[command(author, version, about = "Browse and select the extracted files of an analysis report")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the tree viewer in the browser
    Serve {
        /// Report tree file (JSON)
        report: PathBuf,

        /// Port to listen on (default: config, then 3003)
        #[arg(short, long)]
        port: Option<u16>,

        /// Id of the tree element in the viewer page
        #[arg(long)]
        target: Option<String>,

        /// The file already holds widget nodes
        #[arg(long)]
        prenormalized: bool,
    },

    /// Browse the tree in the terminal; Enter prints the selection
    Tui {
        /// Report tree file (JSON)
        report: PathBuf,

        /// The file already holds widget nodes
        #[arg(long)]
        prenormalized: bool,
    },

    /// Write the normalized tree as JSON
    Export {
        /// Report tree file (JSON)
        report: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Raw mime and magic instead of the human-readable ones
        #[arg(long)]
        raw: bool,

        /// Leave duplicates checked when their suffix checks them
        #[arg(long)]
        keep_duplicates: bool,

        /// Export the full widget configuration instead of the data only
        #[arg(long)]
        config: bool,
    },

    /// Count files, containers, executables, duplicates and directories
    Stats {
        /// Report tree file (JSON)
        report: PathBuf,

        /// Raw mime and magic instead of the human-readable ones
        #[arg(long)]
        raw: bool,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate for
        shell: Shell,
    },
}

/// `filetree export` output
#[derive(Serialize)]
struct ExportEnvelope {
    generated_at: String,
    source: String,
    filters: Filters,
    stats: Stats,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<serde_json::Value>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal; only log there when explicitly asked to
    let is_tui = matches!(cli.command, Command::Tui { .. });
    if !is_tui || std::env::var_os(LOG_ENV).is_some() {
        init_logging(cli.verbose)?;
    }

    let config = Config::load();

    match cli.command {
        Command::Serve {
            report,
            port,
            target,
            prenormalized,
        } => {
            let source = load_source(&report, prenormalized)?;
            let target = target.unwrap_or_else(|| config.server.target.clone());
            let port = port.unwrap_or(config.server.port);
            let tree = FileTree::new(target, source, JsTreeWidget::new()).with_filters(config.filters);
            filetree::serve::start_tree_server(port, tree).context("tree viewer failed")?;
        }

        Command::Tui {
            report,
            prenormalized,
        } => {
            let selection = filetree::tui::run(report, prenormalized, &config)
                .map_err(|e| anyhow!("tui error: {}", e))?;
            if let Some(selected) = selection {
                println!("{}", serde_json::to_string_pretty(&selected)?);
            }
        }

        Command::Export {
            report,
            output,
            raw,
            keep_duplicates,
            config: full_config,
        } => {
            let filters = cli_filters(config.filters, raw, keep_duplicates);
            let source = load_source(&report, false)?;
            let mut tree = FileTree::new(config.server.target.clone(), source, JsTreeWidget::new())
                .with_filters(filters);
            tree.draw(&config.preferences)?;

            let widget = tree.widget();
            let envelope = ExportEnvelope {
                generated_at: Local::now().to_rfc3339(),
                source: report.display().to_string(),
                filters: *tree.filters(),
                stats: *tree.stats(),
                data: (!full_config).then(|| widget.data_document()),
                config: if full_config { widget.config_document() } else { None },
            };
            let json = serde_json::to_string_pretty(&envelope)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!(
                        "{} {} nodes to {}",
                        "Exported".green(),
                        filetree::node::forest_count(widget.data()),
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }

        Command::Stats { report, raw, json } => {
            let filters = cli_filters(config.filters, raw, false);
            let forest = filetree::report::load_forest(&report)
                .with_context(|| format!("failed to load {}", report.display()))?;
            let (_, stats) = normalize_forest(&forest, &filters);

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&report, &stats);
            }
        }

        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "filetree", &mut io::stdout());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "filetree=debug" } else { "filetree=warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {}", e))
}

fn load_source(path: &Path, prenormalized: bool) -> Result<TreeSource> {
    TreeSource::load(path, prenormalized).with_context(|| format!("failed to load {}", path.display()))
}

/// Config filters adjusted by the command-line switches
fn cli_filters(base: Filters, raw: bool, keep_duplicates: bool) -> Filters {
    let mut filters = base;
    if raw {
        filters.set_simplify(false);
    }
    if keep_duplicates {
        filters.deselect_duplicates = false;
    }
    filters
}

fn print_stats(report: &Path, stats: &Stats) {
    println!("{} {}", "filetree".bold().green(), report.display());
    println!("  {:<12} {}", "Files:", stats.files.to_string().bold());
    println!("  {:<12} {}", "Containers:", stats.containers.to_string().magenta());
    println!("  {:<12} {}", "Executables:", stats.executables.to_string().red());
    println!("  {:<12} {}", "Duplicates:", stats.duplicates.to_string().dimmed());
    println!("  {:<12} {}", "Directories:", stats.directories.to_string().cyan());
}
