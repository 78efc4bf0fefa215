//! Command-line front end for memtree snapshots.
//!
//! # Responsibility
//! - Inspect and edit JSON tree snapshots from a terminal.
//! - Copy snapshots into and out of the SQLite store.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use memtree_core::db::open_db;
use memtree_core::{
    flatten, init_logging_with_config, MemoryNode, MemoryTree, MemtreeConfig,
    SqliteTreeSnapshotRepository, TreeSnapshotRepository,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "memtree")]
#[command(about = "Inspect and edit memory manager document trees")]
struct Cli {
    /// JSON config file; defaults apply when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off without it
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core health check and version
    Ping,
    /// Print the visible rows of a snapshot
    Show {
        snapshot: PathBuf,
        /// Expand every node instead of only the root
        #[arg(long)]
        expand_all: bool,
        /// Spaces per depth level
        #[arg(long, default_value = "2")]
        indent: u16,
    },
    /// Add a document; creates the snapshot file when missing
    Add {
        snapshot: PathBuf,
        #[arg(long, default_value = "/")]
        parent: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Delete a document and its subtree
    Remove {
        snapshot: PathBuf,
        #[arg(long)]
        path: String,
    },
    /// Save a snapshot into a SQLite database
    Persist {
        snapshot: PathBuf,
        #[arg(long)]
        db: PathBuf,
    },
    /// Write the tree stored in a SQLite database to a snapshot file
    Restore {
        snapshot: PathBuf,
        #[arg(long)]
        db: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MemtreeConfig::load(path)
            .with_context(|| format!("failed to load config `{}`", path.display()))?,
        None => MemtreeConfig::default(),
    };
    if let Some(log_dir) = &cli.log_dir {
        init_logging_with_config(&config, log_dir).map_err(anyhow::Error::msg)?;
    }

    match cli.command {
        Commands::Ping => {
            println!("memtree_core ping={}", memtree_core::ping());
            println!("memtree_core version={}", memtree_core::core_version());
        }
        Commands::Show {
            snapshot,
            expand_all,
            indent,
        } => {
            let tree = read_snapshot(&snapshot)?;
            let expanded: HashSet<String> = if expand_all {
                tree.iter().map(|node| node.path.clone()).collect()
            } else if config.expand_root_on_open {
                HashSet::from([memtree_core::ROOT_PATH.to_string()])
            } else {
                HashSet::new()
            };
            for row in flatten(&tree, &expanded) {
                let marker = match (row.has_children, row.is_expanded) {
                    (false, _) => ' ',
                    (true, true) => '-',
                    (true, false) => '+',
                };
                println!(
                    "{:width$}{marker} {}",
                    "",
                    row.node.name,
                    width = row.indent(indent)
                );
            }
        }
        Commands::Add {
            snapshot,
            parent,
            name,
            content,
        } => {
            let tree = if snapshot.exists() {
                read_snapshot(&snapshot)?
            } else {
                MemoryTree::new()
            };
            let name = memtree_core::tree::path::validate_name(&name)?;
            let node = MemoryNode::new_document(&parent, &name, content);
            let created = node.path.clone();
            let next = tree.add_child(&parent, node)?;
            write_snapshot(&snapshot, &next)?;
            info!("event=cli_add module=cli status=ok nodes={}", next.len());
            println!("{created}");
        }
        Commands::Remove { snapshot, path } => {
            let tree = read_snapshot(&snapshot)?;
            let next = tree.delete_subtree(&path)?;
            write_snapshot(&snapshot, &next)?;
            println!("removed {} node(s)", tree.len() - next.len());
        }
        Commands::Persist { snapshot, db } => {
            let tree = read_snapshot(&snapshot)?;
            let conn = open_db(&db)
                .with_context(|| format!("failed to open database `{}`", db.display()))?;
            let repo = SqliteTreeSnapshotRepository::try_new(&conn)?;
            let written = repo.save_tree(&tree)?;
            println!("persisted {written} node(s) to {}", db.display());
        }
        Commands::Restore { snapshot, db } => {
            let conn = open_db(&db)
                .with_context(|| format!("failed to open database `{}`", db.display()))?;
            let repo = SqliteTreeSnapshotRepository::try_new(&conn)?;
            let Some(tree) = repo.load_tree()? else {
                bail!("database `{}` holds no snapshot", db.display());
            };
            write_snapshot(&snapshot, &tree)?;
            println!("restored {} node(s) to {}", tree.len(), snapshot.display());
        }
    }

    Ok(())
}

fn read_snapshot(path: &Path) -> anyhow::Result<MemoryTree> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot `{}`", path.display()))?;
    MemoryTree::from_json(&text)
        .with_context(|| format!("invalid snapshot `{}`", path.display()))
}

fn write_snapshot(path: &Path, tree: &MemoryTree) -> anyhow::Result<()> {
    let json = tree.to_json_pretty()?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write snapshot `{}`", path.display()))
}
