//! PosterKit CLI: inspect and tidy poster templates from the command line.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pk_core::lint::{LintSeverity, lint_elements};
use pk_core::model::ElementType;
use pk_core::template;
use pk_core::{StoreConfig, default_element};
use pk_editor::{ElementMutation, ElementStore, LayerNode, layer_tree};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "posterkit")]
#[command(about = "Inspect and normalize poster templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report structural problems (dangling groups, stray masks, ...)
    Lint {
        file: PathBuf,
    },

    /// Print the layer tree
    Tree {
        file: PathBuf,
    },

    /// Re-derive dependent fields (square sides, line points, pen size)
    Normalize {
        file: PathBuf,
        /// Overwrite the input file
        #[arg(long, conflicts_with = "output")]
        in_place: bool,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a JSON array of mutations to a template and print the result
    Apply {
        file: PathBuf,
        mutations: PathBuf,
    },

    /// Print a freshly defaulted element of the given kind
    Default {
        kind: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Lint { file } => lint(&file),
        Commands::Tree { file } => tree(&file),
        Commands::Normalize {
            file,
            in_place,
            output,
        } => {
            let target = if in_place { Some(file.clone()) } else { output };
            normalize(&file, target.as_deref())
        }
        Commands::Apply { file, mutations } => apply(&file, &mutations),
        Commands::Default { kind } => {
            let Some(ty) = ElementType::from_name(&kind) else {
                bail!("unknown element kind {kind:?}");
            };
            let element = default_element(ty, &StoreConfig::default());
            println!("{}", serde_json::to_string_pretty(&element)?);
            Ok(())
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn lint(path: &Path) -> Result<()> {
    let elements = template::parse_elements(&read(path)?)
        .with_context(|| format!("parsing {}", path.display()))?;
    let diagnostics = lint_elements(&elements);

    for d in &diagnostics {
        let level = match d.severity {
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        };
        println!("{level}[{}] {}: {}", d.rule, d.element_id, d.message);
    }
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == LintSeverity::Warning)
        .count();
    if warnings > 0 {
        bail!("{warnings} warning(s) in {}", path.display());
    }
    if diagnostics.is_empty() {
        println!("{}: ok ({} elements)", path.display(), elements.len());
    }
    Ok(())
}

fn tree(path: &Path) -> Result<()> {
    let doc = template::from_json(&read(path)?)
        .with_context(|| format!("loading {}", path.display()))?;
    fn print(nodes: &[LayerNode], depth: usize) {
        for node in nodes {
            let mask = if node.is_clipping_mask { " [mask]" } else { "" };
            println!(
                "{:indent$}{} ({}, {}){mask}",
                "",
                node.label,
                node.element_type.name(),
                node.id,
                indent = depth * 2
            );
            print(&node.children, depth + 1);
        }
    }
    print(&layer_tree(&doc), 0);
    Ok(())
}

fn normalize(path: &Path, output: Option<&Path>) -> Result<()> {
    let doc = template::from_json(&read(path)?)
        .with_context(|| format!("loading {}", path.display()))?;
    let (normalized, changed) = template::normalize_document(&doc);
    log::info!("normalized {changed} of {} elements", normalized.len());

    let json = template::to_json_pretty(&normalized)?;
    match output {
        Some(out) => {
            std::fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;
            eprintln!("{changed} element(s) updated, wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn apply(path: &Path, mutations: &Path) -> Result<()> {
    let doc = template::from_json(&read(path)?)
        .with_context(|| format!("loading {}", path.display()))?;
    let mutations: Vec<ElementMutation> = serde_json::from_str(&read(mutations)?)
        .with_context(|| format!("parsing {}", mutations.display()))?;

    let mut store = ElementStore::with_document(doc, StoreConfig::default());
    for (i, mutation) in mutations.into_iter().enumerate() {
        if !store.apply_mutation(mutation) {
            log::warn!("mutation {i} left the document unchanged");
        }
    }
    println!("{}", template::to_json_pretty(store.document())?);
    Ok(())
}
