//! Annotate Export - command line tools for annotated editor-state documents
//!
//! Renders documents to HTML (optionally with a linked footnote section),
//! lists their footnotes, and renumbers footnote references in place.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_model::RenumberReport;
use render_model::{render_footnotes, to_html, RenderConfig, RenderConverter};
use std::path::{Path, PathBuf};
use store::{deserialize, serialize, to_portable, ImportResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "annotate-export", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a document to HTML
    Render {
        /// Editor-state JSON file
        input: PathBuf,
        /// Render footnote bodies beneath their markers
        #[arg(long)]
        expanded: bool,
        /// Link markers to a generated footnote section
        #[arg(long, conflicts_with = "expanded")]
        footnotes: bool,
        /// Render settings as JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the footnotes of a document in order
    Footnotes {
        input: PathBuf,
    },
    /// Renumber footnote references and write the document back
    Renumber {
        input: PathBuf,
        /// Output file, overwrites the input when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Render {
            input,
            expanded,
            footnotes,
            config,
            output,
        } => {
            let mut config = load_render_config(config.as_deref())?;
            config.expand_footnote_bodies |= expanded;
            let html = render(&input, config, footnotes)?;
            write_output(output.as_deref(), &html)
        }
        Command::Footnotes { input } => {
            let loaded = load_document(&input)?;
            for info in doc_model::list_footnotes(&loaded.tree) {
                println!(
                    "{}\t{}\t{}",
                    info.number,
                    info.id,
                    info.preview.unwrap_or_default()
                );
            }
            Ok(())
        }
        Command::Renumber { input, output } => {
            let report = renumber_file(&input, output.as_deref().unwrap_or(input.as_path()))?;
            tracing::info!(
                count = report.count,
                changed = report.changed,
                "Renumbered footnotes"
            );
            Ok(())
        }
    }
}

fn renumber_file(input: &Path, output: &Path) -> Result<RenumberReport> {
    let mut loaded = load_document(input)?;
    let root = loaded.tree.root_id();
    let report = doc_model::renumber(&mut loaded.tree, root);
    let json = serialize(&loaded.tree).context("Failed to serialize document")?;
    write_output(Some(output), &json)?;
    Ok(report)
}

fn render(input: &Path, config: RenderConfig, with_section: bool) -> Result<String> {
    let loaded = load_document(input)?;
    let root = to_portable(&loaded.tree, loaded.tree.root_id())?;

    if with_section {
        Ok(render_footnotes(&root, &config).full_html())
    } else {
        Ok(to_html(&RenderConverter::new(config).render(&root)))
    }
}

fn load_document(path: &Path) -> Result<ImportResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let loaded = deserialize(&json).with_context(|| format!("Failed to load {}", path.display()))?;

    if loaded.has_warnings() {
        tracing::warn!(
            count = loaded.warning_count(),
            "Loaded {} with skipped content",
            path.display()
        );
    }
    Ok(loaded)
}

fn load_render_config(path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read render config {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid render config {}", path.display()))
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}
