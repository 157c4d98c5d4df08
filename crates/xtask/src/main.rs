use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;

use altscript_scripting_host::config::ScriptingConfig;
use altscript_scripting_host::logging::init_logging;
use altscript_scripting_host::{generate_docs, registry};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the script interface listing (<module>Docs.as)
    Docs {
        /// Namespace of the listing (default: from config, else "alt")
        #[arg(long)]
        module: Option<String>,
        /// Output directory (default: from config, else <project root>/docs)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the host events scripts can subscribe to
    Events,
}

fn main() -> Result<()> {
    let _guard = init_logging("xtask", false)?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Docs { module, out } => write_docs(module, out)?,
        Commands::Events => list_events(),
    }

    Ok(())
}

fn project_root() -> Result<PathBuf> {
    match env::var("CARGO_MANIFEST_DIR") {
        // CARGO_MANIFEST_DIR points to crates/xtask, so get parent twice
        Ok(manifest_dir) => PathBuf::from(manifest_dir)
            .parent()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .ok_or_else(|| anyhow::anyhow!("Could not determine project root")),
        // Fallback: assume current dir is project root
        Err(_) => Ok(env::current_dir()?),
    }
}

fn write_docs(module: Option<String>, out: Option<PathBuf>) -> Result<()> {
    let config = ScriptingConfig::load_or_default();
    let module = module.unwrap_or_else(|| config.docs_module.clone());
    let out = match out.or_else(|| config.docs_dir.clone()) {
        Some(dir) => dir,
        None => project_root()?.join("docs"),
    };

    let docs = generate_docs(&module).context("Failed to collect script declarations")?;
    let path = docs
        .write_to(&out)
        .with_context(|| format!("Failed to write docs to {}", out.display()))?;

    tracing::info!(
        "Wrote {} funcdefs, {} functions and {} events to {}",
        docs.funcdefs().len(),
        docs.declarations().len(),
        docs.event_declarations().len(),
        path.display()
    );
    Ok(())
}

fn list_events() {
    for descriptor in registry().descriptors() {
        println!(
            "{:>4}  {}",
            descriptor.event_type.to_discriminant(),
            descriptor.funcdef_decl()
        );
    }
}
