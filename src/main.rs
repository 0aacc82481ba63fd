use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use prompt_builder::config::AppConfig;
use prompt_builder::core::{Document, KindRegistry};
use prompt_builder::render::collect_injectable_files;
use prompt_builder::render::ignore::{find_gitignore, merge_patterns, parse_gitignore};
use prompt_builder::runtime::compile_document;
use prompt_builder::store::{export_document, import_document, PromptStore};
use prompt_builder::telemetry;

#[derive(Parser)]
#[command(name = "prompt-builder")]
#[command(about = "Compose prompts from message, file and folder tree blocks")]
#[command(version)]
struct Cli {
    /// Config file (default: ./prompt-builder.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Prompt database, overriding the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a document file or a saved prompt
    Compile {
        /// Document JSON file
        file: Option<PathBuf>,
        /// Compile the prompt saved under this name instead
        #[arg(long, conflicts_with = "file")]
        saved: Option<String>,
        /// Write the prompt here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Save a document file under a name
    Save { name: String, file: PathBuf },
    /// Print or export a saved prompt
    Load {
        name: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List saved prompts, most recent first
    List,
    /// Delete a saved prompt
    Delete { name: String },
    /// List available block kinds
    Kinds,
    /// List files a folder tree block could inject
    InjectCandidates {
        dir: PathBuf,
        /// Comma-separated globs to skip
        #[arg(long, default_value = "")]
        ignore: String,
    },
    /// Merge the project's .gitignore into a document's global ignore list
    ImportGitignore { file: PathBuf },
    /// Create a new document
    New {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?.with_env();
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    telemetry::init(&config.log_filter)?;

    let registry = KindRegistry::with_builtins();
    let report = registry.load_from_dir(&config.plugins_dir);
    if !report.is_clean() {
        tracing::warn!(failed = report.failed.len(), "some plugin kinds could not be loaded");
    }

    match cli.command {
        Commands::Compile { file, saved, out } => {
            let state = match (file, saved) {
                (Some(file), _) => import_document(&file)?,
                (None, Some(name)) => open_store(&config)?
                    .load(&name)?
                    .with_context(|| format!("no saved prompt named `{}`", name))?,
                (None, None) => bail!("give a document file or --saved NAME"),
            };
            let document = Document::from_state(&state, &registry);
            let compiled = compile_document(&document, &registry);
            tracing::info!(
                chars = compiled.char_count(),
                compiled = compiled.diagnostics.compiled,
                missing = compiled.diagnostics.missing_kinds,
                errors = compiled.diagnostics.errors,
                "prompt compiled"
            );
            write_output(out.as_deref(), &compiled.text)?;
        }
        Commands::Save { name, file } => {
            let state = import_document(&file)?;
            let document = Document::from_state(&state, &registry);
            let outcome = open_store(&config)?.save(&name, &document.get_state(&registry));
            if !outcome.success {
                bail!("save failed: {}", outcome.message);
            }
            println!("{}", outcome.message);
        }
        Commands::Load { name, out } => {
            let state = open_store(&config)?
                .load(&name)?
                .with_context(|| format!("no saved prompt named `{}`", name))?;
            match out {
                Some(path) => export_document(&path, &state)?,
                None => println!("{}", serde_json::to_string_pretty(&state)?),
            }
        }
        Commands::List => {
            let prompts = open_store(&config)?.list()?;
            if prompts.is_empty() {
                println!("No saved prompts.");
            }
            for prompt in prompts {
                println!("{:>4}  {:<32} {}", prompt.id, prompt.name, prompt.updated_at);
            }
        }
        Commands::Delete { name } => {
            if open_store(&config)?.delete(&name)? {
                println!("Deleted `{}`.", name);
            } else {
                bail!("no saved prompt named `{}`", name);
            }
        }
        Commands::Kinds => {
            for kind in registry.all_kinds() {
                let meta = kind.metadata();
                let drags: Vec<&str> = meta.drag_types.iter().map(|d| d.as_str()).collect();
                println!("{:<20} {:<16} [{}] {}", meta.id, meta.name, drags.join(", "), meta.description);
            }
        }
        Commands::InjectCandidates { dir, ignore } => {
            if !dir.is_dir() {
                bail!("{} is not a directory", dir.display());
            }
            for file in collect_injectable_files(&dir, &ignore) {
                println!("{}", file.display());
            }
        }
        Commands::ImportGitignore { file } => {
            let state = import_document(&file)?;
            let mut document = Document::from_state(&state, &registry);
            let start = if document.project_root.is_empty() {
                PathBuf::from(".")
            } else {
                PathBuf::from(&document.project_root)
            };
            let gitignore = find_gitignore(&start)
                .with_context(|| format!("no .gitignore at or above {}", start.display()))?;
            let patterns = parse_gitignore(&gitignore)
                .with_context(|| format!("cannot read {}", gitignore.display()))?;
            let (merged, added) = merge_patterns(&document.settings.global_ignore, &patterns);
            document.settings.global_ignore = merged;
            export_document(&file, &document.get_state(&registry))?;
            println!("Added {} pattern(s) from {}.", added, gitignore.display());
        }
        Commands::New { out } => {
            let mut document = Document::new(&registry);
            document.settings = config.defaults.to_settings();
            let state = document.get_state(&registry);
            match out {
                Some(path) => export_document(&path, &state)?,
                None => println!("{}", serde_json::to_string_pretty(&state)?),
            }
        }
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> anyhow::Result<PromptStore> {
    PromptStore::open(&config.database_path)
        .with_context(|| format!("cannot open database {}", config.database_path.display()))
}

fn write_output(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => fs::write(path, text).with_context(|| format!("cannot write {}", path.display())),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
