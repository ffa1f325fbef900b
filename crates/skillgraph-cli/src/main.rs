//! Skillgraph CLI - skill extraction and normalization

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use skillgraph_core::commands::{ingest, registry};
use skillgraph_core::config::Config;
use skillgraph_core::entities::EntityExtractor;
use skillgraph_core::llm::LlmClient;
use skillgraph_core::normalization::{
    JsonFileRegistryStore, LlmSkillOracle, RegistryStore, SkillCategory, SkillNormalizer,
    SkillOracle, SkillResolution, UnavailableOracle,
};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "skillgraph")]
#[command(author, version, about = "Skill extraction and normalization for knowledge graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum CategoryArg {
    #[default]
    Hard,
    Soft,
}

impl From<CategoryArg> for SkillCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Hard => SkillCategory::Hard,
            CategoryArg::Soft => SkillCategory::Soft,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize skills against the canonical registry
    Normalize {
        /// Raw skill names
        #[arg(required = true)]
        skills: Vec<String>,
        /// Category used for newly admitted skills
        #[arg(short, long, default_value = "hard")]
        category: CategoryArg,
    },

    /// Inspect and curate the canonical registry
    Registry {
        #[command(subcommand)]
        action: RegistryAction,
    },

    /// Extract and normalize entities from a plain-text document
    Ingest {
        /// Path to a .txt or .md file
        file: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum RegistryAction {
    /// List canonical skills
    List {
        /// Only show skills of this category
        #[arg(short, long)]
        category: Option<CategoryArg>,
    },
    /// Show a skill by name or synonym
    Show { name: String },
    /// Add a canonical skill or extend one with synonyms
    Add {
        name: String,
        #[arg(short, long, default_value = "hard")]
        category: CategoryArg,
        /// Synonym to record (repeatable)
        #[arg(short, long = "synonym")]
        synonyms: Vec<String>,
    },
    /// Print the registry file location
    Path,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
    /// Reset to defaults
    Reset,
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skillgraph=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize { skills, category } => {
            cmd_normalize(&skills, category.into(), cli.format, cli.quiet).await
        }
        Commands::Registry { action } => cmd_registry(action, cli.format, cli.quiet).await,
        Commands::Ingest { file } => cmd_ingest(&file, cli.format, cli.quiet).await,
        Commands::Config { action } => cmd_config(action, cli.quiet),
        Commands::Doctor => cmd_doctor(cli.quiet).await,
    }
}

// ============================================================================
// Wiring
// ============================================================================

fn registry_store(config: &Config) -> anyhow::Result<Arc<JsonFileRegistryStore>> {
    let path = config.normalization.resolved_registry_path()?;
    Ok(Arc::new(JsonFileRegistryStore::new(path)))
}

/// Build the normalizer; without an API key uncertain skills cannot be resolved
fn build_normalizer(config: &Config) -> anyhow::Result<SkillNormalizer> {
    let store = registry_store(config)?;
    let oracle: Arc<dyn SkillOracle> = match LlmClient::from_env(config.llm.clone()) {
        Ok(client) => Arc::new(LlmSkillOracle::new(Arc::new(client))),
        Err(e) => {
            debug!(error = %e, "LLM client unavailable, oracle disabled");
            Arc::new(UnavailableOracle)
        }
    };
    Ok(SkillNormalizer::from_config(
        &config.normalization,
        store,
        oracle,
    ))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_normalize(
    skills: &[String],
    category: SkillCategory,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let normalizer = build_normalizer(&config)?;
    let results = normalizer.normalize_detailed(skills, category).await?;

    match format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Text if quiet => {
            for skill in &results {
                println!("{}", skill.canonical);
            }
        }
        OutputFormat::Text => {
            for skill in &results {
                let how = match &skill.resolution {
                    SkillResolution::Exact => "exact".to_string(),
                    SkillResolution::Fuzzy { score } => format!("fuzzy {:.2}", score),
                    SkillResolution::Oracle => "model".to_string(),
                    SkillResolution::Admitted => "new".to_string(),
                    SkillResolution::Blank => "blank".to_string(),
                };
                println!("{} -> {} ({})", skill.raw, skill.canonical, how);
            }
        }
    }
    Ok(())
}

async fn cmd_registry(
    action: RegistryAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    match action {
        RegistryAction::List { category } => {
            let normalizer = build_normalizer(&config)?;
            let skills = registry::list_skills(&normalizer, category.map(Into::into)).await?;
            match format {
                OutputFormat::Json => print_json(&skills)?,
                OutputFormat::Text => {
                    if skills.is_empty() && !quiet {
                        println!("Registry is empty.");
                    }
                    for skill in &skills {
                        if quiet || skill.synonyms.is_empty() {
                            println!("{} [{}]", skill.name, skill.category);
                        } else {
                            println!(
                                "{} [{}] ({})",
                                skill.name,
                                skill.category,
                                skill.synonyms.join(", ")
                            );
                        }
                    }
                }
            }
        }
        RegistryAction::Show { name } => {
            let normalizer = build_normalizer(&config)?;
            let skill = registry::show_skill(&normalizer, &name).await?;
            match format {
                OutputFormat::Json => print_json(&skill)?,
                OutputFormat::Text => {
                    println!("{}", skill.name);
                    println!("  Category: {}", skill.category);
                    if skill.synonyms.is_empty() {
                        println!("  Synonyms: (none)");
                    } else {
                        println!("  Synonyms: {}", skill.synonyms.join(", "));
                    }
                }
            }
        }
        RegistryAction::Add {
            name,
            category,
            synonyms,
        } => {
            let normalizer = build_normalizer(&config)?;
            let outcome =
                registry::add_skill(&normalizer, &name, category.into(), &synonyms).await?;
            match format {
                OutputFormat::Json => print_json(&outcome)?,
                OutputFormat::Text if !quiet => {
                    if outcome.changed {
                        println!("Registered '{}' [{}]", outcome.skill.name, outcome.skill.category);
                    } else {
                        println!("'{}' is already registered", outcome.skill.name);
                    }
                }
                OutputFormat::Text => {}
            }
        }
        RegistryAction::Path => {
            let store = registry_store(&config)?;
            println!("{}", store.path().display());
        }
    }
    Ok(())
}

async fn cmd_ingest(file: &std::path::Path, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = Arc::new(LlmClient::from_env(config.llm.clone())?);
    let extractor = EntityExtractor::new(client.clone());
    let normalizer = SkillNormalizer::from_config(
        &config.normalization,
        registry_store(&config)?,
        Arc::new(LlmSkillOracle::new(client)),
    );

    if !quiet {
        eprintln!("Ingesting {}...", file.display());
    }
    let report = ingest::ingest_file(file, &extractor, &normalizer).await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            if !quiet {
                println!(
                    "Found {} people, {} projects, {} relationships ({} new skills)",
                    report.people, report.projects, report.relationships, report.new_skills
                );
            }
            print_json(&report.entities)?;
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Skillgraph Health Check");
        println!("=======================");
        println!();
    }

    let mut all_ok = true;

    // Check configuration
    let config = match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }

            match config.llm.resolved_api_key() {
                Ok(Some(_)) => {
                    if !quiet {
                        let redacted = config.llm.redacted_api_key()?.unwrap_or_default();
                        println!("[OK] API Key: Configured ({})", redacted);
                    }
                }
                Ok(None) => {
                    all_ok = false;
                    if !quiet {
                        warn!("API Key: Not configured");
                        println!("[!!] API Key: Not configured");
                        println!(
                            "     Set SKILLGRAPH_API_KEY or OPENROUTER_API_KEY environment variable"
                        );
                    }
                }
                Err(e) => {
                    all_ok = false;
                    if !quiet {
                        println!("[!!] API Key: Error - {}", e);
                    }
                }
            }
            Some(config)
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
            }
            None
        }
    };

    if !quiet {
        match Config::config_path() {
            Ok(path) if path.exists() => println!("[OK] Config file: {}", path.display()),
            Ok(path) => println!("[--] Config file: {} (using defaults)", path.display()),
            Err(e) => println!("[!!] Config file: Error - {}", e),
        }
    }

    // Check registry
    let config = config.unwrap_or_default();
    match registry_store(&config) {
        Ok(store) => match store.load().await {
            Ok(registry) if store.path().exists() => {
                if !quiet {
                    println!("[OK] Registry: {} skills", registry.len());
                    println!("     Path: {}", store.path().display());
                }
            }
            Ok(_) => {
                if !quiet {
                    println!(
                        "[--] Registry: {} (created on first use)",
                        store.path().display()
                    );
                }
            }
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Registry: {}", e);
                    if let Some(hint) = e.suggestion() {
                        println!("     {}", hint);
                    }
                }
            }
        },
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Registry: Error - {}", e);
            }
        }
    }

    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    Ok(())
}
