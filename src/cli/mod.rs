//! Command-line interface for imgset-inspector.
//!
//! Provides commands for running a verification over a seed list,
//! extracting image-set references from markup offline, and showing the
//! resolved configuration.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::adapters::DocumentStoreClient;
use crate::config::{self, ConfigOverrides, InspectorConfig};
use crate::core::{extract_image_set_refs, load_seeds, write_report, Driver, Verifier};

/// imgset-inspector - audit published content for broken image sets
#[derive(Parser, Debug)]
#[command(name = "imgset-inspector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify every identifier in the uuid file
    Run {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Print image-set references found in body markup
    Extract {
        /// Markup file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show resolved configuration (debug)
    Config {
        #[command(flatten)]
        args: RunArgs,
    },
}

/// Options shared by `run` and `config`
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Base64 encoded basic auth for the delivery cluster
    #[arg(long, env = "IMGSET_INSPECTOR_AUTH", hide_env_values = true)]
    pub auth: Option<String>,

    /// Only print encountered identifiers; skip all checks and the report
    #[arg(long = "printOnly", visible_alias = "printonly")]
    pub print_only: bool,

    /// Document store base URL (the content id is appended directly)
    #[arg(long = "docStoreURL", visible_alias = "docstoreurl")]
    pub docstore_url: Option<String>,

    /// Milliseconds to wait between seed identifiers
    #[arg(long)]
    pub delay: Option<u64>,

    /// JSON array of seed identifiers
    #[arg(long = "uuidfile")]
    pub uuid_file: Option<PathBuf>,

    /// Output file for failing identifiers
    #[arg(long = "brokenfile")]
    pub broken_file: Option<PathBuf>,

    /// Substring required in every record's provenance tag
    #[arg(long)]
    pub provenance_marker: Option<String>,

    /// Config file (searched for if not provided)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl From<RunArgs> for ConfigOverrides {
    fn from(args: RunArgs) -> Self {
        Self {
            config_path: args.config,
            auth: args.auth,
            docstore_url: args.docstore_url,
            delay_ms: args.delay,
            uuid_file: args.uuid_file,
            broken_file: args.broken_file,
            provenance_marker: args.provenance_marker,
            print_only: args.print_only,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run { args } => {
                let cfg = config::resolve_config(args.into())?;
                run_inspection(&cfg).await
            }
            Commands::Extract { input } => extract_refs(input),
            Commands::Config { args } => {
                let cfg = config::resolve_config(args.into())?;
                show_config(&cfg);
                Ok(())
            }
        }
    }
}

/// Verify the seed list and write the broken report
async fn run_inspection(cfg: &InspectorConfig) -> Result<()> {
    let auth = cfg.require_auth()?;
    let seeds = load_seeds(&cfg.uuid_file)?;

    eprintln!("Starting...");

    let client = DocumentStoreClient::new(cfg.docstore_url.clone(), auth);
    let verifier = Verifier::new(client, cfg.verify_options());
    let driver = Driver::new(verifier, cfg.delay);

    let report = driver.run(&seeds).await;

    if !cfg.is_print_only() {
        write_report(&cfg.broken_file, &report.broken)?;
        eprintln!(
            "{} broken identifier(s) written to {}",
            report.broken.len(),
            cfg.broken_file.display()
        );
    }

    eprintln!("{}", report.summary());
    eprintln!("Finished!");

    Ok(())
}

/// Print references found in markup from a file or stdin
fn extract_refs(input_file: Option<PathBuf>) -> Result<()> {
    let markup = if let Some(path) = input_file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    };

    let refs = extract_image_set_refs(&markup)?;
    for id in refs {
        println!("{}", id);
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
fn show_config(cfg: &InspectorConfig) {
    println!("imgset-inspector configuration");
    println!();
    println!(
        "Config file:       {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!("Document store:    {}", cfg.docstore_url);
    println!(
        "Auth:              {}",
        if cfg.require_auth().is_ok() {
            "(set)"
        } else {
            "(missing)"
        }
    );
    println!("Mode:              {:?}", cfg.mode);
    println!("Delay:             {}ms", cfg.delay.as_millis());
    println!("Provenance marker: {}", cfg.provenance_marker);
    println!("UUID file:         {}", cfg.uuid_file.display());
    println!("Broken file:       {}", cfg.broken_file.display());
}
