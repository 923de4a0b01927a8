//! docvault: upload documents to tiered storage and analyze their text.
//!
//! Configuration comes from the environment (see `.env`); `--tier` overrides
//! DOCVAULT_DEFAULT_TIER for a single command.

use anyhow::Context;
use clap::{Parser, Subcommand};
use docvault_analysis::{create_extractor, create_identity_provider, create_interpreter};
use docvault_cli::{init_tracing, status_line};
use docvault_core::{Config, SourceFile, StorageTier};
use docvault_pipeline::{
    job_view, FileListController, JobStatus, TierSelector, UploadPipeline, EMPTY_STATE_MESSAGE,
};
use docvault_storage::create_storage;
use serde::Serialize;
use std::path::Path;

#[derive(Parser)]
#[command(name = "docvault", about = "Tiered document storage with text analysis")]
struct Cli {
    /// Storage tier: guest, private, or protected
    #[arg(long, global = true)]
    tier: Option<StorageTier>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file, then extract and interpret its text
    Upload {
        /// Path to the file to upload
        file: std::path::PathBuf,
    },
    /// List files in the tier
    List,
    /// Print a time-limited download URL
    Url {
        /// Object key within the tier
        key: String,
    },
    /// Delete a file from the tier
    Delete {
        /// Object key within the tier
        key: String,
    },
    /// Show the current user's display name
    Whoami,
}

#[derive(Serialize)]
struct ListedFile<'a> {
    key: &'a str,
    size: String,
    last_modified: String,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn upload(config: &Config, tier: StorageTier, path: &Path) -> anyhow::Result<()> {
    let file = SourceFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let storage = create_storage(config).await?;
    let extractor = create_extractor(config).await?;
    let interpreter = create_interpreter(config).await?;
    let pipeline = UploadPipeline::new(storage, extractor, interpreter, tier)
        .with_max_file_size(config.max_file_size_bytes as u64);

    let mut updates = pipeline.subscribe();
    let handle = pipeline.submit(file, tier)?;

    let printer = tokio::spawn(async move {
        let mut last = String::new();
        while updates.changed().await.is_ok() {
            let job = updates.borrow_and_update().clone();
            let line = status_line(&job);
            if line != last {
                eprintln!("{}", line);
                last = line;
            }
            if job.status().is_terminal() && job.status() != JobStatus::Idle {
                break;
            }
        }
    });

    handle.wait().await?;
    printer.await.context("Progress printer failed")?;

    print_json(&job_view(&pipeline.current()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let tiers = TierSelector::new(config.default_tier);
    if let Some(tier) = cli.tier {
        tiers.set(tier);
    }
    let tier = tiers.current();
    tracing::debug!(
        environment = %config.environment,
        storage_backend = %config.storage_backend,
        tier = %tier,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Upload { file } => upload(&config, tier, &file).await?,
        Commands::List => {
            let mut files =
                FileListController::new(create_storage(&config).await?, config.download_url_ttl());
            files.refresh(tier).await?;

            if files.is_empty() {
                print_json(&serde_json::json!({
                    "title": tier.title(),
                    "message": EMPTY_STATE_MESSAGE,
                }))?;
            } else {
                let items: Vec<_> = files
                    .items()
                    .iter()
                    .map(|o| ListedFile {
                        key: &o.key,
                        size: o.size_label(),
                        last_modified: o.last_modified.to_rfc3339(),
                    })
                    .collect();
                print_json(&serde_json::json!({ "title": tier.title(), "files": items }))?;
            }
        }
        Commands::Url { key } => {
            let files =
                FileListController::new(create_storage(&config).await?, config.download_url_ttl());
            let url = files
                .download_link(&key, tier)
                .await
                .with_context(|| format!("Could not create a download link for {}", key))?;
            print_json(&serde_json::json!({
                "key": key,
                "url": url,
                "expires_in_secs": config.download_url_ttl_secs,
            }))?;
        }
        Commands::Delete { key } => {
            let mut files =
                FileListController::new(create_storage(&config).await?, config.download_url_ttl());
            files.select(key.clone());
            files.delete_selected(tier).await?;
            print_json(&serde_json::json!({
                "success": true,
                "message": format!("{} deleted", key),
                "remaining": files.items().len(),
            }))?;
        }
        Commands::Whoami => {
            let identity = create_identity_provider(&config);
            let user = identity.current_user_display_name().await;
            print_json(&serde_json::json!({ "user": user.unwrap_or_default() }))?;
        }
    }

    Ok(())
}
