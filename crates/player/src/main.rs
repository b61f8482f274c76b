//! Hero Story - save slot inspection tool.
//!
//! ```text
//! herostory list              list saved games, newest first
//! herostory show <slot>       print the story of one save
//! herostory publish <slot>    mark a save as published
//! ```

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herostory_domain::common::datetime_from_millis;
use herostory_domain::{EntryKind, MetadataPatch, SlotKey};
use herostory_player::infrastructure::platform::create_platform;
use herostory_player::{PlayerConfig, SaveSlotStore};

const USAGE: &str = "usage: herostory <list | show <slot> | publish <slot>>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herostory_player=debug,herostory_domain=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = PlayerConfig::from_env();
    tracing::debug!(?config, "Loaded configuration");
    let platform = create_platform(config.data_dir.as_deref());
    let store = SaveSlotStore::from_platform(&platform);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["list"] => list(&store).await,
        ["show", slot] => show(&store, slot).await,
        ["publish", slot] => publish(&store, slot).await,
        _ => bail!(USAGE),
    }
}

async fn list(store: &SaveSlotStore) -> anyhow::Result<()> {
    let summaries = store.list_summaries().await;
    if summaries.is_empty() {
        println!("No saved games.");
        return Ok(());
    }

    for summary in summaries {
        let saved_at = datetime_from_millis(summary.last_modified)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let published = if summary.is_published { " [published]" } else { "" };
        println!(
            "{}  {}  {} ({} entries){}",
            summary.key, saved_at, summary.title, summary.entry_count, published
        );
    }
    Ok(())
}

async fn show(store: &SaveSlotStore, slot: &str) -> anyhow::Result<()> {
    let key = SlotKey::parse(slot).context("invalid slot key")?;
    let Some(saved) = store.read_slot(&key).await else {
        bail!("save slot not found: {key}");
    };

    println!("{}", saved.metadata.story_title);
    println!("{}", saved.metadata.story_description);
    for entry in saved.log.normalize() {
        let marker = match entry.kind {
            EntryKind::Ai => ">",
            EntryKind::Player => "*",
        };
        println!("\n{marker} [{}] {}", entry.action, entry.text);
    }
    Ok(())
}

async fn publish(store: &SaveSlotStore, slot: &str) -> anyhow::Result<()> {
    let key = SlotKey::parse(slot).context("invalid slot key")?;
    let Some(updated) = store
        .update_metadata(&key, &MetadataPatch::published(true))
        .await
        .with_context(|| format!("failed to publish {key}"))?
    else {
        bail!("storage is not available, nothing was published");
    };

    tracing::info!(slot_key = %key, "Published save slot");
    println!("Published \"{}\"", updated.metadata.story_title);
    Ok(())
}
