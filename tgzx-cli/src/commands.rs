//! Command handlers. Each returns the JSON document printed on success.

use crate::cli::{Cli, Command, CreateArgs, ExtractArgs, ListArgs};
use anyhow::{Context, Result};
use serde::Serialize;
use tgzx_core::{
    create_archive, extract_archive, list_archive, HttpKeySource, TgzxConfig,
};
use tokio_util::sync::CancellationToken;
use tracing::warn;

pub async fn run(cli: Cli) -> Result<String> {
    let mut config = TgzxConfig::default();
    if let Some(url) = cli.keys_url {
        config.keys_base_url = url;
    }

    match cli.command {
        Command::Create(args) => render(&create(args, &config).await?),
        Command::List(args) => render(&list(args).await?),
        Command::Extract(args) => render(&extract(args).await?),
    }
}

async fn create(args: CreateArgs, config: &TgzxConfig) -> Result<tgzx_core::CreateResult> {
    let source = HttpKeySource::new(config)?;
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let created = create_archive(
        &source,
        &args.identifier,
        &args.archive_file,
        &args.paths,
        config,
        &cancel,
    )
    .await;
    watcher.abort();
    Ok(created?)
}

async fn list(args: ListArgs) -> Result<tgzx_core::ListResult> {
    let listed = tokio::task::spawn_blocking(move || {
        list_archive(&args.archive_file, &args.identity_file)
    })
    .await
    .context("list task failed")??;
    Ok(listed)
}

async fn extract(args: ExtractArgs) -> Result<tgzx_core::ExtractResult> {
    let destination = match args.dest {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving current directory")?,
    };
    let extracted = tokio::task::spawn_blocking(move || {
        extract_archive(&args.archive_file, &args.identity_file, &destination)
    })
    .await
    .context("extract task failed")??;
    Ok(extracted)
}

fn render<T: Serialize>(result: &T) -> Result<String> {
    serde_json::to_string_pretty(result).context("encoding result")
}
