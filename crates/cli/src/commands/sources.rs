//! Sources command - list the configured source descriptors

use anyhow::Result;
use std::path::PathBuf;

use crate::args::SourcesArgs;
use crate::commands::run::build_adapters;
use crate::config::AppConfig;

pub async fn execute(args: SourcesArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    // Descriptors are static; no crawl happens here.
    let descriptors: Vec<_> = build_adapters(&config)
        .iter()
        .map(|adapter| adapter.source())
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
    } else {
        for descriptor in descriptors {
            println!("{}\t{}", descriptor.name, descriptor.url);
        }
    }

    Ok(())
}
