//! Run command - crawl, aggregate, render, export

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::sync::Arc;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use techdigest_adapters::export::FsExporter;
use techdigest_adapters::report::HtmlReport;
use techdigest_adapters::sources::{DaangnAdapter, DanminAdapter, NaverD2Adapter, TossAdapter};
use techdigest_domain::usecases::{AggregateConfig, AggregateError, Aggregator, Cutoff};
use techdigest_domain::{
    ReportExporter, ReportInput, ReportRenderer, SourceAdapter, SystemClock,
};

use crate::args::RunArgs;
use crate::config::AppConfig;

const CUTOFF_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let adapters = build_adapters(&config);
    if adapters.is_empty() {
        bail!("no sources enabled; check [sources] in the configuration");
    }
    let cutoff = resolve_cutoff(&args, &config)?;
    let relevance = args.relevance || config.filter.relevance;

    tracing::info!(
        sources = adapters.len(),
        relevance,
        "starting digest run"
    );

    let aggregator = Aggregator::new(
        adapters,
        Arc::new(SystemClock),
        AggregateConfig { cutoff, relevance },
    );

    let report = match aggregator.run().await {
        Ok(report) => report,
        Err(AggregateError::AllSourcesFailed(failures)) => {
            for failure in &failures {
                tracing::error!(source = %failure.source, error = %failure.error, "source failed");
            }
            bail!("every source failed; nothing to report");
        }
        Err(error) => return Err(error.into()),
    };

    for failure in &report.failures {
        tracing::warn!(source = %failure.source, error = %failure.error, "source contributed nothing");
    }

    if report.is_empty() {
        println!("no posts matched the filters; nothing to report");
        return Ok(());
    }

    println!("collected {} posts:", report.posts.len());
    for (source, count) in &report.tally {
        println!("  {source}: {count}");
    }

    if args.skip_render {
        return Ok(());
    }

    let renderer = HtmlReport::new()?;
    let input = ReportInput {
        title: &config.report.title,
        posts: &report.posts,
        tally: &report.tally,
        generated_at: OffsetDateTime::now_utc(),
    };
    let body = renderer.render(&input)?;

    let output_dir = args.output.unwrap_or_else(|| config.report.output_dir.clone());
    let exporter = FsExporter::new(&output_dir);
    exporter.export(&body, &config.report.key).await?;

    println!(
        "report written to {}",
        output_dir.join(&config.report.key).display()
    );
    Ok(())
}

pub(crate) fn build_adapters(config: &AppConfig) -> Vec<Arc<dyn SourceAdapter>> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
    if config.sources.toss {
        adapters.push(Arc::new(TossAdapter::new(
            config.crawl.page_concurrency,
            config.crawl.thumbnail_concurrency,
        )));
    }
    if config.sources.daangn {
        adapters.push(Arc::new(DaangnAdapter::new()));
    }
    if config.sources.naver {
        adapters.push(Arc::new(NaverD2Adapter::new()));
    }
    if config.sources.danmin {
        adapters.push(Arc::new(DanminAdapter::new()));
    }
    adapters
}

fn resolve_cutoff(args: &RunArgs, config: &AppConfig) -> Result<Cutoff> {
    if let Some(raw) = args.cutoff.as_deref() {
        return parse_cutoff(raw);
    }
    if let Some(days) = args.window_days {
        return Ok(Cutoff::RollingDays(days));
    }
    if let Some(days) = config.crawl.window_days {
        return Ok(Cutoff::RollingDays(days));
    }
    if let Some(raw) = config.crawl.cutoff_date.as_deref() {
        return parse_cutoff(raw);
    }
    Ok(Cutoff::RollingDays(365))
}

fn parse_cutoff(raw: &str) -> Result<Cutoff> {
    let date = Date::parse(raw, CUTOFF_FORMAT)
        .with_context(|| format!("invalid cutoff date: {raw} (expected YYYY-MM-DD)"))?;
    Ok(Cutoff::Absolute(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args() -> RunArgs {
        RunArgs {
            cutoff: None,
            window_days: None,
            output: None,
            relevance: false,
            skip_render: false,
        }
    }

    #[test]
    fn cli_cutoff_overrides_config() {
        let mut args = run_args();
        args.cutoff = Some("2025-03-01".to_string());
        let config = AppConfig::default();

        let cutoff = resolve_cutoff(&args, &config).unwrap();
        assert!(matches!(cutoff, Cutoff::Absolute(_)));
    }

    #[test]
    fn window_days_from_config_beats_default_cutoff_date() {
        let args = run_args();
        let mut config = AppConfig::default();
        config.crawl.window_days = Some(30);

        let cutoff = resolve_cutoff(&args, &config).unwrap();
        assert_eq!(cutoff, Cutoff::RollingDays(30));
    }

    #[test]
    fn malformed_cutoff_is_rejected() {
        let mut args = run_args();
        args.cutoff = Some("03/01/2025".to_string());
        let config = AppConfig::default();

        assert!(resolve_cutoff(&args, &config).is_err());
    }

    #[test]
    fn disabled_sources_are_not_built() {
        let mut config = AppConfig::default();
        config.sources.toss = false;
        config.sources.danmin = false;

        let adapters = build_adapters(&config);
        let names: Vec<_> = adapters.iter().map(|a| a.source().name).collect();
        assert_eq!(names, vec!["당근마켓", "네이버 D2"]);
    }
}
