//! The sequential pipeline
//!
//! One museum at a time, one HTTP request at a time. The `PipelineContext`
//! replaces the host application's global project state: it owns the record
//! collections being built and is passed explicitly to each step.
//!
//! Failure discipline (one attempt per network call, no retries):
//! - hard fail, aborting the run: missing boundary or stations file, a
//!   non-success status from the open-data API, the catalog page, or the
//!   routing API, and an isochrone set without the 600 s polygon;
//! - soft fail, logged and skipped: one museum's summary, one unlinked
//!   record, one missing icon or localisation asset.

use crate::config::AtlasConfig;
use crate::linker::{self, LinkStats};
use crate::models::{Museum, Station};
use crate::opendata::OpendataClient;
use crate::output;
use crate::report::{self, ReportAssets};
use crate::routing::OrsClient;
use crate::transit;
use crate::wikipedia::{self, Summarizer};
use anyhow::{Context, Result};
use geo::MultiPolygon;
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything the steps share, built up as the run progresses.
pub struct PipelineContext {
    pub config: AtlasConfig,
    pub base_dir: PathBuf,
    pub boundary: MultiPolygon<f64>,
    pub museums: Vec<Museum>,
    pub stations: Vec<Station>,
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub museums: usize,
    pub linked: usize,
    pub summarized: usize,
    pub stations: usize,
    pub reports: usize,
}

/// Execute the whole pipeline strictly sequentially.
pub async fn run(config: AtlasConfig) -> Result<RunSummary> {
    let base_dir = PathBuf::from(&config.output.base_dir);
    let mut summary = RunSummary::default();

    // Base boundary: everything downstream filters against it
    let boundary_path = base_dir.join(&config.output.boundary_file);
    let boundary = output::read_boundary(&boundary_path)
        .context("the base boundary layer is required")?;
    info!(path = %boundary_path.display(), "boundary loaded");

    // Official museum records
    let opendata = OpendataClient::new(&config.opendata)?;
    let museums = opendata.fetch_museums().await?;
    summary.museums = museums.len();

    let mut ctx = PipelineContext {
        config,
        base_dir,
        boundary,
        museums,
        stations: Vec::new(),
    };

    // First save of the museum layer, before annotations
    let museums_path = ctx.base_dir.join("Musees_Paris_4326.geojson");
    output::write_museums_geojson(&museums_path, &ctx.museums)?;

    // Scraped catalog and record linkage
    let link_stats = scrape_and_link(&mut ctx).await?;
    summary.linked = link_stats.matched;

    // Article summaries, one museum at a time, each failure soft
    summary.summarized = summarize_museums(&mut ctx).await?;

    // Museum layer again, now carrying the annotations
    output::write_museums_geojson(&museums_path, &ctx.museums)?;

    // Stations, clipped to the boundary
    let stations_path = ctx.base_dir.join(&ctx.config.output.stations_file);
    let all_stations = transit::load_stations(&stations_path)?;
    ctx.stations = transit::stations_within(all_stations, &ctx.boundary);
    summary.stations = ctx.stations.len();

    // Per-museum isochrones, accessibility, report
    summary.reports = process_museums(&mut ctx).await?;

    // The station layer keeps the flags of the last processed museum
    let clipped_path = ctx.base_dir.join("Gares_dans_Paris.geojson");
    output::write_stations_geojson(&clipped_path, &ctx.stations)?;

    info!(
        museums = summary.museums,
        linked = summary.linked,
        summarized = summary.summarized,
        stations = summary.stations,
        reports = summary.reports,
        "pipeline finished"
    );
    Ok(summary)
}

/// Fetch and parse the catalog page, persist it as CSV, then link the rows
/// to the official records.
async fn scrape_and_link(ctx: &mut PipelineContext) -> Result<LinkStats> {
    let client = wikipedia::page_client(&ctx.config.scraping)?;
    let html = wikipedia::fetch_catalog(&client, &ctx.config.scraping.catalog_url).await?;
    let rows = wikipedia::parse_catalog(&html, catalog_origin(&ctx.config.scraping.catalog_url));

    let csv_path = ctx.base_dir.join("Musees_Paris_Scrapping.csv");
    output::write_catalog_csv(&csv_path, &rows)?;

    let strategies = linker::default_strategies(ctx.config.linker.threshold);
    Ok(linker::link_museums(&mut ctx.museums, &rows, &strategies))
}

/// One summary attempt per linked museum. A museum that fails to summarize
/// is logged and keeps an empty summary.
async fn summarize_museums(ctx: &mut PipelineContext) -> Result<usize> {
    let client = wikipedia::page_client(&ctx.config.scraping)?;
    let summarizer = Summarizer::new(client, ctx.config.scraping.summary_word_budget);

    let mut summarized = 0;
    for museum in &mut ctx.museums {
        let Some(url) = museum.scraped_url.clone() else {
            continue;
        };
        info!(museum = %museum.name, %url, "scraping article");
        match summarizer.summarize(&url).await {
            Some(summary) => {
                museum.summary = Some(summary);
                summarized += 1;
            }
            None => warn!(museum = %museum.name, "no summary for this museum"),
        }
    }
    Ok(summarized)
}

/// Isochrones, accessibility flags, and report, museum by museum.
async fn process_museums(ctx: &mut PipelineContext) -> Result<usize> {
    let ors = OrsClient::new(&ctx.config.routing)?;
    let assets = ReportAssets::new(&ctx.base_dir);
    let date = chrono::Local::now().format("%d/%m/%Y").to_string();

    let total = ctx.museums.len();
    let mut reports = 0;

    for (index, museum) in ctx.museums.iter().enumerate() {
        info!(
            "museum {}/{}: {} (ID {})",
            index + 1,
            total,
            museum.name,
            museum.id
        );

        let (raw, isochrones) = ors
            .walking_isochrones(museum.point)
            .await
            .with_context(|| format!("isochrones for {}", museum.name))?;

        let iso_path = ctx
            .base_dir
            .join("isochrones")
            .join(format!("Isochrones_{}.geojson", museum.id));
        output::write_raw(&iso_path, &raw)?;

        transit::flag_accessibility(&mut ctx.stations, &isochrones)
            .with_context(|| format!("accessibility around {}", museum.name))?;

        let contents = report::render_report(
            museum,
            &ctx.stations,
            &isochrones.thresholds(),
            &ctx.config.output.attribution,
            &date,
            &assets,
        );
        report::write_report(&ctx.base_dir, &museum.id, &contents)?;
        reports += 1;
    }

    Ok(reports)
}

/// The scheme+host part of the catalog URL, used to absolutize hrefs.
fn catalog_origin(url: &str) -> &str {
    let Some(scheme_end) = url.find("://") else {
        return url;
    };
    match url[scheme_end + 3..].find('/') {
        Some(path_start) => &url[..scheme_end + 3 + path_start],
        None => url,
    }
}
