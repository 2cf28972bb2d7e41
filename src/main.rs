//! Pulse-bot: market pulse snapshot and risk bot.
//!
//! Single-binary Tokio application that:
//! 1. Fetches recent daily closes for a fixed instrument catalog
//! 2. Caches one snapshot behind a short TTL
//! 3. Scores aggregate market risk with a weighted rule bank
//! 4. Grades four fixed pair-trading signals
//! 5. Renders the result as log lines or a JSON document

mod config;

use std::{collections::BTreeMap, time::Duration};

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};

use common::{InstrumentSnapshot, PairKey, PairSignal, QuoteFeed, RiskAssessment, RiskLevel};
use market_engine::{
    compute_pair_signals, compute_risk, significant_movers, MarketSnapshot, SnapshotCache, CATALOG,
};
use yahoo_client::YahooClient;

/// Market Pulse Bot
#[derive(Parser)]
#[command(name = "pulse-bot", about = "Market pulse snapshot and risk bot")]
struct Cli {
    /// Re-render the report on an interval until interrupted.
    #[arg(long)]
    watch: bool,

    /// Check the price feed with one catalog symbol, then exit.
    #[arg(long)]
    check_feed: bool,

    /// Invalidate the cache slot before each report, bypassing the TTL.
    #[arg(long)]
    fresh: bool,

    /// Emit each report as pretty JSON on stdout instead of log lines.
    #[arg(long)]
    json: bool,
}

/// Serializable report document for `--json`.
#[derive(Serialize)]
struct PulseReport {
    generated_at: DateTime<Utc>,
    ok_instruments: usize,
    errored_instruments: usize,
    instruments: Vec<InstrumentSnapshot>,
    risk: RiskAssessment,
    pairs: BTreeMap<PairKey, PairSignal>,
    movers: Vec<InstrumentSnapshot>,
}

fn level_label(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "HIGH",
        RiskLevel::Medium => "MEDIUM",
        RiskLevel::Low => "LOW",
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse_bot=info,market_engine=info,yahoo_client=info".into()),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("📊 Pulse Bot starting up...");

    // Load configuration.
    let cfg = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Cache: ttl={}s, lookback={}d",
        cfg.cache.ttl_secs, cfg.cache.lookback_days
    );
    info!(
        "Feed: {} (timeout={}s)",
        cfg.feed.base_url, cfg.feed.timeout_secs
    );
    info!(
        "Watch: interval={}s, movers>={:.1}%",
        cfg.watch.interval_secs, cfg.watch.movers_threshold_pct
    );

    let feed = YahooClient::new(&cfg.feed);

    // ── Check-feed mode ──────────────────────────────────────────────
    if cli.check_feed {
        info!("Running feed check...");
        let sample = &CATALOG[0];
        match feed
            .recent_closes(sample.symbol, cfg.cache.lookback_days)
            .await
        {
            Ok(closes) => {
                info!(
                    "✅ Feed reachable: {} closes for {} ({})",
                    closes.len(),
                    sample.name,
                    sample.symbol
                );
            }
            Err(e) => {
                error!("❌ Feed check failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let cache = SnapshotCache::new(feed, &cfg.cache);

    // ── Watch mode ───────────────────────────────────────────────────
    if cli.watch {
        info!("🚀 Pulse Bot is watching. Press Ctrl+C to stop.");

        let mut interval = tokio::time::interval(Duration::from_secs(cfg.watch.interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let threshold = cfg.watch.movers_threshold_pct;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    run_report_cycle(&cache, cli.fresh, threshold, cli.json).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Pulse Bot shut down.");
        return;
    }

    // ── One-shot report ──────────────────────────────────────────────
    run_report_cycle(&cache, cli.fresh, cfg.watch.movers_threshold_pct, cli.json).await;
}

// ── Report rendering ─────────────────────────────────────────────────

async fn run_report_cycle(
    cache: &SnapshotCache<YahooClient>,
    fresh: bool,
    movers_threshold_pct: f64,
    as_json: bool,
) {
    if fresh {
        cache.invalidate().await;
    }

    let snapshot = cache.get_snapshot().await;
    render_report(&snapshot, movers_threshold_pct, as_json);
}

fn render_report(snapshot: &MarketSnapshot, movers_threshold_pct: f64, as_json: bool) {
    let risk = compute_risk(&snapshot.instruments);
    let pairs = compute_pair_signals(&snapshot.instruments);
    let movers = significant_movers(&snapshot.instruments, movers_threshold_pct);
    let (ok, errored) = snapshot.health();

    if as_json {
        let report = PulseReport {
            generated_at: snapshot.fetched_at_utc,
            ok_instruments: ok,
            errored_instruments: errored,
            instruments: snapshot.instruments.clone(),
            risk,
            pairs,
            movers: movers.into_iter().cloned().collect(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(doc) => println!("{}", doc),
            Err(e) => error!("Failed to serialize report: {}", e),
        }
        return;
    }

    info!(
        "📊 Market pulse @ {} ({} ok, {} errored)",
        snapshot.fetched_at_utc.format("%Y-%m-%d %H:%M UTC"),
        ok,
        errored
    );
    for reading in &snapshot.instruments {
        if reading.is_ok() {
            info!(
                "  {} {}: {} ({:+.2}%)",
                reading.trend().emoji(),
                reading.name,
                reading.formatted_value,
                reading.change_pct
            );
        } else {
            info!("  ⚠️  {}: N/A", reading.name);
        }
    }

    info!(
        "{} Risk score {} ({})",
        risk.level.emoji(),
        risk.score,
        level_label(risk.level)
    );
    if risk.factors.is_empty() {
        info!("  No active risk factors");
    }
    for factor in &risk.factors {
        info!("  - {}", factor);
    }

    info!("Pair signals:");
    for signal in pairs.values() {
        info!(
            "  → {} {}: {} [{}]",
            signal.grade.emoji(),
            signal.name,
            signal.description,
            signal.grade.label()
        );
    }

    if movers.is_empty() {
        info!("No movers at or above {:.1}%", movers_threshold_pct);
    }
    for reading in movers {
        info!(
            "🚨 Mover: {} {:+.2}% ({})",
            reading.name, reading.change_pct, reading.formatted_value
        );
    }
}
