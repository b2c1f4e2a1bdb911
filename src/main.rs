use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::EnvFilter;

use propedge::config::AppConfig;
use propedge::domain::{Lineup, ScoredProp, Tier};
use propedge::{allocate_stakes, build_lineups};

/// Conservative two-play prop lineup optimizer
#[derive(Parser, Debug)]
#[command(name = "propedge", version, about)]
struct Cli {
    /// Path to scored props JSON (array of scored, tiered props)
    #[arg(long)]
    props: PathBuf,

    /// Override the configured bankroll base
    #[arg(long)]
    bankroll: Option<Decimal>,

    /// Config directory (default.toml + environment overrides)
    #[arg(long, default_value = "config")]
    config: PathBuf,

    /// Optional JSON report output path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Report {
    timestamp: String,
    bankroll: Decimal,
    daily_budget_fraction: Decimal,
    num_allocated: usize,
    lineups: Vec<Lineup>,
}

#[derive(Tabled)]
struct LineupRow {
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Legs")]
    legs: usize,
    #[tabled(rename = "Stake")]
    stake: String,
    #[tabled(rename = "Win%")]
    win_prob: String,
    #[tabled(rename = "EV")]
    ev: String,
    #[tabled(rename = "Picks")]
    picks: String,
}

impl LineupRow {
    fn from_lineup(lineup: &Lineup) -> Self {
        Self {
            mode: lineup.category.to_string(),
            tier: lineup.tier.to_string(),
            legs: lineup.num_legs,
            stake: format!("{:.2}", lineup.stake),
            win_prob: format!("{:.1}%", lineup.expected_win_prob * 100.0),
            ev: format!("{:.3}", lineup.expected_value),
            picks: lineup
                .picks
                .iter()
                .map(|p| format!("{} {} {} {}", p.player_name, p.stat_type, p.direction, p.line))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn load_config(dir: &PathBuf) -> Result<AppConfig> {
    let cfg = if dir.join("default.toml").exists() {
        AppConfig::load_from(dir).context("failed to load configuration")?
    } else {
        AppConfig::default_config()
    };
    cfg.validate()
        .map_err(|errs| anyhow::anyhow!("invalid configuration: {}", errs.join("; ")))?;
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = load_config(&cli.config)?;
    if let Some(bankroll) = cli.bankroll {
        cfg.bankroll.base = bankroll;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cfg.logging.level.clone())),
        )
        .init();

    let raw = std::fs::read_to_string(&cli.props)
        .with_context(|| format!("failed to read {}", cli.props.display()))?;
    let props: Vec<ScoredProp> = serde_json::from_str(&raw).context("failed to parse props")?;
    info!(props = props.len(), "loaded scored props");

    // S/A only downstream; B tier is dropped by policy.
    let props: Vec<ScoredProp> = props
        .into_iter()
        .filter(|p| matches!(p.tier, Tier::S | Tier::A))
        .collect();

    let lineups = build_lineups(
        &props,
        &cfg.payouts.standard_table(),
        &cfg.correlation,
        &cfg.risk,
    );
    info!(candidates = lineups.len(), "built candidate lineups");

    let allocated = allocate_stakes(lineups, &cfg);

    let rows: Vec<LineupRow> = allocated.iter().map(LineupRow::from_lineup).collect();
    if rows.is_empty() {
        println!("No lineups cleared the floors today.");
    } else {
        println!("{}", Table::new(rows));
    }

    let report = Report {
        timestamp: Utc::now().to_rfc3339(),
        bankroll: cfg.bankroll.base,
        daily_budget_fraction: cfg.risk.daily_budget_fraction,
        num_allocated: allocated.len(),
        lineups: allocated,
    };
    if let Some(path) = cli.output {
        std::fs::write(&path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}
