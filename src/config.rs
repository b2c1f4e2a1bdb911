use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::{FlexPayout, PayoutSchedule, PayoutTable};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub payouts: PayoutsConfig,
    pub filters: FiltersConfig,
    #[serde(default)]
    pub correlation: CorrelationConfig,
    pub risk: RiskConfig,
    pub bankroll: BankrollConfig,
    #[serde(default)]
    pub promo: PromoConfig,
    #[serde(default)]
    pub entries: EntriesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Payout configuration.
///
/// Keys are leg counts as strings (TOML table keys); accessors convert into
/// the typed domain tables.
#[derive(Debug, Clone, Deserialize)]
pub struct PayoutsConfig {
    /// Shorthand Standard schedule: legs -> all-correct multiplier
    pub standard: BTreeMap<String, f64>,
    /// Shorthand Flex schedule: legs -> { perfect, one_miss }
    pub flex: BTreeMap<String, FlexPayout>,
    /// General Standard table: legs -> wins -> multiplier
    pub table_standard: BTreeMap<String, BTreeMap<String, f64>>,
    /// General Flex table: legs -> wins -> multiplier
    pub table_flex: BTreeMap<String, BTreeMap<String, f64>>,
}

impl PayoutsConfig {
    /// Shorthand schedule used by the decision and promo paths
    pub fn schedule(&self) -> PayoutSchedule {
        PayoutSchedule {
            standard: parse_keyed(&self.standard),
            flex: parse_keyed(&self.flex),
        }
    }

    pub fn standard_table(&self) -> PayoutTable {
        to_table(&self.table_standard)
    }

    pub fn flex_table(&self) -> PayoutTable {
        to_table(&self.table_flex)
    }
}

fn parse_keyed<V: Clone>(map: &BTreeMap<String, V>) -> BTreeMap<u8, V> {
    map.iter()
        .filter_map(|(k, v)| k.parse::<u8>().ok().map(|k| (k, v.clone())))
        .collect()
}

fn to_table(map: &BTreeMap<String, BTreeMap<String, f64>>) -> PayoutTable {
    let mut table = PayoutTable::new();
    for (legs, row) in map {
        let Ok(legs) = legs.parse::<u8>() else {
            continue;
        };
        for (wins, mult) in row {
            if let Ok(wins) = wins.parse::<u8>() {
                table.insert(legs, wins, *mult);
            }
        }
    }
    table
}

#[derive(Debug, Clone, Deserialize)]
pub struct FiltersConfig {
    /// Minimum ROI for choosing the Standard format
    pub min_roi_std: f64,
    /// Minimum ROI for choosing the Flex format
    pub min_roi_flex: f64,
    /// EV margin Standard must clear over Flex (delta in the decision rule)
    #[serde(default = "default_ev_margin")]
    pub ev_margin_delta: f64,
    /// Probability threshold for Standard legs
    pub min_p_final_std: f64,
    /// Probability threshold for Flex legs
    pub min_p_final_flex: f64,
}

fn default_ev_margin() -> f64 {
    0.02
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorrelationConfig {
    /// Penalty added per leg pair sharing sport and game date
    #[serde(default = "default_same_game_penalty")]
    pub same_game_penalty: f64,
}

fn default_same_game_penalty() -> f64 {
    0.25
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            same_game_penalty: default_same_game_penalty(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Minimum EV multiple per leg count (1.0 = breakeven)
    #[serde(default)]
    pub min_ev_by_leg: BTreeMap<String, f64>,
    /// Max times one (player, stat, direction) leg may appear across lineups
    #[serde(default = "default_max_prop_appearances")]
    pub max_prop_appearances: u32,
    /// Max combinations examined per leg count
    #[serde(default = "default_max_lineups")]
    pub max_lineups: usize,
    /// Wall-clock budget for one build invocation
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,
    /// Fraction of bankroll spent per day
    pub daily_budget_fraction: Decimal,
    /// Share of the daily budget on the top 2-leg play
    pub top_play_share: Decimal,
    /// Share of the daily budget on the 4-6-leg parlay play
    pub parlay_play_share: Decimal,
    /// Floor on any allocated stake
    pub min_stake: Decimal,
}

fn default_max_prop_appearances() -> u32 {
    3
}

fn default_max_lineups() -> usize {
    1000
}

fn default_build_timeout_secs() -> u64 {
    60
}

impl RiskConfig {
    /// EV floor (multiple) for a leg count; breakeven when unconfigured
    pub fn min_ev_for(&self, num_legs: usize) -> f64 {
        self.min_ev_by_leg
            .get(&num_legs.to_string())
            .copied()
            .unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankrollConfig {
    /// Base bankroll in account currency
    pub base: Decimal,
}

/// Promotion type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoKind {
    ProfitBoost,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromoConfig {
    #[serde(default)]
    pub active: bool,
    #[serde(default = "default_promo_kind")]
    pub kind: PromoKind,
    /// Boost fraction, e.g. 0.10 = +10% on winning multipliers
    #[serde(default)]
    pub value: f64,
    /// Extend the boost to Flex one-miss refunds
    #[serde(default)]
    pub boost_protected: bool,
    /// Leg count the promotion requires (haircut only supports 3)
    #[serde(default = "default_promo_min_legs")]
    pub min_legs: u8,
    #[serde(default)]
    pub haircut: HaircutConfig,
}

fn default_promo_kind() -> PromoKind {
    PromoKind::ProfitBoost
}

fn default_promo_min_legs() -> u8 {
    3
}

impl Default for PromoConfig {
    fn default() -> Self {
        Self {
            active: false,
            kind: default_promo_kind(),
            value: 0.0,
            boost_protected: false,
            min_legs: default_promo_min_legs(),
            haircut: HaircutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HaircutConfig {
    /// Band below the Standard threshold eligible for relaxation
    #[serde(default = "default_haircut_margin")]
    pub margin_p_final_std: f64,
    /// Band below the Flex threshold eligible for relaxation
    #[serde(default = "default_haircut_margin")]
    pub margin_p_final_flex: f64,
    /// Max near-threshold legs considered per fill
    #[serde(default = "default_max_props_relaxed")]
    pub max_props_relaxed: usize,
    /// ROI floor the relaxed slip must still clear
    #[serde(default = "default_min_roi_after_haircut")]
    pub min_roi_after_haircut: f64,
}

fn default_haircut_margin() -> f64 {
    0.01
}

fn default_max_props_relaxed() -> usize {
    2
}

fn default_min_roi_after_haircut() -> f64 {
    0.01
}

impl Default for HaircutConfig {
    fn default() -> Self {
        Self {
            margin_p_final_std: default_haircut_margin(),
            margin_p_final_flex: default_haircut_margin(),
            max_props_relaxed: default_max_props_relaxed(),
            min_roi_after_haircut: default_min_roi_after_haircut(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntriesConfig {
    /// Same-game market pairs allowed to anchor a Standard triple
    #[serde(default = "default_whitelist_pairs")]
    pub whitelist_pairs: Vec<(String, String)>,
    /// Fraction of bankroll staked per slate entry
    #[serde(default = "default_entry_stake_fraction")]
    pub entry_stake_fraction: Decimal,
    /// Absolute cap on a slate entry stake
    #[serde(default = "default_entry_stake_cap")]
    pub entry_stake_cap: Decimal,
}

fn default_whitelist_pairs() -> Vec<(String, String)> {
    vec![("ast".to_string(), "points".to_string())]
}

fn default_entry_stake_fraction() -> Decimal {
    Decimal::new(25, 3) // 0.025
}

fn default_entry_stake_cap() -> Decimal {
    Decimal::ONE
}

impl Default for EntriesConfig {
    fn default() -> Self {
        Self {
            whitelist_pairs: default_whitelist_pairs(),
            entry_stake_fraction: default_entry_stake_fraction(),
            entry_stake_cap: default_entry_stake_cap(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("PROPEDGE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (PROPEDGE_FILTERS__MIN_ROI_STD, etc.)
            .add_source(
                Environment::with_prefix("PROPEDGE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Canonical defaults for CLI usage when no config file exists
    pub fn default_config() -> Self {
        use rust_decimal_macros::dec;

        let standard: BTreeMap<String, f64> =
            [("2".to_string(), 3.0), ("3".to_string(), 6.0)].into();
        let flex: BTreeMap<String, FlexPayout> = [(
            "3".to_string(),
            FlexPayout {
                perfect: 3.0,
                one_miss: 1.0,
            },
        )]
        .into();

        let table_standard: BTreeMap<String, BTreeMap<String, f64>> = [
            ("2".to_string(), [("2".to_string(), 3.0)].into()),
            ("3".to_string(), [("3".to_string(), 6.0)].into()),
            ("4".to_string(), [("4".to_string(), 10.0)].into()),
            ("5".to_string(), [("5".to_string(), 20.0)].into()),
            ("6".to_string(), [("6".to_string(), 35.0)].into()),
        ]
        .into();
        let table_flex: BTreeMap<String, BTreeMap<String, f64>> = [
            (
                "3".to_string(),
                [("3".to_string(), 3.0), ("2".to_string(), 1.0)].into(),
            ),
            (
                "4".to_string(),
                [("4".to_string(), 6.0), ("3".to_string(), 1.5)].into(),
            ),
            (
                "5".to_string(),
                [("5".to_string(), 10.0), ("4".to_string(), 2.5)].into(),
            ),
            (
                "6".to_string(),
                [
                    ("6".to_string(), 25.0),
                    ("5".to_string(), 2.6),
                    ("4".to_string(), 0.4),
                ]
                .into(),
            ),
        ]
        .into();

        Self {
            payouts: PayoutsConfig {
                standard,
                flex,
                table_standard,
                table_flex,
            },
            filters: FiltersConfig {
                min_roi_std: 0.05,
                min_roi_flex: 0.03,
                ev_margin_delta: 0.02,
                min_p_final_std: 0.58,
                min_p_final_flex: 0.577,
            },
            correlation: CorrelationConfig::default(),
            risk: RiskConfig {
                min_ev_by_leg: [
                    ("2".to_string(), 1.05),
                    ("3".to_string(), 1.05),
                    ("4".to_string(), 1.10),
                    ("5".to_string(), 1.15),
                    ("6".to_string(), 1.20),
                ]
                .into(),
                max_prop_appearances: 3,
                max_lineups: 1000,
                build_timeout_secs: 60,
                daily_budget_fraction: dec!(0.20),
                top_play_share: dec!(0.80),
                parlay_play_share: dec!(0.20),
                min_stake: dec!(5.00),
            },
            bankroll: BankrollConfig { base: dec!(1000) },
            promo: PromoConfig::default(),
            entries: EntriesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let standard_keys: Vec<&String> = self.payouts.standard.keys().collect();
        let flex_keys: Vec<&String> = self.payouts.flex.keys().collect();
        for (label, keys) in [("payouts.standard", standard_keys), ("payouts.flex", flex_keys)] {
            for key in keys {
                if key.parse::<u8>().is_err() {
                    errors.push(format!("{label}: leg count key '{key}' is not a number"));
                }
            }
        }

        if self.payouts.standard_table().is_empty() {
            errors.push("payouts.table_standard must not be empty".to_string());
        }
        if self.payouts.flex_table().is_empty() {
            errors.push("payouts.table_flex must not be empty".to_string());
        }

        for (name, p) in [
            ("min_p_final_std", self.filters.min_p_final_std),
            ("min_p_final_flex", self.filters.min_p_final_flex),
        ] {
            if !(0.0..=1.0).contains(&p) {
                errors.push(format!("filters.{name} must be between 0 and 1"));
            }
        }

        if !(0.0..=1.0).contains(&self.correlation.same_game_penalty) {
            errors.push("correlation.same_game_penalty must be between 0 and 1".to_string());
        }

        if self.risk.daily_budget_fraction <= Decimal::ZERO
            || self.risk.daily_budget_fraction > Decimal::ONE
        {
            errors.push("risk.daily_budget_fraction must be in (0, 1]".to_string());
        }
        if self.risk.top_play_share + self.risk.parlay_play_share > Decimal::ONE {
            errors.push("risk.top_play_share + risk.parlay_play_share must not exceed 1".to_string());
        }
        if self.bankroll.base <= Decimal::ZERO {
            errors.push("bankroll.base must be positive".to_string());
        }

        if self.promo.value < 0.0 {
            errors.push("promo.value must be non-negative".to_string());
        }
        if self.promo.haircut.margin_p_final_std < 0.0
            || self.promo.haircut.margin_p_final_flex < 0.0
        {
            errors.push("promo.haircut margins must be non-negative".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
