//! Randomly play rounds at a felt table and check that no chip value is ever created or lost.

mod state_machine;

use anyhow::{bail, Context, Result};
use felt_execution::{
    registry::GameRegistry, BingoConfig, GameConfig, GameStats, LogSink, StatsSink, Table,
    TableConfig,
};
use felt_types::{
    DenominationTable, GameType, PileId, PolicyError, WagerError, DEFAULT_DENOMINATIONS,
    DEFAULT_HOUSE_FLOAT, STARTING_CASH,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
pub use state_machine::{Action, Activity, Bot, Status};
use std::str::FromStr;
use thiserror::Error as ThisError;
use tracing::{debug, info, warn, Level};

/// Simulated time between rounds.
const DEFAULT_ROUND_MS: u64 = 15_000;

/// Most bingo cards that can win a single round.
const MAX_BINGO_WINNERS: usize = 3;

/// Errors in a randotron config file.
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid log level '{0}'")]
    LogLevel(String),
    #[error("at least one round must be played")]
    NoRounds,
    #[error("opening cash must be positive")]
    NoCash,
    #[error("invalid bet range ({min}..={max})")]
    BetRange { min: u64, max: u64 },
    #[error("invalid denominations: {0}")]
    Denominations(#[from] WagerError),
    #[error("invalid game policy: {0}")]
    Policy(#[from] PolicyError),
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_opening_cash() -> u64 {
    STARTING_CASH
}

fn default_house_float() -> u64 {
    DEFAULT_HOUSE_FLOAT
}

fn default_denominations() -> Vec<u64> {
    DEFAULT_DENOMINATIONS.to_vec()
}

fn default_round_ms() -> u64 {
    DEFAULT_ROUND_MS
}

/// Configuration for a randotron run (from config file)
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub seed: u64,
    pub rounds: u64,
    pub game: GameType,
    #[serde(default = "default_opening_cash")]
    pub opening_cash: u64,
    #[serde(default = "default_house_float")]
    pub house_float: u64,
    #[serde(default = "default_denominations")]
    pub denominations: Vec<u64>,
    pub min_bet: u64,
    pub max_bet: u64,
    pub bets_per_round: usize,
    #[serde(default = "default_round_ms")]
    pub round_ms: u64,
    /// Cards dealt per bingo round; the registry default when unset.
    #[serde(default)]
    pub bingo_cards: Option<u8>,
}

impl Config {
    pub fn level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level).map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine_config().map(|_| ())
    }

    /// Resolves the file-level settings into an [EngineConfig].
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        self.level()?;
        if self.rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if self.opening_cash == 0 {
            return Err(ConfigError::NoCash);
        }
        if self.min_bet == 0 || self.min_bet > self.max_bet {
            return Err(ConfigError::BetRange {
                min: self.min_bet,
                max: self.max_bet,
            });
        }
        let denominations = DenominationTable::new(&self.denominations)?;
        let mut registry = GameRegistry::new();
        if let (GameType::Bingo, Some(cards)) = (self.game, self.bingo_cards) {
            registry.set_config(GameConfig::Bingo(BingoConfig {
                cards,
                ..BingoConfig::default()
            }));
        }
        let policy = registry.policy_for(self.game)?;
        let mut table = TableConfig::new(self.game, policy);
        table.denominations = denominations;
        table.house_float = self.house_float;
        Ok(EngineConfig {
            table,
            seed: self.seed,
            rounds: self.rounds,
            opening_cash: self.opening_cash,
            min_bet: self.min_bet,
            max_bet: self.max_bet,
            bets_per_round: self.bets_per_round,
            round_ms: self.round_ms,
        })
    }
}

/// Configuration for the randotron engine
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub table: TableConfig,
    pub seed: u64,
    pub rounds: u64,
    pub opening_cash: u64,
    pub min_bet: u64,
    pub max_bet: u64,
    pub bets_per_round: usize,
    pub round_ms: u64,
}

/// What a finished run looked like.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub game: GameType,
    pub rounds: u64,
    pub cashed_in: u64,
    pub cashed_out: u64,
    pub rebuys: u64,
    pub refunded: usize,
    pub events: usize,
    pub stats: GameStats,
    pub activity: Activity,
}

/// Plays configured rounds at a single table.
pub struct Engine {
    config: EngineConfig,
    table: Table<(StatsSink, LogSink)>,
    bot: Bot,
    rng: ChaCha20Rng,
    rebuys: u64,
    refunded: usize,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let game = config.table.game;
        let table = Table::new(config.table.clone(), (StatsSink::new(game), LogSink::new()))
            .context("failed to open table")?;
        let bot = Bot::new(
            config.table.policy.allowed_outcomes.clone(),
            config.min_bet,
            config.max_bet,
            config.bets_per_round,
        );
        let rng = ChaCha20Rng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            table,
            bot,
            rng,
            rebuys: 0,
            refunded: 0,
        })
    }

    pub fn table(&self) -> &Table<(StatsSink, LogSink)> {
        &self.table
    }

    /// Runs every round, cashes out and returns the summary. Fails as soon as the table
    /// stops conserving value.
    pub fn run(mut self) -> Result<Summary> {
        self.table.cash_in(self.config.opening_cash)?;
        for _ in 0..self.config.rounds {
            self.play_round()?;
        }

        let cashed_in = self.table.engine().cash_in_total();
        let cashed_out = self.table.cash_out(PileId::Player)?;
        self.check("cash out")?;

        let (stats, log) = self.table.sink();
        let events = LogSink::replay(log.as_bytes()).context("audit log does not replay")?;
        if events.len() != log.len() {
            bail!(
                "audit log replayed {} of {} events",
                events.len(),
                log.len()
            );
        }
        let stats = stats.stats().clone();
        if cashed_out as i128 - cashed_in as i128 != stats.net() {
            bail!(
                "cash out {} does not match settlements (cash in {}, net {})",
                cashed_out,
                cashed_in,
                stats.net()
            );
        }

        Ok(Summary {
            game: self.table.game(),
            rounds: self.config.rounds,
            cashed_in,
            cashed_out,
            rebuys: self.rebuys,
            refunded: self.refunded,
            events: events.len(),
            stats,
            activity: self.bot.activity(),
        })
    }

    fn play_round(&mut self) -> Result<()> {
        let round = self.table.round();
        self.table.tick(round * self.config.round_ms);
        if self.table.engine().player().total_value() < self.config.min_bet {
            self.table.cash_in(self.config.opening_cash)?;
            self.rebuys += 1;
            info!(round, rebuys = self.rebuys, "rebuy");
        }

        self.bot.start_round();
        while let Some(action) = self.bot.next_action(&self.table, &mut self.rng) {
            let _ = self.bot.apply(&mut self.table, action);
            self.check("action")?;
        }

        let winners = self.pick_winners();
        let winners: Vec<&str> = winners.iter().map(String::as_str).collect();
        let report = self.table.resolve(&winners)?;
        self.check("resolve")?;
        debug!(round, ?winners, net = report.net(), "round resolved");

        for (bet, err) in &report.unsettled {
            warn!(round, %bet, ?err, "refunding unsettled bet");
            self.table.refund_unsettled(*bet)?;
            self.refunded += 1;
            self.check("refund")?;
        }
        self.table.new_round(None)?;
        Ok(())
    }

    fn pick_winners(&mut self) -> Vec<String> {
        let outcomes = &self.table.policy().allowed_outcomes;
        let count = match self.table.game() {
            GameType::Bingo => self.rng.gen_range(1..=MAX_BINGO_WINNERS.min(outcomes.len())),
            GameType::Baccarat | GameType::Keno => 1,
        };
        outcomes
            .choose_multiple(&mut self.rng, count)
            .cloned()
            .collect()
    }

    fn check(&self, step: &str) -> Result<()> {
        if !self.table.is_conserved() {
            let snapshot = self.table.snapshot();
            bail!(
                "value not conserved after {} in round {}: {:?}",
                step,
                snapshot.round,
                snapshot
            );
        }
        Ok(())
    }
}
