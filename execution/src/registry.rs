//! Game registry for the variants that wager through the chip engine.
//!
//! The registry provides:
//! - Centralized listing of supported games
//! - Per-game configuration with defaults, and the [GamePolicy] each configuration implies
//! - Metadata for UI display (names, descriptions)
//!
//! # Example
//! ```rust
//! use felt_execution::registry::GameRegistry;
//! use felt_types::GameType;
//!
//! let registry = GameRegistry::default();
//! let policy = registry.policy_for(GameType::Baccarat).unwrap();
//! assert!(policy.is_push("Tie"));
//! ```

use felt_types::{GamePolicy, GameType, PayoutRatio, PolicyError};
use std::collections::HashMap;

/// Most cards a bingo table deals per round.
pub const MAX_BINGO_CARDS: u8 = 16;

/// Per-game configuration values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameConfig {
    Baccarat(BaccaratConfig),
    Keno(KenoConfig),
    Bingo(BingoConfig),
}

impl GameConfig {
    /// Create a default configuration for a game type.
    pub fn default_for(game_type: GameType) -> Self {
        match game_type {
            GameType::Baccarat => Self::Baccarat(BaccaratConfig::default()),
            GameType::Keno => Self::Keno(KenoConfig::default()),
            GameType::Bingo => Self::Bingo(BingoConfig::default()),
        }
    }

    pub fn game_type(&self) -> GameType {
        match self {
            Self::Baccarat(_) => GameType::Baccarat,
            Self::Keno(_) => GameType::Keno,
            Self::Bingo(_) => GameType::Bingo,
        }
    }

    /// Outcomes and pay table this configuration hands to the round controller.
    pub fn policy(&self) -> Result<GamePolicy, PolicyError> {
        match self {
            Self::Baccarat(c) => c.policy(),
            Self::Keno(c) => c.policy(),
            Self::Bingo(c) => c.policy(),
        }
    }
}

// ============================================================================
// Per-game configuration structs
// ============================================================================

/// Baccarat configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaccaratConfig {
    /// Commission percentage on banker wins (typically 5%).
    pub banker_commission_pct: u8,
    /// Tie pays this many to one.
    pub tie_pays: u8,
}

impl Default for BaccaratConfig {
    fn default() -> Self {
        Self {
            banker_commission_pct: 5,
            tie_pays: 8,
        }
    }
}

impl BaccaratConfig {
    /// Player pays even money, Banker pays even less commission, and a Tie pushes both.
    pub fn policy(&self) -> Result<GamePolicy, PolicyError> {
        let banker_pct = 100u64.saturating_sub(self.banker_commission_pct as u64);
        GamePolicy::new(
            &[
                ("Player", PayoutRatio::EVEN),
                ("Banker", PayoutRatio::new(banker_pct, 100)?),
                ("Tie", PayoutRatio::to_one(self.tie_pays as u64)),
            ],
            Some("Tie"),
        )
    }
}

/// Keno "heads or tails" configuration: twenty balls are drawn from eighty and players back
/// the half (1-40 or 41-80) that produces more of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KenoConfig {
    /// Heads and Tails pay this many to one.
    pub side_pays: u8,
    /// An even 10/10 split pays this many to one and pushes Heads and Tails.
    pub evens_pays: u8,
}

impl Default for KenoConfig {
    fn default() -> Self {
        Self {
            side_pays: 1,
            evens_pays: 3,
        }
    }
}

impl KenoConfig {
    pub fn policy(&self) -> Result<GamePolicy, PolicyError> {
        GamePolicy::new(
            &[
                ("Heads", PayoutRatio::to_one(self.side_pays as u64)),
                ("Tails", PayoutRatio::to_one(self.side_pays as u64)),
                ("Evens", PayoutRatio::to_one(self.evens_pays as u64)),
            ],
            Some("Evens"),
        )
    }
}

/// Winning pattern for a bingo round; harder patterns pay more.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BingoPattern {
    #[default]
    Line,
    FourCorners,
    Diagonal,
    FullHouse,
}

impl BingoPattern {
    /// Winnings multiple for a card completing this pattern.
    pub fn pays(&self) -> u64 {
        match self {
            Self::Line => 3,
            Self::FourCorners => 5,
            Self::Diagonal => 4,
            Self::FullHouse => 25,
        }
    }
}

/// Bingo configuration: players back numbered cards, and the cards that complete the pattern
/// first win.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BingoConfig {
    pub cards: u8,
    pub pattern: BingoPattern,
}

impl Default for BingoConfig {
    fn default() -> Self {
        Self {
            cards: 4,
            pattern: BingoPattern::Line,
        }
    }
}

impl BingoConfig {
    pub fn card_name(index: u8) -> String {
        format!("Card {}", index + 1)
    }

    /// One outcome per card, all paying the pattern's multiple.
    pub fn policy(&self) -> Result<GamePolicy, PolicyError> {
        if self.cards > MAX_BINGO_CARDS {
            return Err(PolicyError::TooManyOutcomes {
                count: self.cards as usize,
                max: MAX_BINGO_CARDS as usize,
            });
        }
        let names: Vec<String> = (0..self.cards).map(Self::card_name).collect();
        let ratio = PayoutRatio::to_one(self.pattern.pays());
        let outcomes: Vec<(&str, PayoutRatio)> =
            names.iter().map(|name| (name.as_str(), ratio)).collect();
        GamePolicy::new(&outcomes, None)
    }
}

// ============================================================================
// Game metadata
// ============================================================================

/// Metadata about a game for UI display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameInfo {
    pub game_type: GameType,
    pub name: &'static str,
    pub description: &'static str,
}

// ============================================================================
// Game registry
// ============================================================================

/// Registry of available games and their configurations.
#[derive(Clone, Debug)]
pub struct GameRegistry {
    configs: HashMap<GameType, GameConfig>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    /// Create a new registry with all games using default configurations.
    pub fn new() -> Self {
        let configs = GameType::ALL
            .into_iter()
            .map(|game_type| (game_type, GameConfig::default_for(game_type)))
            .collect();
        Self { configs }
    }

    /// Get static metadata for a game type.
    pub fn get_info(game_type: GameType) -> GameInfo {
        let (name, description) = match game_type {
            GameType::Baccarat => (
                "Baccarat",
                "Classic card comparison game. Bet on Player, Banker, or Tie.",
            ),
            GameType::Keno => (
                "Keno",
                "Heads or tails keno. Back the half of the board that draws more balls.",
            ),
            GameType::Bingo => (
                "Bingo",
                "Back a card and win when it completes the round's pattern first.",
            ),
        };
        GameInfo {
            game_type,
            name,
            description,
        }
    }

    /// Replaces a game's configuration.
    pub fn set_config(&mut self, config: GameConfig) {
        self.configs.insert(config.game_type(), config);
    }

    /// Policy for a game's current configuration.
    pub fn policy_for(&self, game_type: GameType) -> Result<GamePolicy, PolicyError> {
        self.configs
            .get(&game_type)
            .cloned()
            .unwrap_or_else(|| GameConfig::default_for(game_type))
            .policy()
    }
}
