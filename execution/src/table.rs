//! Table facade for the presentation layer.
//!
//! A [Table] bundles the transfer engine, round controller and pending drags behind the
//! synchronous API a front end calls: cash in and out, place and withdraw bets, drag chips
//! between piles, and drive rounds. Front ends read state through [Table::snapshot].

use crate::{
    audit::{AuditSink, NullSink},
    engine::TransferEngine,
    ledger::{BetTarget, WagerLedger},
    logging::format_chip_list,
    round::{RoundController, SettlementReport},
};
use felt_types::{
    chips_to_cash, BetId, Chip, DenominationTable, Fraction, GamePolicy, GameType, Missing,
    PileId, PolicyError, RoundPhase, SettlementRecord, WagerError, DEFAULT_HOUSE_FLOAT,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

/// Errors raised while opening a table.
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum TableError {
    #[error("invalid game policy: {0}")]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Wager(#[from] WagerError),
}

/// Everything needed to open a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableConfig {
    pub game: GameType,
    pub denominations: DenominationTable,
    pub house_float: u64,
    pub policy: GamePolicy,
}

impl TableConfig {
    /// Default denominations and house float with the given policy.
    pub fn new(game: GameType, policy: GamePolicy) -> Self {
        Self {
            game,
            denominations: DenominationTable::default(),
            house_float: DEFAULT_HOUSE_FLOAT,
            policy,
        }
    }
}

/// Chips picked up from a pile but not yet dropped. The chips stay in their origin pile
/// until the drop commits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragToken {
    id: u64,
    origin: PileId,
    chips: Vec<Chip>,
}

impl DragToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn origin(&self) -> PileId {
        self.origin
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    /// Value shown while hovering.
    pub fn value(&self) -> u64 {
        chips_to_cash(&self.chips)
    }
}

/// Where a drag was released.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropTarget {
    Area(String),
    PushSlot,
    Bet(BetId),
    PlayerStack,
    HouseStack,
}

/// What a committed drop did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    Placed(BetId),
    Extended(BetId),
    /// Chips went back to (or never left) the player stack.
    Returned,
    /// Chips were broken by the house; the change landed on the player stack.
    Broken(Vec<Chip>),
}

/// Read-only view of a table for presentation code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSnapshot {
    pub game: GameType,
    pub round: u64,
    pub phase: RoundPhase,
    pub player_total: u64,
    pub house_total: u64,
    pub bets_total: u64,
    pub totals_by_outcome: BTreeMap<String, u64>,
    pub live_bets: usize,
    pub pending_drags: usize,
    pub cash_in_total: u64,
    pub cash_out_total: u64,
    pub house_edge: Fraction,
    pub now_ms: u64,
}

pub struct Table<S: AuditSink = NullSink> {
    game: GameType,
    engine: TransferEngine<S>,
    controller: RoundController,
    drags: BTreeMap<u64, DragToken>,
    next_drag: u64,
}

impl<S: AuditSink> Table<S> {
    /// Opens a table at round 1, accepting bets, with an empty player stack.
    pub fn new(config: TableConfig, sink: S) -> Result<Self, TableError> {
        config.policy.validate()?;
        let mut engine = TransferEngine::new(config.denominations, config.house_float, sink)?;
        let controller = RoundController::new(config.policy, &mut engine);
        tracing::info!(
            game = %config.game,
            house_float = config.house_float,
            "table opened"
        );
        Ok(Self {
            game: config.game,
            engine,
            controller,
            drags: BTreeMap::new(),
            next_drag: 0,
        })
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    pub fn policy(&self) -> &GamePolicy {
        self.controller.policy()
    }

    pub fn round(&self) -> u64 {
        self.engine.round()
    }

    pub fn phase(&self) -> RoundPhase {
        self.engine.phase()
    }

    pub fn engine(&self) -> &TransferEngine<S> {
        &self.engine
    }

    pub fn ledger(&self) -> &WagerLedger {
        self.engine.ledger()
    }

    pub fn sink(&self) -> &S {
        self.engine.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.engine.sink_mut()
    }

    pub fn unsettled(&self) -> &[BetId] {
        self.controller.unsettled()
    }

    /// Advances the logical clock used for audit timestamps.
    pub fn tick(&mut self, now_ms: u64) {
        self.engine.tick(now_ms);
    }

    /// Chips on the table plus cash paid out equals cash paid in plus the house float.
    pub fn is_conserved(&self) -> bool {
        self.engine.is_conserved()
    }

    pub fn cash_in(&mut self, amount: u64) -> Result<u64, WagerError> {
        self.engine.cash_in(amount)
    }

    /// Returns the stack's in-flight bets, converts it to cash and clears pending drags.
    pub fn cash_out(&mut self, stack: PileId) -> Result<u64, WagerError> {
        let amount = self.engine.cash_out(stack)?;
        self.drags.clear();
        Ok(amount)
    }

    /// Withdraws `amount` from `stack` and stakes it on `target`.
    ///
    /// Only the player stack stakes bets. Outcomes must be offered by the current policy.
    pub fn place_bet(
        &mut self,
        target: BetTarget,
        stack: PileId,
        amount: u64,
    ) -> Result<BetId, WagerError> {
        self.check_stake(&target, stack)?;
        self.engine.place_bet(target, amount)
    }

    /// Stakes specific chips from the player stack on `target`.
    pub fn place_chips(&mut self, target: BetTarget, chips: &[Chip]) -> Result<BetId, WagerError> {
        self.check_stake(&target, PileId::Player)?;
        self.engine.place_chips(target, chips)
    }

    fn check_stake(&self, target: &BetTarget, stack: PileId) -> Result<(), WagerError> {
        if stack != PileId::Player {
            return Err(WagerError::NotFound(Missing::Pile(stack)));
        }
        if let BetTarget::Area(name) = target {
            if !self.controller.policy().allows(name) {
                return Err(WagerError::UnknownOutcome { name: name.clone() });
            }
        }
        Ok(())
    }

    pub fn extend_bet(&mut self, bet: BetId, amount: u64) -> Result<(), WagerError> {
        self.engine.extend_bet(bet, amount)
    }

    /// Takes `amount` off a bet back to its owner.
    pub fn withdraw(&mut self, bet: BetId, amount: u64) -> Result<Vec<Chip>, WagerError> {
        self.engine.withdraw(bet, amount)
    }

    /// Hands chips from the player stack to the house for change.
    pub fn break_chips(&mut self, chips: &[Chip]) -> Result<Vec<Chip>, WagerError> {
        self.engine.break_chips(PileId::Player, chips)
    }

    /// Starts a drag of `chips` out of `origin`.
    pub fn pickup(&mut self, origin: PileId, chips: &[Chip]) -> Result<DragToken, WagerError> {
        if chips.is_empty() {
            return Err(WagerError::EmptyBet);
        }
        if origin == PileId::House {
            return Err(WagerError::IllegalTransfer {
                from: origin,
                to: PileId::Player,
            });
        }
        if matches!(origin, PileId::Bet(_)) && !self.phase().accepts_bets() {
            return Err(WagerError::BettingClosed {
                round: self.round(),
                phase: self.phase(),
            });
        }
        let pile = self
            .engine
            .pile(origin)
            .ok_or(WagerError::NotFound(Missing::Pile(origin)))?;
        if let Some(missing) = chips.iter().find(|chip| !pile.contains_all(&[**chip])) {
            return Err(WagerError::NotFound(Missing::Chip(missing.value())));
        }
        if !pile.contains_all(chips) {
            return Err(WagerError::InsufficientFunds {
                available: pile.total_value(),
                requested: chips_to_cash(chips),
            });
        }

        let token = DragToken {
            id: self.next_drag,
            origin,
            chips: chips.to_vec(),
        };
        self.next_drag += 1;
        self.drags.insert(token.id, token.clone());
        tracing::debug!(
            drag = token.id,
            %origin,
            chips = %format_chip_list(chips),
            value = token.value(),
            "chips picked up"
        );
        Ok(token)
    }

    /// Commits a drag. On failure the drag is discarded and the chips stay in their origin.
    pub fn drop(&mut self, drag: u64, target: DropTarget) -> Result<DropOutcome, WagerError> {
        let token = self
            .drags
            .remove(&drag)
            .ok_or(WagerError::NotFound(Missing::Drag(drag)))?;
        let origin = token.origin;
        let chips = token.chips.as_slice();
        let result = match (origin, &target) {
            (PileId::Player, DropTarget::PlayerStack) => Ok(DropOutcome::Returned),
            (PileId::Bet(bet), DropTarget::PlayerStack) => self
                .engine
                .withdraw_chips(bet, chips)
                .map(|_| DropOutcome::Returned),
            (_, DropTarget::HouseStack) => self
                .engine
                .break_chips(origin, chips)
                .map(DropOutcome::Broken),
            (PileId::Player, DropTarget::Area(name)) => self
                .place_chips(BetTarget::Area(name.clone()), chips)
                .map(DropOutcome::Placed),
            (PileId::Player, DropTarget::PushSlot) => self
                .place_chips(BetTarget::Push, chips)
                .map(DropOutcome::Placed),
            (PileId::Player, DropTarget::Bet(bet)) => self
                .engine
                .extend_bet_with(*bet, chips)
                .map(|_| DropOutcome::Extended(*bet)),
            (PileId::Bet(from), DropTarget::Bet(to)) if from == *to => Ok(DropOutcome::Extended(from)),
            (from, DropTarget::Bet(to)) => Err(WagerError::IllegalTransfer {
                from,
                to: PileId::Bet(*to),
            }),
            (from, _) => Err(WagerError::IllegalTransfer {
                from,
                to: PileId::Player,
            }),
        };
        match &result {
            Ok(outcome) => {
                tracing::debug!(drag, %origin, ?target, ?outcome, "chips dropped");
            }
            Err(err) => {
                tracing::debug!(drag, %origin, ?target, ?err, "drop rejected");
            }
        }
        result
    }

    /// Abandons a drag; nothing moves.
    pub fn cancel_drag(&mut self, drag: u64) -> Result<DragToken, WagerError> {
        self.drags
            .remove(&drag)
            .ok_or(WagerError::NotFound(Missing::Drag(drag)))
    }

    pub fn pending_drags(&self) -> impl Iterator<Item = &DragToken> {
        self.drags.values()
    }

    pub fn lock(&mut self) -> Result<(), WagerError> {
        self.controller.lock(&mut self.engine)
    }

    /// Settles the round against the winning outcomes reported by the variant.
    pub fn resolve(&mut self, winners: &[&str]) -> Result<SettlementReport, WagerError> {
        self.controller.resolve(&mut self.engine, winners)
    }

    /// Opens the next round, optionally with a new policy.
    pub fn new_round(&mut self, policy: Option<GamePolicy>) -> Result<u64, TableError> {
        if let Some(policy) = &policy {
            policy.validate()?;
        }
        Ok(self.controller.new_round(&mut self.engine, policy)?)
    }

    pub fn refund_unsettled(&mut self, bet: BetId) -> Result<SettlementRecord, WagerError> {
        self.controller.refund_unsettled(&mut self.engine, bet)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        let ledger = self.engine.ledger();
        TableSnapshot {
            game: self.game,
            round: self.engine.round(),
            phase: self.engine.phase(),
            player_total: self.engine.player().total_value(),
            house_total: self.engine.house().total_value(),
            bets_total: ledger.total_value(),
            totals_by_outcome: ledger.totals_by_outcome(),
            live_bets: ledger.len(),
            pending_drags: self.drags.len(),
            cash_in_total: self.engine.cash_in_total(),
            cash_out_total: self.engine.cash_out_total(),
            house_edge: self.controller.house_edge(),
            now_ms: self.engine.now_ms(),
        }
    }
}
