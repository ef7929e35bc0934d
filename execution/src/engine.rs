//! The transfer engine: the only code that moves chips between piles.
//!
//! Every movement is checked against the legal transfer graph and the current round phase,
//! applied atomically (all chips move or none do) and then reported to the audit sink.
//!
//! Legal movements:
//! - player stack -> bet, bet -> owning stack, while betting is open
//! - player stack or bet -> house stack to break chips, with the change returned to the player
//! - bet -> owner (payout, push, refund, cash-out) and bet -> house (forfeit) on settlement
//! - house -> owner for winnings
//!
//! Anything else is [WagerError::IllegalTransfer].

use crate::{
    audit::{AuditSink, NullSink},
    ledger::{BetTarget, WagerLedger},
    pile::ChipPile,
};
use felt_types::{
    chips_to_cash, AuditEvent, BetId, CashRecord, Chip, DenominationTable, Fraction, Missing,
    PayoutRatio, PileId, RoundPhase, SettlementKind, SettlementRecord, TransferReason,
    TransferRecord, WagerError,
};

/// How a bet leaves the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Won(PayoutRatio),
    Pushed,
    Forfeited,
    Refunded,
    CashedOut,
}

impl Resolution {
    fn kind(&self) -> SettlementKind {
        match self {
            Resolution::Won(_) => SettlementKind::Won,
            Resolution::Pushed => SettlementKind::Pushed,
            Resolution::Forfeited => SettlementKind::Forfeited,
            Resolution::Refunded => SettlementKind::Refunded,
            Resolution::CashedOut => SettlementKind::CashedOut,
        }
    }
}

/// A closed bet and the fractional winnings the house kept by flooring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settled {
    pub record: SettlementRecord,
    pub house_edge: Fraction,
}

pub struct TransferEngine<S: AuditSink = NullSink> {
    denominations: DenominationTable,
    player: ChipPile,
    house: ChipPile,
    ledger: WagerLedger,
    sink: S,
    round: u64,
    phase: RoundPhase,
    seq: u64,
    now_ms: u64,
    house_float: u64,
    cash_in_total: u64,
    cash_out_total: u64,
}

impl<S: AuditSink> TransferEngine<S> {
    /// Opens an engine with the house stack funded by `house_float`.
    pub fn new(
        denominations: DenominationTable,
        house_float: u64,
        sink: S,
    ) -> Result<Self, WagerError> {
        let house = ChipPile::from_chips(denominations.cash_to_chips(house_float)?);
        Ok(Self {
            denominations,
            player: ChipPile::new(),
            house,
            ledger: WagerLedger::new(),
            sink,
            round: 1,
            phase: RoundPhase::AcceptingBets,
            seq: 0,
            now_ms: 0,
            house_float,
            cash_in_total: 0,
            cash_out_total: 0,
        })
    }

    pub fn denominations(&self) -> &DenominationTable {
        &self.denominations
    }

    pub fn player(&self) -> &ChipPile {
        &self.player
    }

    pub fn house(&self) -> &ChipPile {
        &self.house
    }

    pub fn ledger(&self) -> &WagerLedger {
        &self.ledger
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn house_float(&self) -> u64 {
        self.house_float
    }

    pub fn cash_in_total(&self) -> u64 {
        self.cash_in_total
    }

    pub fn cash_out_total(&self) -> u64 {
        self.cash_out_total
    }

    /// Advances the logical clock stamped on audit records. Time never runs backwards.
    pub fn tick(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub(crate) fn set_phase(&mut self, phase: RoundPhase) {
        self.phase = phase;
    }

    pub(crate) fn open_round(&mut self, round: u64) {
        self.round = round;
        self.phase = RoundPhase::AcceptingBets;
        self.ledger.reset_areas();
    }

    pub(crate) fn register_area(&mut self, name: &str) -> bool {
        self.ledger.register_area(name)
    }

    pub fn pile(&self, id: PileId) -> Option<&ChipPile> {
        match id {
            PileId::Player => Some(&self.player),
            PileId::House => Some(&self.house),
            PileId::Bet(bet) => self.ledger.bet(bet).map(|bet| &bet.pile),
        }
    }

    /// Value of every chip on the table.
    pub fn total_chip_value(&self) -> u64 {
        self.player.total_value() + self.house.total_value() + self.ledger.total_value()
    }

    /// Chips on the table plus cash paid out equals cash paid in plus the house float.
    pub fn is_conserved(&self) -> bool {
        self.total_chip_value() as u128 + self.cash_out_total as u128
            == self.cash_in_total as u128 + self.house_float as u128
    }

    /// Converts cash into chips on the player stack.
    pub fn cash_in(&mut self, amount: u64) -> Result<u64, WagerError> {
        if amount == 0 {
            return Err(WagerError::InvalidAmount { amount });
        }
        // Every pile total stays below cash_in_total + house_float.
        let total = self
            .cash_in_total
            .checked_add(amount)
            .filter(|total| total.checked_add(self.house_float).is_some())
            .ok_or(WagerError::InvalidAmount { amount })?;
        let chips = self.denominations.cash_to_chips(amount)?;
        self.player.add_many(chips);
        self.cash_in_total = total;
        self.emit_cash(true, amount);
        tracing::info!(
            amount,
            balance = self.player.total_value(),
            "cash in"
        );
        Ok(self.player.total_value())
    }

    /// Converts a stack back to cash, returning its in-flight bets first.
    ///
    /// Only the player stack converts to cash.
    pub fn cash_out(&mut self, stack: PileId) -> Result<u64, WagerError> {
        if stack != PileId::Player {
            return Err(WagerError::IllegalTransfer {
                from: stack,
                to: PileId::Player,
            });
        }
        for id in self.ledger.bets_for_owner(stack) {
            match self.settle(id, Resolution::CashedOut) {
                Ok(_) | Err(WagerError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }
        let amount = chips_to_cash(&self.player.empty());
        self.cash_out_total += amount;
        self.emit_cash(false, amount);
        tracing::info!(amount, round = self.round, "cash out");
        Ok(amount)
    }

    /// Stakes `amount` from the player stack on `target`.
    pub fn place_bet(&mut self, target: BetTarget, amount: u64) -> Result<BetId, WagerError> {
        self.ensure_betting_open()?;
        if amount == 0 {
            return Err(WagerError::EmptyBet);
        }
        self.ledger.check_target(&target)?;
        let chips = self.player.withdraw_value(amount, &self.denominations)?;
        self.record_bet(target, chips)
    }

    /// Stakes specific chips from the player stack on `target`.
    pub fn place_chips(&mut self, target: BetTarget, chips: &[Chip]) -> Result<BetId, WagerError> {
        self.ensure_betting_open()?;
        if chips.is_empty() {
            return Err(WagerError::EmptyBet);
        }
        self.ledger.check_target(&target)?;
        let chips = self.player.remove_many(chips)?;
        self.record_bet(target, chips)
    }

    fn record_bet(&mut self, target: BetTarget, chips: Vec<Chip>) -> Result<BetId, WagerError> {
        let value = chips_to_cash(&chips);
        match self
            .ledger
            .place_bet(target, PileId::Player, chips.clone(), self.round)
        {
            Ok(id) => {
                self.emit_transfer(PileId::Player, PileId::Bet(id), value, TransferReason::Wager);
                Ok(id)
            }
            Err(err) => {
                self.player.add_many(chips);
                Err(err)
            }
        }
    }

    /// Adds `amount` from the player stack to one of the player's bets.
    pub fn extend_bet(&mut self, id: BetId, amount: u64) -> Result<(), WagerError> {
        self.ensure_betting_open()?;
        self.ensure_player_bet(id)?;
        if amount == 0 {
            return Err(WagerError::EmptyBet);
        }
        let chips = self.player.withdraw_value(amount, &self.denominations)?;
        self.commit_extend(id, chips)
    }

    /// Adds specific chips from the player stack to one of the player's bets.
    pub fn extend_bet_with(&mut self, id: BetId, chips: &[Chip]) -> Result<(), WagerError> {
        self.ensure_betting_open()?;
        self.ensure_player_bet(id)?;
        if chips.is_empty() {
            return Err(WagerError::EmptyBet);
        }
        let chips = self.player.remove_many(chips)?;
        self.commit_extend(id, chips)
    }

    fn commit_extend(&mut self, id: BetId, chips: Vec<Chip>) -> Result<(), WagerError> {
        let value = chips_to_cash(&chips);
        self.ledger.extend_bet(id, chips)?;
        self.emit_transfer(PileId::Player, PileId::Bet(id), value, TransferReason::Wager);
        Ok(())
    }

    /// Pulls `amount` out of a bet back to its owner. A bet emptied this way is dropped.
    pub fn withdraw(&mut self, id: BetId, amount: u64) -> Result<Vec<Chip>, WagerError> {
        self.ensure_betting_open()?;
        let owner = self.ensure_player_bet(id)?;
        let bet = self.ledger.bet_mut(id)?;
        let chips = bet.pile.withdraw_value(amount, &self.denominations)?;
        self.finish_withdraw(id, owner, chips)
    }

    /// Pulls specific chips out of a bet back to its owner.
    pub fn withdraw_chips(&mut self, id: BetId, chips: &[Chip]) -> Result<Vec<Chip>, WagerError> {
        self.ensure_betting_open()?;
        let owner = self.ensure_player_bet(id)?;
        let bet = self.ledger.bet_mut(id)?;
        let chips = bet.pile.remove_many(chips)?;
        self.finish_withdraw(id, owner, chips)
    }

    fn finish_withdraw(
        &mut self,
        id: BetId,
        owner: PileId,
        chips: Vec<Chip>,
    ) -> Result<Vec<Chip>, WagerError> {
        let value = chips_to_cash(&chips);
        self.stack_mut(owner, id)?.add_many(chips.iter().copied());
        self.emit_transfer(PileId::Bet(id), owner, value, TransferReason::Withdraw);
        if self.ledger.bet(id).is_some_and(|bet| bet.value() == 0) {
            self.ledger.remove(id);
        }
        Ok(chips)
    }

    /// Moves specific chips along a legal edge of the transfer graph.
    pub fn move_chips(
        &mut self,
        from: PileId,
        to: PileId,
        chips: &[Chip],
    ) -> Result<(), WagerError> {
        if from == to {
            return Ok(());
        }
        match (from, to) {
            (PileId::Player, PileId::Bet(id)) => self.extend_bet_with(id, chips),
            (PileId::Bet(id), PileId::Player) => self.withdraw_chips(id, chips).map(|_| ()),
            (PileId::Player | PileId::Bet(_), PileId::House) => {
                self.break_chips(from, chips).map(|_| ())
            }
            _ => Err(WagerError::IllegalTransfer { from, to }),
        }
    }

    /// Hands chips to the house and returns their change to the player stack.
    ///
    /// The house first pays the change out of its own chips. If it lacks the right pieces it
    /// breaks the handed-over chip itself and pays from that. All chips are broken or none are.
    pub fn break_chips(&mut self, from: PileId, chips: &[Chip]) -> Result<Vec<Chip>, WagerError> {
        if chips.is_empty() {
            return Ok(Vec::new());
        }
        match from {
            PileId::Player => {}
            PileId::Bet(id) => {
                self.ensure_betting_open()?;
                self.ensure_player_bet(id)?;
            }
            PileId::House => {
                return Err(WagerError::IllegalTransfer {
                    from,
                    to: PileId::House,
                })
            }
        }
        let mut changes = Vec::with_capacity(chips.len());
        for chip in chips {
            changes.push(self.denominations.make_change(chip.value())?);
        }
        let source = self.pile(from).ok_or(WagerError::NotFound(Missing::Pile(from)))?;
        if !source.contains_all(chips) {
            let missing = chips
                .iter()
                .find(|chip| !source.contains_all(&[**chip]))
                .map_or(0, Chip::value);
            return Err(WagerError::NotFound(Missing::Chip(missing)));
        }

        let mut house = self.house.clone();
        house.add_many(chips.iter().copied());
        for (chip, change) in chips.iter().zip(&changes) {
            pay_change(&mut house, &self.denominations, *chip, change)?;
        }

        if let PileId::Bet(id) = from {
            self.ledger.bet_mut(id)?.pile.remove_many(chips)?;
        } else {
            self.player.remove_many(chips)?;
        }
        self.house = house;
        let change: Vec<Chip> = changes.into_iter().flatten().collect();
        self.player.add_many(change.iter().copied());

        let value = chips_to_cash(chips);
        self.emit_transfer(from, PileId::House, value, TransferReason::Break);
        self.emit_transfer(PileId::House, PileId::Player, value, TransferReason::Change);
        if let PileId::Bet(id) = from {
            if self.ledger.bet(id).is_some_and(|bet| bet.value() == 0) {
                self.ledger.remove(id);
            }
        }
        Ok(change)
    }

    /// Closes a bet. Winnings come out of the house stack before anything else moves, so a
    /// failed payout leaves the bet and both stacks untouched.
    pub(crate) fn settle(
        &mut self,
        id: BetId,
        resolution: Resolution,
    ) -> Result<Settled, WagerError> {
        let bet = self
            .ledger
            .bet(id)
            .ok_or(WagerError::NotFound(Missing::Bet(id)))?;
        let owner = bet.owner();
        let wager = bet.value();
        let outcome = bet.target().label().to_string();
        let round = bet.round();
        if !owner.is_stack() {
            return Err(WagerError::IllegalTransfer {
                from: PileId::Bet(id),
                to: owner,
            });
        }

        let (payout, house_edge) = match resolution {
            Resolution::Won(ratio) => {
                let winnings = ratio.winnings(wager);
                let paid = self
                    .house
                    .withdraw_value(winnings.amount, &self.denominations)?;
                self.return_stake(id, owner, wager, TransferReason::Payout)?;
                self.stack_mut(owner, id)?.add_many(paid);
                self.emit_transfer(PileId::House, owner, winnings.amount, TransferReason::Winnings);
                (wager + winnings.amount, winnings.remainder)
            }
            Resolution::Pushed => {
                self.return_stake(id, owner, wager, TransferReason::Push)?;
                (wager, Fraction::ZERO)
            }
            Resolution::Refunded => {
                self.return_stake(id, owner, wager, TransferReason::Refund)?;
                (wager, Fraction::ZERO)
            }
            Resolution::CashedOut => {
                self.return_stake(id, owner, wager, TransferReason::CashOut)?;
                (wager, Fraction::ZERO)
            }
            Resolution::Forfeited => {
                self.return_stake(id, PileId::House, wager, TransferReason::Forfeit)?;
                (0, Fraction::ZERO)
            }
        };
        self.ledger.remove(id);

        let record = SettlementRecord {
            seq: self.next_seq(),
            round,
            bet: id,
            outcome,
            wager,
            payout,
            kind: resolution.kind(),
            timestamp_ms: self.now_ms,
        };
        tracing::debug!(
            bet = %id,
            outcome = %record.outcome,
            kind = ?record.kind,
            wager,
            payout,
            "bet settled"
        );
        self.sink.record(&AuditEvent::Settlement(record.clone()));
        Ok(Settled { record, house_edge })
    }

    fn return_stake(
        &mut self,
        id: BetId,
        to: PileId,
        value: u64,
        reason: TransferReason,
    ) -> Result<(), WagerError> {
        let chips = self.ledger.bet_mut(id)?.pile.empty();
        self.stack_mut(to, id)?.add_many(chips);
        self.emit_transfer(PileId::Bet(id), to, value, reason);
        Ok(())
    }

    fn stack_mut(&mut self, stack: PileId, bet: BetId) -> Result<&mut ChipPile, WagerError> {
        match stack {
            PileId::Player => Ok(&mut self.player),
            PileId::House => Ok(&mut self.house),
            PileId::Bet(_) => Err(WagerError::IllegalTransfer {
                from: PileId::Bet(bet),
                to: stack,
            }),
        }
    }

    fn ensure_betting_open(&self) -> Result<(), WagerError> {
        if self.phase.accepts_bets() {
            return Ok(());
        }
        Err(WagerError::BettingClosed {
            round: self.round,
            phase: self.phase,
        })
    }

    /// The bet exists, belongs to the current round and is owned by the player stack;
    /// returns its owner. Bets parked from earlier rounds only leave through a refund or a
    /// cash-out.
    fn ensure_player_bet(&self, id: BetId) -> Result<PileId, WagerError> {
        let bet = self
            .ledger
            .bet(id)
            .ok_or(WagerError::NotFound(Missing::Bet(id)))?;
        if bet.round() != self.round {
            return Err(WagerError::BettingClosed {
                round: bet.round(),
                phase: RoundPhase::Settled,
            });
        }
        if bet.owner() != PileId::Player {
            return Err(WagerError::IllegalTransfer {
                from: PileId::Player,
                to: PileId::Bet(id),
            });
        }
        Ok(bet.owner())
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn emit_transfer(&mut self, from: PileId, to: PileId, value: u64, reason: TransferReason) {
        if value == 0 {
            return;
        }
        let record = TransferRecord {
            seq: self.next_seq(),
            round: self.round,
            from,
            to,
            value,
            reason,
            timestamp_ms: self.now_ms,
        };
        tracing::debug!(
            seq = record.seq,
            round = record.round,
            %from,
            %to,
            value,
            ?reason,
            "chips moved"
        );
        self.sink.record(&AuditEvent::Transfer(record));
    }

    fn emit_cash(&mut self, inbound: bool, amount: u64) {
        let record = CashRecord {
            seq: self.next_seq(),
            inbound,
            amount,
            timestamp_ms: self.now_ms,
        };
        self.sink.record(&AuditEvent::Cash(record));
    }
}

/// Takes `change` for `chip` out of `house`, breaking `chip` itself if the house cannot.
fn pay_change(
    house: &mut ChipPile,
    denominations: &DenominationTable,
    chip: Chip,
    change: &[Chip],
) -> Result<(), WagerError> {
    if house.remove_many(change).is_ok() {
        return Ok(());
    }
    let unavailable = WagerError::ChangeUnavailable {
        value: chip.value(),
    };
    house.remove(chip).map_err(|_| unavailable.clone())?;
    house.add_many(
        denominations
            .make_change(chip.value())
            .map_err(|_| unavailable.clone())?,
    );
    house.remove_many(change).map_err(|_| unavailable)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemorySink;
    use felt_types::{DEFAULT_HOUSE_FLOAT, MAX_DECOMPOSITION_CHIPS};

    fn engine() -> TransferEngine<MemorySink> {
        let mut engine =
            TransferEngine::new(DenominationTable::default(), DEFAULT_HOUSE_FLOAT, MemorySink::new())
                .unwrap();
        engine.register_area("Player");
        engine.register_area("Banker");
        engine.cash_in(1_000).unwrap();
        engine
    }

    fn banker() -> BetTarget {
        BetTarget::Area("Banker".to_string())
    }

    #[test]
    fn test_place_bet_moves_value() {
        let mut engine = engine();
        let id = engine.place_bet(banker(), 100).unwrap();
        assert_eq!(engine.player().total_value(), 900);
        assert_eq!(engine.ledger().bet(id).unwrap().value(), 100);
        assert!(engine.is_conserved());
    }

    #[test]
    fn test_place_bet_unknown_area_leaves_stack() {
        let mut engine = engine();
        let err = engine
            .place_bet(BetTarget::Area("Dragon".to_string()), 100)
            .unwrap_err();
        assert_eq!(err, WagerError::NotFound(Missing::Area("Dragon".to_string())));
        assert_eq!(engine.player().total_value(), 1_000);
    }

    #[test]
    fn test_betting_closed_when_locked() {
        let mut engine = engine();
        engine.set_phase(RoundPhase::Locked);
        assert_eq!(
            engine.place_bet(banker(), 100),
            Err(WagerError::BettingClosed {
                round: 1,
                phase: RoundPhase::Locked
            })
        );
        assert_eq!(engine.player().total_value(), 1_000);
    }

    #[test]
    fn test_withdraw_removes_emptied_bet() {
        let mut engine = engine();
        let id = engine.place_bet(banker(), 30).unwrap();
        engine.withdraw(id, 10).unwrap();
        assert_eq!(engine.ledger().bet(id).unwrap().value(), 20);
        engine.withdraw(id, 20).unwrap();
        assert!(engine.ledger().bet(id).is_none());
        assert_eq!(engine.player().total_value(), 1_000);
    }

    #[test]
    fn test_break_chips_returns_change() {
        let mut engine = engine();
        let change = engine
            .break_chips(PileId::Player, &[Chip::new(500)])
            .unwrap();
        assert_eq!(chips_to_cash(&change), 500);
        assert!(change.iter().all(|chip| chip.value() < 500));
        assert_eq!(engine.player().total_value(), 1_000);
        assert_eq!(engine.house().total_value(), DEFAULT_HOUSE_FLOAT);
        assert!(engine.is_conserved());
    }

    #[test]
    fn test_break_unit_chip_is_rejected() {
        let mut engine = engine();
        engine.cash_in(1).unwrap();
        assert_eq!(
            engine.break_chips(PileId::Player, &[Chip::new(1)]),
            Err(WagerError::Unbreakable { value: 1 })
        );
    }

    #[test]
    fn test_house_breaks_handed_chip_when_short() {
        let mut engine =
            TransferEngine::new(DenominationTable::default(), 0, MemorySink::new()).unwrap();
        engine.cash_in(100).unwrap();
        let change = engine
            .break_chips(PileId::Player, &[Chip::new(100)])
            .unwrap();
        assert_eq!(chips_to_cash(&change), 100);
        assert!(engine.house().is_empty());
        assert!(engine.is_conserved());
    }

    #[test]
    fn test_illegal_transfers() {
        let mut engine = engine();
        assert_eq!(
            engine.move_chips(PileId::House, PileId::Player, &[Chip::new(5)]),
            Err(WagerError::IllegalTransfer {
                from: PileId::House,
                to: PileId::Player
            })
        );
        let first = engine.place_bet(banker(), 5).unwrap();
        let second = engine.place_bet(banker(), 5).unwrap();
        assert_eq!(
            engine.move_chips(PileId::Bet(first), PileId::Bet(second), &[Chip::new(5)]),
            Err(WagerError::IllegalTransfer {
                from: PileId::Bet(first),
                to: PileId::Bet(second)
            })
        );
    }

    #[test]
    fn test_settle_win_pays_from_house() {
        let mut engine = engine();
        let id = engine.place_bet(banker(), 100).unwrap();
        let settled = engine
            .settle(id, Resolution::Won(PayoutRatio::new(19, 20).unwrap()))
            .unwrap();
        assert_eq!(settled.record.payout, 195);
        assert!(settled.house_edge.is_zero());
        assert_eq!(engine.player().total_value(), 1_095);
        assert!(engine.ledger().is_empty());
        assert!(engine.is_conserved());
    }

    #[test]
    fn test_settle_win_without_house_funds_keeps_bet() {
        let mut engine =
            TransferEngine::new(DenominationTable::default(), 0, MemorySink::new()).unwrap();
        engine.register_area("Banker");
        engine.cash_in(100).unwrap();
        let id = engine.place_bet(banker(), 100).unwrap();
        let err = engine
            .settle(id, Resolution::Won(PayoutRatio::EVEN))
            .unwrap_err();
        assert!(matches!(err, WagerError::InsufficientFunds { .. }));
        assert_eq!(engine.ledger().bet(id).unwrap().value(), 100);
        assert!(engine.is_conserved());
    }

    #[test]
    fn test_audit_sequence_is_monotonic() {
        let mut engine = engine();
        engine.tick(5_000);
        let id = engine.place_bet(banker(), 25).unwrap();
        engine.settle(id, Resolution::Forfeited).unwrap();
        engine.cash_out(PileId::Player).unwrap();
        let events = engine.sink().events();
        assert!(events.windows(2).all(|pair| pair[0].seq() < pair[1].seq()));
        assert!(matches!(
            events.last(),
            Some(AuditEvent::Cash(CashRecord {
                inbound: false,
                amount: 975,
                timestamp_ms: 5_000,
                ..
            }))
        ));
    }

    #[test]
    fn test_cash_in_rejects_oversized_amounts() {
        let mut engine = engine();
        let events = engine.sink().events().len();
        assert_eq!(
            engine.cash_in(u64::MAX),
            Err(WagerError::InvalidAmount { amount: u64::MAX })
        );
        let too_many_chips = MAX_DECOMPOSITION_CHIPS * 500 + 1;
        assert_eq!(
            engine.cash_in(too_many_chips),
            Err(WagerError::InvalidAmount {
                amount: too_many_chips
            })
        );
        assert_eq!(engine.player().total_value(), 1_000);
        assert_eq!(engine.cash_in_total(), 1_000);
        assert_eq!(engine.sink().events().len(), events);
        assert!(engine.is_conserved());
    }

    #[test]
    fn test_cash_out_only_from_player_stack() {
        let mut engine = engine();
        assert_eq!(
            engine.cash_out(PileId::House),
            Err(WagerError::IllegalTransfer {
                from: PileId::House,
                to: PileId::Player
            })
        );
    }
}
