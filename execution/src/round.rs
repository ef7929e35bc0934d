//! Round controller for chip tables.
//!
//! Drives the phase machine and settles the ledger against the winning outcomes a game
//! variant reports. Game rules stay outside: the controller only knows the [GamePolicy]
//! it was handed for the round.
//!
//! ## Phases
//!
//! 1. **AcceptingBets** - bets may be placed, extended and withdrawn
//! 2. **Locked** - wagers are frozen, the variant plays its hand
//! 3. **Resolving** - settlement in progress
//! 4. **Settled** - every bet of the round is paid, pushed, forfeited or parked
//!
//! `new_round` moves a settled table back to `AcceptingBets`.

use crate::{
    audit::AuditSink,
    engine::{Resolution, TransferEngine},
    ledger::BetTarget,
    logging::{clamp_i64, format_resolved},
};
use felt_types::{
    BetId, Fraction, GamePolicy, Missing, RoundPhase, SettlementKind, SettlementRecord,
    WagerError,
};

/// Result of settling one round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettlementReport {
    pub round: u64,
    pub winners: Vec<String>,
    pub settled: Vec<SettlementRecord>,
    /// Bets that could not be settled, left in the ledger for administrative resolution.
    pub unsettled: Vec<(BetId, WagerError)>,
    /// Fractional winnings rounded away this round.
    pub house_edge: Fraction,
}

impl SettlementReport {
    /// Player's net result for the round.
    pub fn net(&self) -> i128 {
        self.settled.iter().map(SettlementRecord::net).sum()
    }

    pub fn count(&self, kind: SettlementKind) -> usize {
        self.settled
            .iter()
            .filter(|record| record.kind == kind)
            .count()
    }
}

#[derive(Clone, Debug)]
pub struct RoundController {
    policy: GamePolicy,
    house_edge: Fraction,
    unsettled: Vec<BetId>,
}

impl RoundController {
    /// Registers a betting area per policy outcome on the engine.
    pub fn new<S: AuditSink>(policy: GamePolicy, engine: &mut TransferEngine<S>) -> Self {
        for outcome in &policy.allowed_outcomes {
            engine.register_area(outcome);
        }
        Self {
            policy,
            house_edge: Fraction::ZERO,
            unsettled: Vec::new(),
        }
    }

    pub fn policy(&self) -> &GamePolicy {
        &self.policy
    }

    /// Fractional winnings rounded away across every round.
    pub fn house_edge(&self) -> Fraction {
        self.house_edge
    }

    /// Bets awaiting administrative resolution.
    pub fn unsettled(&self) -> &[BetId] {
        &self.unsettled
    }

    /// Phase that follows `phase`, or `None` once settled.
    pub fn next_phase(phase: RoundPhase) -> Option<RoundPhase> {
        match phase {
            RoundPhase::AcceptingBets => Some(RoundPhase::Locked),
            RoundPhase::Locked => Some(RoundPhase::Resolving),
            RoundPhase::Resolving => Some(RoundPhase::Settled),
            RoundPhase::Settled => None,
        }
    }

    fn require<S: AuditSink>(
        engine: &TransferEngine<S>,
        expected: RoundPhase,
    ) -> Result<(), WagerError> {
        let actual = engine.phase();
        if actual != expected {
            return Err(WagerError::InvalidPhase { expected, actual });
        }
        Ok(())
    }

    /// Closes betting for the current round.
    pub fn lock<S: AuditSink>(&mut self, engine: &mut TransferEngine<S>) -> Result<(), WagerError> {
        Self::require(engine, RoundPhase::AcceptingBets)?;
        engine.set_phase(RoundPhase::Locked);
        tracing::info!(
            round = engine.round(),
            bets = engine.ledger().len(),
            staked = engine.ledger().total_value(),
            "betting locked"
        );
        Ok(())
    }

    /// Settles every bet placed this round against `winners`.
    ///
    /// Winning bets are paid at the policy ratio (rounded down), push-slot bets are returned,
    /// and when a winner is the policy's push outcome every other losing bet is returned too.
    /// Remaining bets are forfeited to the house. A bet that cannot be settled is logged,
    /// left in the ledger and reported in [SettlementReport::unsettled]; settlement carries on.
    pub fn resolve<S: AuditSink>(
        &mut self,
        engine: &mut TransferEngine<S>,
        winners: &[&str],
    ) -> Result<SettlementReport, WagerError> {
        Self::require(engine, RoundPhase::Locked)?;
        if let Some(unknown) = winners.iter().find(|name| !self.policy.allows(name)) {
            return Err(WagerError::UnknownOutcome {
                name: unknown.to_string(),
            });
        }
        engine.set_phase(RoundPhase::Resolving);
        let round = engine.round();
        let push_round = winners.iter().any(|name| self.policy.is_push(name));

        let mut report = SettlementReport {
            round,
            winners: winners.iter().map(|name| name.to_string()).collect(),
            ..Default::default()
        };
        let placed: Vec<(BetId, BetTarget)> = engine
            .ledger()
            .bets()
            .filter(|bet| bet.round() == round)
            .map(|bet| (bet.id(), bet.target().clone()))
            .collect();

        for (id, target) in placed {
            let resolution = match &target {
                BetTarget::Push => Ok(Resolution::Pushed),
                BetTarget::Area(name) if winners.contains(&name.as_str()) => self
                    .policy
                    .ratio(name)
                    .map(Resolution::Won)
                    .ok_or(WagerError::UnknownOutcome { name: name.clone() }),
                BetTarget::Area(_) if push_round => Ok(Resolution::Pushed),
                BetTarget::Area(_) => Ok(Resolution::Forfeited),
            };
            match resolution.and_then(|resolution| engine.settle(id, resolution)) {
                Ok(settled) => {
                    report.house_edge = add_edge(report.house_edge, settled.house_edge);
                    report.settled.push(settled.record);
                }
                // Already closed by a concurrent cash-out.
                Err(WagerError::NotFound(Missing::Bet(_))) => {}
                Err(err) => {
                    tracing::warn!(
                        round,
                        bet = %id,
                        outcome = target.label(),
                        ?err,
                        "bet left unsettled"
                    );
                    self.unsettled.push(id);
                    report.unsettled.push((id, err));
                }
            }
        }

        self.house_edge = add_edge(self.house_edge, report.house_edge);
        engine.set_phase(RoundPhase::Settled);
        tracing::info!(
            round,
            winners = ?report.winners,
            settled = report.settled.len(),
            unsettled = report.unsettled.len(),
            net = clamp_i64(report.net()),
            house_edge = %report.house_edge,
            resolved = %format_resolved(&report.settled),
            "round settled"
        );
        Ok(report)
    }

    /// Opens the next round, optionally under a new policy. Areas for new outcomes are added;
    /// existing areas persist.
    pub fn new_round<S: AuditSink>(
        &mut self,
        engine: &mut TransferEngine<S>,
        policy: Option<GamePolicy>,
    ) -> Result<u64, WagerError> {
        Self::require(engine, RoundPhase::Settled)?;
        if let Some(policy) = policy {
            for outcome in &policy.allowed_outcomes {
                engine.register_area(outcome);
            }
            self.policy = policy;
        }
        let round = engine.round() + 1;
        engine.open_round(round);
        tracing::debug!(round, "round opened");
        Ok(round)
    }

    /// Returns an unsettled bet to its owner in full.
    pub fn refund_unsettled<S: AuditSink>(
        &mut self,
        engine: &mut TransferEngine<S>,
        id: BetId,
    ) -> Result<SettlementRecord, WagerError> {
        let position = self
            .unsettled
            .iter()
            .position(|held| *held == id)
            .ok_or(WagerError::NotFound(Missing::Bet(id)))?;
        let settled = match engine.settle(id, Resolution::Refunded) {
            Ok(settled) => settled,
            Err(WagerError::NotFound(missing)) => {
                self.unsettled.remove(position);
                return Err(WagerError::NotFound(missing));
            }
            Err(err) => return Err(err),
        };
        self.unsettled.remove(position);
        tracing::info!(bet = %id, wager = settled.record.wager, "unsettled bet refunded");
        Ok(settled.record)
    }
}

fn add_edge(total: Fraction, edge: Fraction) -> Fraction {
    total.checked_add(edge).unwrap_or(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::NullSink;
    use felt_types::{Chip, DenominationTable, PayoutRatio, PileId, DEFAULT_HOUSE_FLOAT};

    fn baccarat() -> GamePolicy {
        GamePolicy::new(
            &[
                ("Player", PayoutRatio::EVEN),
                ("Banker", PayoutRatio::new(19, 20).unwrap()),
                ("Tie", PayoutRatio::to_one(8)),
            ],
            Some("Tie"),
        )
        .unwrap()
    }

    fn setup() -> (RoundController, TransferEngine<NullSink>) {
        let mut engine =
            TransferEngine::new(DenominationTable::default(), DEFAULT_HOUSE_FLOAT, NullSink)
                .unwrap();
        let controller = RoundController::new(baccarat(), &mut engine);
        engine.cash_in(1_000).unwrap();
        (controller, engine)
    }

    fn area(name: &str) -> BetTarget {
        BetTarget::Area(name.to_string())
    }

    #[test]
    fn test_next_phase_sequence() {
        assert_eq!(
            RoundController::next_phase(RoundPhase::AcceptingBets),
            Some(RoundPhase::Locked)
        );
        assert_eq!(
            RoundController::next_phase(RoundPhase::Locked),
            Some(RoundPhase::Resolving)
        );
        assert_eq!(
            RoundController::next_phase(RoundPhase::Resolving),
            Some(RoundPhase::Settled)
        );
        assert_eq!(RoundController::next_phase(RoundPhase::Settled), None);
    }

    #[test]
    fn test_resolve_requires_lock() {
        let (mut controller, mut engine) = setup();
        assert_eq!(
            controller.resolve(&mut engine, &["Banker"]),
            Err(WagerError::InvalidPhase {
                expected: RoundPhase::Locked,
                actual: RoundPhase::AcceptingBets
            })
        );
        assert_eq!(
            controller.new_round(&mut engine, None),
            Err(WagerError::InvalidPhase {
                expected: RoundPhase::Settled,
                actual: RoundPhase::AcceptingBets
            })
        );
    }

    #[test]
    fn test_resolve_rejects_unknown_winner() {
        let (mut controller, mut engine) = setup();
        controller.lock(&mut engine).unwrap();
        assert_eq!(
            controller.resolve(&mut engine, &["Dragon"]),
            Err(WagerError::UnknownOutcome {
                name: "Dragon".to_string()
            })
        );
        assert_eq!(engine.phase(), RoundPhase::Locked);
    }

    #[test]
    fn test_tie_pushes_player_and_banker() {
        let (mut controller, mut engine) = setup();
        engine.place_bet(area("Player"), 100).unwrap();
        engine.place_bet(area("Banker"), 100).unwrap();
        engine.place_bet(area("Tie"), 10).unwrap();
        controller.lock(&mut engine).unwrap();
        let report = controller.resolve(&mut engine, &["Tie"]).unwrap();
        assert_eq!(report.count(SettlementKind::Pushed), 2);
        assert_eq!(report.count(SettlementKind::Won), 1);
        assert_eq!(report.net(), 80);
        assert_eq!(engine.player().total_value(), 1_080);
        assert!(engine.ledger().is_empty());
        assert!(engine.is_conserved());
    }

    #[test]
    fn test_fractional_winnings_accrue_to_house_edge() {
        let (mut controller, mut engine) = setup();
        engine.place_bet(area("Banker"), 7).unwrap();
        controller.lock(&mut engine).unwrap();
        let report = controller.resolve(&mut engine, &["Banker"]).unwrap();
        // 7 * 19/20 = 6.65
        assert_eq!(report.settled[0].payout, 13);
        assert_eq!(report.house_edge, Fraction::new(13, 20));
        assert_eq!(controller.house_edge(), Fraction::new(13, 20));
    }

    #[test]
    fn test_unfunded_payout_is_parked_then_refunded() {
        let mut engine = TransferEngine::new(DenominationTable::default(), 0, NullSink).unwrap();
        let mut controller = RoundController::new(baccarat(), &mut engine);
        engine.cash_in(200).unwrap();
        let winner = engine.place_bet(area("Player"), 100).unwrap();
        engine.place_bet(area("Banker"), 50).unwrap();
        controller.lock(&mut engine).unwrap();
        let report = controller.resolve(&mut engine, &["Player"]).unwrap();
        assert_eq!(report.unsettled.len(), 1);
        assert_eq!(report.unsettled[0].0, winner);
        assert_eq!(controller.unsettled(), &[winner]);
        assert_eq!(engine.phase(), RoundPhase::Settled);
        assert_eq!(engine.ledger().bet(winner).unwrap().value(), 100);

        controller.new_round(&mut engine, None).unwrap();
        let closed = WagerError::BettingClosed {
            round: 1,
            phase: RoundPhase::Settled,
        };
        assert_eq!(engine.extend_bet(winner, 5), Err(closed.clone()));
        assert_eq!(engine.withdraw(winner, 50), Err(closed.clone()));
        assert_eq!(
            engine.break_chips(PileId::Bet(winner), &[Chip::new(100)]),
            Err(closed)
        );
        assert_eq!(engine.ledger().bet(winner).unwrap().value(), 100);
        assert_eq!(engine.player().total_value(), 50);

        let record = controller.refund_unsettled(&mut engine, winner).unwrap();
        assert_eq!(record.kind, SettlementKind::Refunded);
        assert_eq!(engine.player().total_value(), 150);
        assert!(controller.unsettled().is_empty());
        assert!(engine.is_conserved());
    }

    #[test]
    fn test_new_round_adds_policy_areas() {
        let (mut controller, mut engine) = setup();
        controller.lock(&mut engine).unwrap();
        controller.resolve(&mut engine, &["Player"]).unwrap();
        let dragon = GamePolicy::new(
            &[
                ("Player", PayoutRatio::EVEN),
                ("Dragon", PayoutRatio::to_one(40)),
            ],
            None,
        )
        .unwrap();
        assert_eq!(controller.new_round(&mut engine, Some(dragon)).unwrap(), 2);
        assert!(engine.ledger().area("Dragon").is_some());
        assert!(engine.phase().accepts_bets());
    }
}
