use felt_execution::{AuditSink, BetTarget, DropOutcome, DropTarget, Table};
use felt_types::{BetId, Chip, PileId, WagerError};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, warn};

/// Where the bot is within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Betting { remaining: usize },
    Waiting,
}

/// A single move the bot makes at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Bet { outcome: String, amount: u64 },
    Push { amount: u64 },
    Extend { bet: BetId, amount: u64 },
    Withdraw { bet: BetId, amount: u64 },
    Drag { chips: Vec<Chip>, target: DropTarget },
    Break { chip: Chip },
    Lock,
}

/// Counters for everything the bot attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activity {
    pub placed: usize,
    pub extended: usize,
    pub withdrawn: usize,
    pub dragged: usize,
    pub broken: usize,
    pub rejected: usize,
}

/// Random bettor. Picks actions from the live table state and applies them.
pub struct Bot {
    outcomes: Vec<String>,
    min_bet: u64,
    max_bet: u64,
    bets_per_round: usize,
    status: Status,
    activity: Activity,
}

impl Bot {
    pub fn new(outcomes: Vec<String>, min_bet: u64, max_bet: u64, bets_per_round: usize) -> Self {
        Self {
            outcomes,
            min_bet,
            max_bet,
            bets_per_round,
            status: Status::Idle,
            activity: Activity::default(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn start_round(&mut self) {
        self.status = Status::Betting {
            remaining: self.bets_per_round,
        };
    }

    /// Next action to take, or `None` once the round is locked.
    pub fn next_action<S: AuditSink, R: Rng>(
        &mut self,
        table: &Table<S>,
        rng: &mut R,
    ) -> Option<Action> {
        let remaining = match &mut self.status {
            Status::Idle | Status::Waiting => return None,
            Status::Betting { remaining } => remaining,
        };
        if *remaining == 0 {
            self.status = Status::Waiting;
            return Some(Action::Lock);
        }
        *remaining -= 1;

        let bets: Vec<BetId> = table.ledger().bet_ids();
        let stack = table.engine().player();
        let roll = rng.gen_range(0..100);
        let action = match roll {
            0..=59 => None,
            60..=67 => Some(Action::Push {
                amount: self.pick_amount(rng),
            }),
            68..=77 => bets.choose(rng).map(|bet| Action::Extend {
                bet: *bet,
                amount: self.pick_amount(rng),
            }),
            78..=87 => bets.choose(rng).map(|bet| Action::Withdraw {
                bet: *bet,
                amount: rng.gen_range(1..=self.min_bet.max(1)),
            }),
            88..=93 => stack.chips().choose(rng).map(|chip| {
                let target = match rng.gen_range(0..3) {
                    0 => match bets.choose(rng) {
                        Some(bet) => DropTarget::Bet(*bet),
                        None => DropTarget::PushSlot,
                    },
                    1 => DropTarget::HouseStack,
                    _ => DropTarget::Area(self.pick_outcome(rng)),
                };
                Action::Drag {
                    chips: vec![*chip],
                    target,
                }
            }),
            _ => stack
                .chips()
                .iter()
                .filter(|chip| chip.value() > 1)
                .min()
                .map(|chip| Action::Break { chip: *chip }),
        };
        Some(action.unwrap_or_else(|| Action::Bet {
            outcome: self.pick_outcome(rng),
            amount: self.pick_amount(rng),
        }))
    }

    /// Applies `action`. Rejections by the table are counted and returned to the caller.
    pub fn apply<S: AuditSink>(
        &mut self,
        table: &mut Table<S>,
        action: Action,
    ) -> Result<(), WagerError> {
        let result = match &action {
            Action::Bet { outcome, amount } => table
                .place_bet(BetTarget::Area(outcome.clone()), PileId::Player, *amount)
                .map(|_| self.activity.placed += 1),
            Action::Push { amount } => table
                .place_bet(BetTarget::Push, PileId::Player, *amount)
                .map(|_| self.activity.placed += 1),
            Action::Extend { bet, amount } => table
                .extend_bet(*bet, *amount)
                .map(|_| self.activity.extended += 1),
            Action::Withdraw { bet, amount } => table
                .withdraw(*bet, *amount)
                .map(|_| self.activity.withdrawn += 1),
            Action::Drag { chips, target } => {
                let token = table.pickup(PileId::Player, chips);
                token
                    .and_then(|token| table.drop(token.id(), target.clone()))
                    .map(|outcome| match outcome {
                        DropOutcome::Broken(_) => self.activity.broken += 1,
                        DropOutcome::Placed(_) => self.activity.placed += 1,
                        _ => self.activity.dragged += 1,
                    })
            }
            Action::Break { chip } => table
                .break_chips(&[*chip])
                .map(|_| self.activity.broken += 1),
            Action::Lock => table.lock(),
        };
        match &result {
            Ok(()) => debug!(?action, "applied"),
            Err(err @ WagerError::InvalidPhase { .. }) => {
                self.activity.rejected += 1;
                warn!(?action, ?err, "out of phase");
            }
            Err(err) => {
                self.activity.rejected += 1;
                debug!(?action, ?err, "rejected");
            }
        }
        result
    }

    fn pick_outcome<R: Rng>(&self, rng: &mut R) -> String {
        self.outcomes.choose(rng).cloned().unwrap_or_default()
    }

    fn pick_amount<R: Rng>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.min_bet..=self.max_bet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use felt_execution::{registry::GameRegistry, MemorySink, TableConfig};
    use felt_types::GameType;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn table() -> Table<MemorySink> {
        let policy = GameRegistry::new().policy_for(GameType::Baccarat).unwrap();
        let mut table =
            Table::new(TableConfig::new(GameType::Baccarat, policy), MemorySink::new()).unwrap();
        table.cash_in(1_000).unwrap();
        table
    }

    fn bot(bets: usize) -> Bot {
        Bot::new(
            vec!["Player".to_string(), "Banker".to_string(), "Tie".to_string()],
            5,
            50,
            bets,
        )
    }

    #[test]
    fn test_idle_bot_does_nothing() {
        let table = table();
        let mut bot = bot(3);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert_eq!(bot.next_action(&table, &mut rng), None);
    }

    #[test]
    fn test_round_ends_with_lock() {
        let mut table = table();
        let mut bot = bot(4);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        bot.start_round();
        let mut actions = Vec::new();
        while let Some(action) = bot.next_action(&table, &mut rng) {
            actions.push(action.clone());
            let _ = bot.apply(&mut table, action);
            assert!(table.is_conserved());
        }
        assert_eq!(actions.len(), 5);
        assert_eq!(actions.last(), Some(&Action::Lock));
        assert_eq!(bot.status(), Status::Waiting);
        assert!(!table.phase().accepts_bets());
    }

    #[test]
    fn test_rejections_are_counted() {
        let mut table = table();
        let mut bot = bot(1);
        let err = bot
            .apply(
                &mut table,
                Action::Bet {
                    outcome: "Dragon".to_string(),
                    amount: 10,
                },
            )
            .unwrap_err();
        assert_eq!(
            err,
            WagerError::UnknownOutcome {
                name: "Dragon".to_string()
            }
        );
        bot.apply(&mut table, Action::Break { chip: Chip::new(500) })
            .unwrap();
        let activity = bot.activity();
        assert_eq!(activity.rejected, 1);
        assert_eq!(activity.broken, 1);
        assert_eq!(table.snapshot().player_total, 1_000);
    }

    #[test]
    fn test_drag_onto_area_places_bet() {
        let mut table = table();
        let mut bot = bot(1);
        bot.apply(
            &mut table,
            Action::Drag {
                chips: vec![Chip::new(500)],
                target: DropTarget::Area("Banker".to_string()),
            },
        )
        .unwrap();
        assert_eq!(bot.activity().placed, 1);
        assert_eq!(table.ledger().total_value(), 500);
    }
}
