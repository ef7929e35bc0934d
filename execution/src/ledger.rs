//! Live wager bookkeeping.
//!
//! The ledger records which bets exist, who owns them and what they are on. It never moves
//! chips between piles itself; the transfer engine does that and tells the ledger.

use crate::pile::ChipPile;
use felt_types::{BetId, Chip, Missing, PileId, WagerError, TIE_BUCKET};
use std::collections::BTreeMap;

/// What a bet is riding on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BetTarget {
    /// A named betting area (outcome).
    Area(String),
    /// The push slot: returned in full whatever the result.
    Push,
}

impl BetTarget {
    /// Outcome label used in totals and settlement records.
    pub fn label(&self) -> &str {
        match self {
            BetTarget::Area(name) => name,
            BetTarget::Push => TIE_BUCKET,
        }
    }
}

impl From<&str> for BetTarget {
    fn from(name: &str) -> Self {
        BetTarget::Area(name.to_string())
    }
}

/// A chip pile staked on an outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bet {
    id: BetId,
    owner: PileId,
    target: BetTarget,
    round: u64,
    pub(crate) pile: ChipPile,
}

impl Bet {
    pub fn id(&self) -> BetId {
        self.id
    }

    /// Stack the bet's chips return to.
    pub fn owner(&self) -> PileId {
        self.owner
    }

    pub fn target(&self) -> &BetTarget {
        &self.target
    }

    /// Round the bet was placed in.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn value(&self) -> u64 {
        self.pile.total_value()
    }

    pub fn chips(&self) -> &[Chip] {
        self.pile.chips()
    }
}

/// A named region of the table that collects bets on one outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BettingArea {
    name: String,
    bets: Vec<BetId>,
}

impl BettingArea {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bets currently placed here, oldest first.
    pub fn bets(&self) -> &[BetId] {
        &self.bets
    }
}

#[derive(Clone, Debug, Default)]
pub struct WagerLedger {
    bets: BTreeMap<BetId, Bet>,
    areas: Vec<BettingArea>,
    push_slot: Vec<BetId>,
    next_bet: u64,
}

impl WagerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a betting area. Returns `false` if one with that name already exists.
    pub fn register_area(&mut self, name: &str) -> bool {
        if self.area(name).is_some() {
            return false;
        }
        self.areas.push(BettingArea {
            name: name.to_string(),
            bets: Vec::new(),
        });
        true
    }

    pub fn area(&self, name: &str) -> Option<&BettingArea> {
        self.areas.iter().find(|area| area.name == name)
    }

    /// Areas in registration order.
    pub fn areas(&self) -> &[BettingArea] {
        &self.areas
    }

    /// Bets in the push slot, oldest first.
    pub fn push_slot(&self) -> &[BetId] {
        &self.push_slot
    }

    /// Records a new bet holding `chips`. The chips must already have left their source.
    pub fn place_bet(
        &mut self,
        target: BetTarget,
        owner: PileId,
        chips: Vec<Chip>,
        round: u64,
    ) -> Result<BetId, WagerError> {
        if chips.is_empty() {
            return Err(WagerError::EmptyBet);
        }
        self.check_target(&target)?;
        let id = BetId(self.next_bet);
        self.next_bet += 1;
        match &target {
            BetTarget::Area(name) => {
                if let Some(area) = self.areas.iter_mut().find(|area| &area.name == name) {
                    area.bets.push(id);
                }
            }
            BetTarget::Push => self.push_slot.push(id),
        }
        self.bets.insert(
            id,
            Bet {
                id,
                owner,
                target,
                round,
                pile: ChipPile::from_chips(chips),
            },
        );
        Ok(id)
    }

    /// Fails with `NotFound` if an area target is not registered.
    pub fn check_target(&self, target: &BetTarget) -> Result<(), WagerError> {
        match target {
            BetTarget::Area(name) if self.area(name).is_none() => {
                Err(WagerError::NotFound(Missing::Area(name.clone())))
            }
            _ => Ok(()),
        }
    }

    /// Stacks more chips onto a live bet.
    pub fn extend_bet(&mut self, id: BetId, chips: Vec<Chip>) -> Result<(), WagerError> {
        if chips.is_empty() {
            return Err(WagerError::EmptyBet);
        }
        let bet = self
            .bets
            .get_mut(&id)
            .ok_or(WagerError::NotFound(Missing::Bet(id)))?;
        bet.pile.add_many(chips);
        Ok(())
    }

    pub fn bet(&self, id: BetId) -> Option<&Bet> {
        self.bets.get(&id)
    }

    pub(crate) fn bet_mut(&mut self, id: BetId) -> Result<&mut Bet, WagerError> {
        self.bets
            .get_mut(&id)
            .ok_or(WagerError::NotFound(Missing::Bet(id)))
    }

    /// Live bets in placement order.
    pub fn bets(&self) -> impl Iterator<Item = &Bet> {
        self.bets.values()
    }

    pub fn bet_ids(&self) -> Vec<BetId> {
        self.bets.keys().copied().collect()
    }

    pub fn bets_for_owner(&self, owner: PileId) -> Vec<BetId> {
        self.bets
            .values()
            .filter(|bet| bet.owner == owner)
            .map(|bet| bet.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Value staked across all live bets.
    pub fn total_value(&self) -> u64 {
        self.bets.values().map(Bet::value).sum()
    }

    /// Value staked per outcome. Push-slot bets are reported under the tie bucket and empty
    /// bets are skipped.
    pub fn totals_by_outcome(&self) -> BTreeMap<String, u64> {
        let mut totals = BTreeMap::new();
        for bet in self.bets.values() {
            let value = bet.value();
            if value == 0 {
                continue;
            }
            *totals.entry(bet.target.label().to_string()).or_insert(0) += value;
        }
        totals
    }

    /// Forgets a bet. Returns `None` if it was already removed.
    pub fn remove(&mut self, id: BetId) -> Option<Bet> {
        let bet = self.bets.remove(&id)?;
        match &bet.target {
            BetTarget::Area(name) => {
                if let Some(area) = self.areas.iter_mut().find(|area| &area.name == name) {
                    area.bets.retain(|held| *held != id);
                }
            }
            BetTarget::Push => self.push_slot.retain(|held| *held != id),
        }
        Some(bet)
    }

    /// Clears area and push-slot membership for a new round. Areas themselves persist, as do
    /// bets still awaiting administrative resolution.
    pub fn reset_areas(&mut self) {
        for area in &mut self.areas {
            area.bets.clear();
        }
        self.push_slot.clear();
    }
}
