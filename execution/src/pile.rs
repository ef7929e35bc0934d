//! Chip piles: the player stack, the house stack and every wager pile.
//!
//! A pile is an ordered multiset of chips. The last chip is the top of the pile; removals of a
//! given denomination take the top-most matching chip.

use felt_types::{chips_to_cash, Chip, DenominationTable, Missing, WagerError};
use std::collections::BTreeMap;

/// Upper bound on subset-search steps before a selection is declared impossible.
const MAX_SEARCH_STEPS: usize = 100_000;

/// An ordered collection of chips with a cached total value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChipPile {
    chips: Vec<Chip>,
    total_value: u64,
}

impl ChipPile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chips(chips: Vec<Chip>) -> Self {
        let total_value = chips_to_cash(&chips);
        Self { chips, total_value }
    }

    /// Chips bottom to top.
    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn total_value(&self) -> u64 {
        self.total_value
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Number of chips of the given denomination.
    pub fn count(&self, denomination: u64) -> usize {
        self.chips
            .iter()
            .filter(|chip| chip.value() == denomination)
            .count()
    }

    /// Whether every chip in `chips` (counted with multiplicity) is present.
    pub fn contains_all(&self, chips: &[Chip]) -> bool {
        let mut have = self.histogram();
        for chip in chips {
            match have.get_mut(&chip.value()) {
                Some(count) if *count > 0 => *count -= 1,
                _ => return false,
            }
        }
        true
    }

    pub fn add(&mut self, chip: Chip) {
        // Bounded by the engine's cash-in guard on cash_in_total + house_float.
        self.total_value += chip.value();
        self.chips.push(chip);
    }

    pub fn add_many(&mut self, chips: impl IntoIterator<Item = Chip>) {
        for chip in chips {
            self.add(chip);
        }
    }

    /// Removes the top-most chip of the same denomination.
    pub fn remove(&mut self, chip: Chip) -> Result<Chip, WagerError> {
        let index = self
            .chips
            .iter()
            .rposition(|held| *held == chip)
            .ok_or(WagerError::NotFound(Missing::Chip(chip.value())))?;
        let removed = self.chips.remove(index);
        self.total_value -= removed.value();
        Ok(removed)
    }

    /// Removes every chip in `chips`, or nothing if any is missing.
    pub fn remove_many(&mut self, chips: &[Chip]) -> Result<Vec<Chip>, WagerError> {
        let mut have = self.histogram();
        for chip in chips {
            match have.get_mut(&chip.value()) {
                Some(count) if *count > 0 => *count -= 1,
                _ => return Err(WagerError::NotFound(Missing::Chip(chip.value()))),
            }
        }
        let mut removed = Vec::with_capacity(chips.len());
        for chip in chips {
            removed.push(self.remove(*chip)?);
        }
        Ok(removed)
    }

    /// Removes and returns every chip.
    pub fn empty(&mut self) -> Vec<Chip> {
        self.total_value = 0;
        std::mem::take(&mut self.chips)
    }

    /// Removes chips summing exactly to `amount`, breaking at most one chip in place.
    ///
    /// Selection prefers large chips. When no exact subset exists, the smallest chip larger
    /// than the greedy shortfall is replaced by its change (owed part first) and selection is
    /// retried once. On failure the pile is left unchanged.
    pub fn withdraw_value(
        &mut self,
        amount: u64,
        denominations: &DenominationTable,
    ) -> Result<Vec<Chip>, WagerError> {
        if amount == 0 {
            return Ok(Vec::new());
        }
        if self.total_value < amount {
            return Err(WagerError::InsufficientFunds {
                available: self.total_value,
                requested: amount,
            });
        }
        if let Some(selection) = self.select_exact(amount) {
            return self.take_selection(&selection);
        }

        let (shortfall, breakable) = self.greedy_shortfall(amount);
        let Some(breakable) = breakable else {
            return Err(WagerError::Unrepresentable { amount });
        };
        let change = match denominations.make_change_for(breakable, shortfall) {
            Ok(change) => change,
            Err(_) => return Err(WagerError::Unrepresentable { amount }),
        };
        let snapshot = self.clone();
        self.remove(Chip::new(breakable))?;
        self.add_many(change);
        let taken = match self.select_exact(amount) {
            Some(selection) => self.take_selection(&selection),
            None => Err(WagerError::Unrepresentable { amount }),
        };
        if taken.is_err() {
            *self = snapshot;
        }
        taken
    }

    fn histogram(&self) -> BTreeMap<u64, usize> {
        let mut counts = BTreeMap::new();
        for chip in &self.chips {
            *counts.entry(chip.value()).or_insert(0) += 1;
        }
        counts
    }

    /// Finds per-denomination counts summing to `amount`, largest denominations first.
    fn select_exact(&self, amount: u64) -> Option<BTreeMap<u64, usize>> {
        let groups: Vec<(u64, usize)> = self.histogram().into_iter().rev().collect();
        let mut suffix = vec![0u64; groups.len() + 1];
        for index in (0..groups.len()).rev() {
            let (value, count) = groups[index];
            suffix[index] = suffix[index + 1] + value * count as u64;
        }
        let mut picks = vec![0usize; groups.len()];
        let mut steps = 0usize;
        if !search(&groups, &suffix, 0, amount, &mut picks, &mut steps) {
            return None;
        }
        Some(
            groups
                .iter()
                .zip(picks)
                .filter(|(_, take)| *take > 0)
                .map(|((value, _), take)| (*value, take))
                .collect(),
        )
    }

    /// Walks the pile largest-first taking what fits. Returns the amount still owed and the
    /// smallest untaken chip, which always exceeds that amount.
    fn greedy_shortfall(&self, amount: u64) -> (u64, Option<u64>) {
        let mut values: Vec<u64> = self.chips.iter().map(Chip::value).collect();
        values.sort_unstable_by(|a, b| b.cmp(a));
        let mut remaining = amount;
        let mut smallest_untaken = None;
        for value in values {
            if value <= remaining {
                remaining -= value;
            } else {
                smallest_untaken = Some(value);
            }
        }
        (remaining, smallest_untaken)
    }

    fn take_selection(
        &mut self,
        selection: &BTreeMap<u64, usize>,
    ) -> Result<Vec<Chip>, WagerError> {
        let chips: Vec<Chip> = selection
            .iter()
            .rev()
            .flat_map(|(&value, &count)| std::iter::repeat(Chip::new(value)).take(count))
            .collect();
        self.remove_many(&chips)
    }
}

fn search(
    groups: &[(u64, usize)],
    suffix: &[u64],
    index: usize,
    remaining: u64,
    picks: &mut [usize],
    steps: &mut usize,
) -> bool {
    if remaining == 0 {
        return true;
    }
    *steps += 1;
    if index == groups.len() || suffix[index] < remaining || *steps > MAX_SEARCH_STEPS {
        return false;
    }
    let (value, count) = groups[index];
    let most = count.min((remaining / value) as usize);
    for take in (0..=most).rev() {
        picks[index] = take;
        if search(
            groups,
            suffix,
            index + 1,
            remaining - value * take as u64,
            picks,
            steps,
        ) {
            return true;
        }
    }
    picks[index] = 0;
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pile(values: &[u64]) -> ChipPile {
        ChipPile::from_chips(values.iter().map(|&value| Chip::new(value)).collect())
    }

    fn values(chips: &[Chip]) -> Vec<u64> {
        chips.iter().map(Chip::value).collect()
    }

    #[test]
    fn test_add_and_remove_track_total() {
        let mut stack = pile(&[25, 5]);
        stack.add(Chip::new(100));
        assert_eq!(stack.total_value(), 130);
        assert_eq!(stack.remove(Chip::new(5)).unwrap(), Chip::new(5));
        assert_eq!(stack.total_value(), 125);
        assert_eq!(
            stack.remove(Chip::new(5)),
            Err(WagerError::NotFound(Missing::Chip(5)))
        );
    }

    #[test]
    fn test_remove_many_is_all_or_nothing() {
        let mut stack = pile(&[25, 5, 1]);
        let err = stack
            .remove_many(&[Chip::new(25), Chip::new(25)])
            .unwrap_err();
        assert_eq!(err, WagerError::NotFound(Missing::Chip(25)));
        assert_eq!(stack.total_value(), 31);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_withdraw_insufficient_funds() {
        let table = DenominationTable::default();
        let mut stack = pile(&[25, 5, 5, 5]);
        assert_eq!(
            stack.withdraw_value(50, &table),
            Err(WagerError::InsufficientFunds {
                available: 40,
                requested: 50
            })
        );
        assert_eq!(stack.total_value(), 40);
    }

    #[test]
    fn test_withdraw_exact_prefers_large_chips() {
        let table = DenominationTable::default();
        let mut stack = pile(&[5, 5, 5, 5, 5, 25, 100]);
        let taken = stack.withdraw_value(30, &table).unwrap();
        assert_eq!(values(&taken), vec![25, 5]);
        assert_eq!(stack.total_value(), 120);
    }

    #[test]
    fn test_withdraw_finds_non_greedy_subset() {
        let table = DenominationTable::new(&[1, 3, 4]).unwrap();
        let mut stack = pile(&[4, 3, 3]);
        let taken = stack.withdraw_value(6, &table).unwrap();
        assert_eq!(values(&taken), vec![3, 3]);
        assert_eq!(stack.total_value(), 4);
    }

    #[test]
    fn test_withdraw_breaks_one_chip() {
        let table = DenominationTable::default();
        let mut stack = pile(&[25, 25]);
        let taken = stack.withdraw_value(28, &table).unwrap();
        assert_eq!(chips_to_cash(&taken), 28);
        assert_eq!(stack.total_value(), 22);
        assert!(stack.chips().iter().all(|chip| chip.value() < 25));
    }

    #[test]
    fn test_take_selection_reports_missing_chips() {
        let mut stack = pile(&[25, 5]);
        let selection = BTreeMap::from([(25, 1), (5, 2)]);
        assert_eq!(
            stack.take_selection(&selection),
            Err(WagerError::NotFound(Missing::Chip(5)))
        );
        assert_eq!(stack.total_value(), 30);
        assert_eq!(stack.len(), 2);

        let selection = BTreeMap::from([(25, 1)]);
        assert_eq!(values(&stack.take_selection(&selection).unwrap()), vec![25]);
        assert_eq!(stack.total_value(), 5);
    }

    #[test]
    fn test_withdraw_zero_is_noop() {
        let table = DenominationTable::default();
        let mut stack = pile(&[5]);
        assert!(stack.withdraw_value(0, &table).unwrap().is_empty());
        assert_eq!(stack.total_value(), 5);
    }

    #[test]
    fn test_empty_drains_pile() {
        let mut stack = pile(&[100, 1]);
        assert_eq!(values(&stack.empty()), vec![100, 1]);
        assert!(stack.is_empty());
        assert_eq!(stack.total_value(), 0);
    }

    #[test]
    fn test_contains_all_counts_multiplicity() {
        let stack = pile(&[5, 5, 25]);
        assert!(stack.contains_all(&[Chip::new(5), Chip::new(5)]));
        assert!(!stack.contains_all(&[Chip::new(5), Chip::new(5), Chip::new(5)]));
    }

    proptest! {
        #[test]
        fn withdraw_conserves_value(
            seed in proptest::collection::vec(0usize..5, 1..40),
            amount in 1u64..3_000,
        ) {
            let table = DenominationTable::default();
            let mut stack = pile(&seed.iter().map(|&i| table.values()[i]).collect::<Vec<_>>());
            let before = stack.total_value();
            match stack.withdraw_value(amount, &table) {
                Ok(taken) => {
                    prop_assert_eq!(chips_to_cash(&taken), amount);
                    prop_assert_eq!(stack.total_value(), before - amount);
                }
                Err(WagerError::InsufficientFunds { .. }) => {
                    prop_assert!(before < amount);
                    prop_assert_eq!(stack.total_value(), before);
                }
                Err(err) => prop_assert!(false, "unexpected error {err}"),
            }
        }
    }
}
