use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, Read, ReadExt, Write};
use std::fmt;

use super::{WagerError, DEFAULT_DENOMINATIONS, MAX_DECOMPOSITION_CHIPS, MAX_DENOMINATIONS};

/// A single chip. Chips of the same denomination are interchangeable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chip {
    denomination: u64,
}

impl Chip {
    pub const fn new(denomination: u64) -> Self {
        Self { denomination }
    }

    pub const fn value(&self) -> u64 {
        self.denomination
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.denomination)
    }
}

impl Write for Chip {
    fn write(&self, writer: &mut impl BufMut) {
        self.denomination.write(writer);
    }
}

impl Read for Chip {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let denomination = u64::read(reader)?;
        if denomination == 0 {
            return Err(Error::Invalid("Chip", "zero denomination"));
        }
        Ok(Self { denomination })
    }
}

impl FixedSize for Chip {
    const SIZE: usize = u64::SIZE;
}

/// Sum of chip values.
pub fn chips_to_cash(chips: &[Chip]) -> u64 {
    chips.iter().map(Chip::value).sum()
}

/// The fixed, ascending set of face values a table deals in.
///
/// Construction guarantees the set contains 1, so every non-negative amount has an exact
/// greedy decomposition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenominationTable {
    values: Vec<u64>,
}

impl Default for DenominationTable {
    fn default() -> Self {
        Self {
            values: DEFAULT_DENOMINATIONS.to_vec(),
        }
    }
}

impl DenominationTable {
    /// Builds a table from face values in any order.
    ///
    /// Fails with [WagerError::InvalidAmount] when the set is empty, oversized, contains a
    /// zero or a duplicate, or lacks the unit chip.
    pub fn new(values: &[u64]) -> Result<Self, WagerError> {
        if values.is_empty() || values.len() > MAX_DENOMINATIONS {
            return Err(WagerError::InvalidAmount {
                amount: values.len() as u64,
            });
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        if sorted[0] != 1 {
            return Err(WagerError::InvalidAmount { amount: sorted[0] });
        }
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(WagerError::InvalidAmount { amount: pair[0] });
        }
        Ok(Self { values: sorted })
    }

    /// Face values, ascending.
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn smallest(&self) -> u64 {
        self.values[0]
    }

    pub fn largest(&self) -> u64 {
        self.values[self.values.len() - 1]
    }

    pub fn contains(&self, value: u64) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    /// Greedy decomposition of `amount`, largest denomination first.
    ///
    /// Fails with [WagerError::InvalidAmount] when the result would exceed
    /// [MAX_DECOMPOSITION_CHIPS] chips.
    pub fn cash_to_chips(&self, amount: u64) -> Result<Vec<Chip>, WagerError> {
        self.decompose(amount, u64::MAX)?
            .ok_or(WagerError::InvalidAmount { amount })
    }

    pub fn chips_to_cash(&self, chips: &[Chip]) -> u64 {
        chips_to_cash(chips)
    }

    /// Re-expresses a chip's value in strictly smaller denominations.
    pub fn make_change(&self, value: u64) -> Result<Vec<Chip>, WagerError> {
        if !self.contains(value) {
            return Err(WagerError::InvalidAmount { amount: value });
        }
        if value == self.smallest() {
            return Err(WagerError::Unbreakable { value });
        }
        self.decompose(value, value)?
            .ok_or(WagerError::Unbreakable { value })
    }

    /// Breaks a chip so that `owed` can be paid exactly out of the change.
    ///
    /// The result is `cash_to_chips(owed)` followed by `cash_to_chips(value - owed)`; every
    /// piece is strictly smaller than `value`. With `owed == 0` this is [Self::make_change].
    pub fn make_change_for(&self, value: u64, owed: u64) -> Result<Vec<Chip>, WagerError> {
        if owed == 0 {
            return self.make_change(value);
        }
        if !self.contains(value) {
            return Err(WagerError::InvalidAmount { amount: value });
        }
        if value == self.smallest() {
            return Err(WagerError::Unbreakable { value });
        }
        if owed >= value {
            return Err(WagerError::InvalidAmount { amount: owed });
        }
        let mut change = self
            .decompose(owed, value)?
            .ok_or(WagerError::Unbreakable { value })?;
        change.extend(
            self.decompose(value - owed, value)?
                .ok_or(WagerError::Unbreakable { value })?,
        );
        Ok(change)
    }

    /// Greedy decomposition using only denominations strictly below `bound`. Returns `None`
    /// when `amount` is not expressible, and counts chips before allocating any.
    fn decompose(&self, amount: u64, bound: u64) -> Result<Option<Vec<Chip>>, WagerError> {
        let mut remaining = amount;
        let mut plan = Vec::new();
        let mut total: u64 = 0;
        for &denomination in self.values.iter().rev() {
            if denomination >= bound {
                continue;
            }
            let count = remaining / denomination;
            if count > 0 {
                plan.push((denomination, count));
                remaining -= count * denomination;
                total = total.saturating_add(count);
            }
        }
        if remaining != 0 {
            return Ok(None);
        }
        if total > MAX_DECOMPOSITION_CHIPS {
            return Err(WagerError::InvalidAmount { amount });
        }
        let mut chips = Vec::with_capacity(total as usize);
        for (denomination, count) in plan {
            chips.extend(std::iter::repeat(Chip::new(denomination)).take(count as usize));
        }
        Ok(Some(chips))
    }
}
