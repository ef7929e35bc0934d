use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::{PolicyError, MAX_OUTCOMES, MAX_OUTCOME_NAME_LENGTH};

/// Largest number of fractional digits accepted in a decimal ratio ("0.95").
const MAX_DECIMAL_PLACES: u32 = 9;

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Exact non-negative fraction, always stored in lowest terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fraction {
    numerator: u128,
    denominator: u128,
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Fraction {
    pub const ZERO: Fraction = Fraction {
        numerator: 0,
        denominator: 1,
    };

    pub fn new(numerator: u128, denominator: u128) -> Self {
        debug_assert!(denominator != 0, "fraction denominator must be non-zero");
        let denominator = denominator.max(1);
        let divisor = gcd(numerator, denominator).max(1);
        Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        }
    }

    pub fn numerator(&self) -> u128 {
        self.numerator
    }

    pub fn denominator(&self) -> u128 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    /// Whole units contained in the fraction (rounded down).
    pub fn whole(&self) -> u128 {
        self.numerator / self.denominator
    }

    pub fn checked_add(self, other: Fraction) -> Option<Fraction> {
        let divisor = gcd(self.denominator, other.denominator);
        let lcm = (self.denominator / divisor).checked_mul(other.denominator)?;
        let left = self.numerator.checked_mul(lcm / self.denominator)?;
        let right = other.numerator.checked_mul(lcm / other.denominator)?;
        Some(Fraction::new(left.checked_add(right)?, lcm))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// Winnings owed on a wager, split into the chip-payable part and the remainder the house
/// keeps by rounding down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Winnings {
    pub amount: u64,
    pub remainder: Fraction,
}

/// "X to 1" payout ratio as an exact rational (winnings only, stake excluded).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RatioRepr", into = "String")]
pub struct PayoutRatio {
    numerator: u64,
    denominator: u64,
}

impl PayoutRatio {
    /// Even money.
    pub const EVEN: PayoutRatio = PayoutRatio {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Self, PolicyError> {
        if denominator == 0 {
            return Err(PolicyError::InvalidRatio {
                value: format!("{numerator}/{denominator}"),
                reason: "zero denominator",
            });
        }
        let divisor = gcd(numerator as u128, denominator as u128).max(1) as u64;
        Ok(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    /// Whole-number ratio ("8 to 1").
    pub const fn to_one(multiple: u64) -> Self {
        Self {
            numerator: multiple,
            denominator: 1,
        }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Winnings for `wager`, rounded down to a whole chip value.
    pub fn winnings(&self, wager: u64) -> Winnings {
        let product = wager as u128 * self.numerator as u128;
        let denominator = self.denominator as u128;
        let whole = product / denominator;
        Winnings {
            amount: u64::try_from(whole).unwrap_or(u64::MAX),
            remainder: Fraction::new(product % denominator, denominator),
        }
    }
}

impl fmt::Display for PayoutRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl From<PayoutRatio> for String {
    fn from(ratio: PayoutRatio) -> Self {
        ratio.to_string()
    }
}

fn parse_u64(value: &str, original: &str) -> Result<u64, PolicyError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PolicyError::InvalidRatio {
            value: original.to_string(),
            reason: "expected a non-negative number",
        });
    }
    value.parse::<u64>().map_err(|_| PolicyError::InvalidRatio {
        value: original.to_string(),
        reason: "number too large",
    })
}

impl FromStr for PayoutRatio {
    type Err = PolicyError;

    /// Accepts "8", "0.95", "19/20" and "8:1".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some((left, right)) = trimmed.split_once(['/', ':']) {
            let numerator = parse_u64(left.trim(), s)?;
            let denominator = parse_u64(right.trim(), s)?;
            return PayoutRatio::new(numerator, denominator);
        }
        if let Some((whole, fraction)) = trimmed.split_once('.') {
            let places = fraction.len() as u32;
            if places > MAX_DECIMAL_PLACES {
                return Err(PolicyError::InvalidRatio {
                    value: s.to_string(),
                    reason: "too many decimal places",
                });
            }
            let whole = if whole.is_empty() { 0 } else { parse_u64(whole, s)? };
            let fraction = if fraction.is_empty() { 0 } else { parse_u64(fraction, s)? };
            let scale = 10u64.pow(places);
            let numerator = whole
                .checked_mul(scale)
                .and_then(|scaled| scaled.checked_add(fraction))
                .ok_or_else(|| PolicyError::InvalidRatio {
                    value: s.to_string(),
                    reason: "number too large",
                })?;
            return PayoutRatio::new(numerator, scale);
        }
        Ok(PayoutRatio::to_one(parse_u64(trimmed, s)?))
    }
}

/// Shapes a ratio may take in a config file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RatioRepr {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl TryFrom<RatioRepr> for PayoutRatio {
    type Error = PolicyError;

    fn try_from(repr: RatioRepr) -> Result<Self, Self::Error> {
        match repr {
            RatioRepr::Integer(value) => Ok(PayoutRatio::to_one(value)),
            RatioRepr::Float(value) => {
                if !value.is_finite() || value < 0.0 {
                    return Err(PolicyError::InvalidRatio {
                        value: value.to_string(),
                        reason: "expected a finite non-negative number",
                    });
                }
                value.to_string().parse()
            }
            RatioRepr::Text(text) => text.parse(),
        }
    }
}

/// Pay table and outcome set a game variant hands to the engine at round start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePolicy {
    pub allowed_outcomes: Vec<String>,
    pub payout_ratios: BTreeMap<String, PayoutRatio>,
    /// Outcome that, when it comes up, returns wagers on every losing outcome instead of
    /// forfeiting them.
    #[serde(default)]
    pub push_outcome: Option<String>,
}

impl GamePolicy {
    /// Builds and validates a policy from `(outcome, ratio)` pairs in display order.
    pub fn new(
        outcomes: &[(&str, PayoutRatio)],
        push_outcome: Option<&str>,
    ) -> Result<Self, PolicyError> {
        let policy = Self {
            allowed_outcomes: outcomes.iter().map(|(name, _)| name.to_string()).collect(),
            payout_ratios: outcomes
                .iter()
                .map(|(name, ratio)| (name.to_string(), *ratio))
                .collect(),
            push_outcome: push_outcome.map(str::to_string),
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.allowed_outcomes.is_empty() {
            return Err(PolicyError::NoOutcomes);
        }
        if self.allowed_outcomes.len() > MAX_OUTCOMES {
            return Err(PolicyError::TooManyOutcomes {
                count: self.allowed_outcomes.len(),
                max: MAX_OUTCOMES,
            });
        }
        let mut seen = BTreeSet::new();
        for name in &self.allowed_outcomes {
            if name.is_empty() || name.len() > MAX_OUTCOME_NAME_LENGTH {
                return Err(PolicyError::InvalidOutcomeName {
                    name: name.clone(),
                    max: MAX_OUTCOME_NAME_LENGTH,
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(PolicyError::DuplicateOutcome { name: name.clone() });
            }
            if !self.payout_ratios.contains_key(name) {
                return Err(PolicyError::MissingRatio { name: name.clone() });
            }
        }
        if let Some(name) = self.payout_ratios.keys().find(|name| !seen.contains(name.as_str())) {
            return Err(PolicyError::UndeclaredRatio { name: name.clone() });
        }
        if let Some(push) = &self.push_outcome {
            if !seen.contains(push.as_str()) {
                return Err(PolicyError::UndeclaredPush { name: push.clone() });
            }
        }
        Ok(())
    }

    pub fn allows(&self, outcome: &str) -> bool {
        self.allowed_outcomes.iter().any(|name| name == outcome)
    }

    pub fn ratio(&self, outcome: &str) -> Option<PayoutRatio> {
        self.payout_ratios.get(outcome).copied()
    }

    pub fn is_push(&self, outcome: &str) -> bool {
        self.push_outcome.as_deref() == Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_parsing() {
        assert_eq!("8".parse::<PayoutRatio>().unwrap(), PayoutRatio::to_one(8));
        assert_eq!(
            "0.95".parse::<PayoutRatio>().unwrap(),
            PayoutRatio::new(19, 20).unwrap()
        );
        assert_eq!(
            "19/20".parse::<PayoutRatio>().unwrap(),
            PayoutRatio::new(19, 20).unwrap()
        );
        assert_eq!("8:1".parse::<PayoutRatio>().unwrap(), PayoutRatio::to_one(8));
        assert_eq!("8.0".parse::<PayoutRatio>().unwrap(), PayoutRatio::to_one(8));
        assert!("-1".parse::<PayoutRatio>().is_err());
        assert!("1/0".parse::<PayoutRatio>().is_err());
        assert!("abc".parse::<PayoutRatio>().is_err());
    }

    #[test]
    fn test_winnings_round_down() {
        let banker = PayoutRatio::new(19, 20).unwrap();
        let exact = banker.winnings(100);
        assert_eq!(exact.amount, 95);
        assert!(exact.remainder.is_zero());

        let rounded = banker.winnings(55);
        assert_eq!(rounded.amount, 52);
        assert_eq!(rounded.remainder, Fraction::new(1, 4));
    }

    #[test]
    fn test_fraction_accumulates() {
        let sum = Fraction::new(1, 4)
            .checked_add(Fraction::new(3, 4))
            .unwrap()
            .checked_add(Fraction::new(1, 3))
            .unwrap();
        assert_eq!(sum, Fraction::new(4, 3));
        assert_eq!(sum.whole(), 1);
        assert_eq!(sum.to_string(), "4/3");
    }

    #[test]
    fn test_policy_validation() {
        let policy = GamePolicy::new(
            &[
                ("Player", PayoutRatio::EVEN),
                ("Banker", PayoutRatio::new(19, 20).unwrap()),
                ("Tie", PayoutRatio::to_one(8)),
            ],
            Some("Tie"),
        )
        .unwrap();
        assert!(policy.allows("Banker"));
        assert!(!policy.allows("Dragon"));
        assert!(policy.is_push("Tie"));
        assert_eq!(policy.ratio("Tie"), Some(PayoutRatio::to_one(8)));

        assert_eq!(
            GamePolicy::new(&[], None),
            Err(PolicyError::NoOutcomes)
        );
        assert_eq!(
            GamePolicy::new(&[("A", PayoutRatio::EVEN), ("A", PayoutRatio::EVEN)], None),
            Err(PolicyError::DuplicateOutcome {
                name: "A".to_string()
            })
        );
        assert_eq!(
            GamePolicy::new(&[("A", PayoutRatio::EVEN)], Some("B")),
            Err(PolicyError::UndeclaredPush {
                name: "B".to_string()
            })
        );
    }

    #[test]
    fn test_policy_rejects_stray_ratio() {
        let mut policy = GamePolicy::new(&[("Red", PayoutRatio::EVEN)], None).unwrap();
        policy
            .payout_ratios
            .insert("Black".to_string(), PayoutRatio::EVEN);
        assert_eq!(
            policy.validate(),
            Err(PolicyError::UndeclaredRatio {
                name: "Black".to_string()
            })
        );
    }

    #[test]
    fn test_policy_from_yaml() {
        let yaml = r#"
allowed_outcomes: [Player, Banker, Tie]
payout_ratios:
  Player: 1
  Banker: 0.95
  Tie: "8:1"
push_outcome: Tie
"#;
        let policy: GamePolicy = serde_yaml::from_str(yaml).unwrap();
        policy.validate().unwrap();
        assert_eq!(policy.ratio("Banker"), Some(PayoutRatio::new(19, 20).unwrap()));
        assert_eq!(policy.ratio("Tie"), Some(PayoutRatio::to_one(8)));
        assert_eq!(policy.push_outcome.as_deref(), Some("Tie"));
    }
}
