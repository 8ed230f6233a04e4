//! Formula-based pricing tiers for amounts above the bracket table

use serde::{Deserialize, Serialize};

/// One pricing segment: `base_premium + (amount - floor) * marginal_rate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Amount at which this tier's base premium is owed
    pub floor: f64,

    /// Inclusive upper bound of applicability; `f64::INFINITY` for the last tier.
    /// Serialized as `null` when unbounded.
    #[serde(with = "ceiling_serde")]
    pub ceiling: f64,

    /// Flat premium owed at `floor`
    pub base_premium: f64,

    /// Fraction of the excess over `floor` added to the base premium
    pub marginal_rate: f64,
}

impl Tier {
    pub fn new(floor: f64, ceiling: f64, base_premium: f64, marginal_rate: f64) -> Self {
        Self {
            floor,
            ceiling,
            base_premium,
            marginal_rate,
        }
    }

    pub fn covers(&self, amount: f64) -> bool {
        amount <= self.ceiling
    }

    /// Only `+inf` counts as unbounded
    pub fn is_unbounded(&self) -> bool {
        self.ceiling == f64::INFINITY
    }

    /// Unrounded premium for `amount`. No intermediate rounding of the
    /// excess or the product.
    pub fn premium(&self, amount: f64) -> f64 {
        let excess = amount - self.floor;
        self.base_premium + excess * self.marginal_rate
    }
}

/// Ordered tiers, ascending by floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierList {
    tiers: Vec<Tier>,
}

impl TierList {
    pub fn from_tiers(tiers: &[Tier]) -> Self {
        Self {
            tiers: tiers.to_vec(),
        }
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// First tier whose ceiling is at or above `amount`, with its index
    pub fn select(&self, amount: f64) -> Option<(usize, &Tier)> {
        self.tiers
            .iter()
            .enumerate()
            .find(|(_, tier)| tier.covers(amount))
    }
}

mod ceiling_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ceiling: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if *ceiling == f64::INFINITY {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(ceiling)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
