//! Configuration options for registry layout resolution.
//!
//! These options decide how permissive the order resolver is when an
//! explicit order leaves names out, and when interleaved groups have
//! different slot counts.

use serde::{Deserialize, Serialize};

/// What to do with children that an explicit order spec does not mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderPolicy {
    /// Append omitted names after the ordered ones, in insertion order
    AppendOmitted,

    /// Fail the freeze with `IncompleteOrder` if any name is omitted
    RequireComplete,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        OrderPolicy::AppendOmitted
    }
}

/// Slot-count rule for interleaved groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterleavePolicy {
    /// Counts must be non-increasing along the tuple and the last one may be
    /// at most one short of the first, so only the final round is partial
    AllowRagged,

    /// Every interleaved child must have exactly the same number of slots
    RequireEqual,
}

impl Default for InterleavePolicy {
    fn default() -> Self {
        InterleavePolicy::AllowRagged
    }
}

impl InterleavePolicy {
    /// Check whether slot counts (in tuple order) can be interleaved.
    pub fn accepts(&self, counts: &[usize]) -> bool {
        let Some(&first) = counts.first() else {
            return true;
        };
        match self {
            InterleavePolicy::RequireEqual => counts.iter().all(|&c| c == first),
            InterleavePolicy::AllowRagged => {
                counts.windows(2).all(|w| w[0] >= w[1])
                    && counts.iter().all(|&c| c + 1 >= first)
            }
        }
    }
}

/// Configuration options for a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Handling of names omitted from an explicit order. Default: AppendOmitted
    pub order_policy: OrderPolicy,

    /// Slot-count rule for interleaving. Default: AllowRagged
    pub interleave_policy: InterleavePolicy,
}

impl RegistryConfig {
    /// Configuration that rejects incomplete orders and ragged interleaves.
    pub fn strict() -> Self {
        Self {
            order_policy: OrderPolicy::RequireComplete,
            interleave_policy: InterleavePolicy::RequireEqual,
        }
    }
}
