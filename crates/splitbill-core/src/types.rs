//! # Domain Types
//!
//! Core domain types for the bill-splitting engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Participant    │   │    BillItem     │   │   BillConfig    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  tax_rate       │       │
//! │  │  name           │   │  unit_price     │   │  tip_rate       │       │
//! │  │  joined_at      │   │  quantity       │   │  split_mode     │       │
//! │  └─────────────────┘   │  assigned {ids} │   └─────────────────┘       │
//! │                        └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────────┐     │
//! │  │     Rate        │   │          AllocationResult               │     │
//! │  │  ─────────────  │   │  ─────────────────────────────────────  │     │
//! │  │  percent (f64)  │   │  shares: id → ParticipantShare          │     │
//! │  │  10.0 = 10%     │   │  totals: subtotal/tax/tip/grand_total   │     │
//! │  └─────────────────┘   └─────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Numeric Semantics
//! All money is `f64` and the engine never rounds. Rounding to minor
//! currency units is strictly a presentation concern, so the conservation
//! invariant (Σ shares == grand total) holds losslessly before formatting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use ts_rs::TS;

use crate::RECONCILE_EPSILON;

// =============================================================================
// Rate
// =============================================================================

/// A tax or tip rate expressed as a percentage.
///
/// ## Why f64 Percent?
/// Raw UI input arrives as a percentage ("10" = 10%). The constructor is
/// also the sanitization boundary: non-finite or negative input is coerced
/// to zero before the engine ever sees it, so downstream math never meets
/// NaN or a negative rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(f64);

impl Rate {
    /// Creates a rate from a percentage, coercing invalid input to zero.
    pub fn from_percent(pct: f64) -> Self {
        if pct.is_finite() && pct > 0.0 {
            Rate(pct)
        } else {
            Rate(0.0)
        }
    }

    /// Returns the rate as a percentage (10.0 = 10%).
    #[inline]
    pub const fn percent(&self) -> f64 {
        self.0
    }

    /// Returns the rate as a fraction (10% → 0.1), for multiplication.
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0.0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Split Mode
// =============================================================================

/// How the bill is divided across participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Everyone pays the same amount (grand total / participant count).
    Equal,
    /// Each participant pays for the items assigned to them, plus a
    /// proportional share of tax and tip.
    Itemized,
}

impl Default for SplitMode {
    fn default() -> Self {
        SplitMode::Equal
    }
}

// =============================================================================
// Participant
// =============================================================================

/// A person splitting the bill.
///
/// Ids are unique; names may repeat (two "Sam"s at one table is fine).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the share breakdown.
    pub name: String,

    /// When the participant was added.
    #[ts(as = "String")]
    pub joined_at: DateTime<Utc>,
}

// =============================================================================
// Bill Item
// =============================================================================

/// A billed line item.
///
/// ## Invariant
/// `assigned` is never empty. Any operation that would empty it resets it
/// to all current participants instead (the fallback rule). An item with
/// nobody assigned is undefined for allocation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the ledger.
    pub name: String,

    /// Price per unit. Never rounded here; formatting is the UI's job.
    pub unit_price: f64,

    /// Units of this item on the bill (≥ 1).
    pub quantity: i64,

    /// Ids of the participants who share this item.
    pub assigned: BTreeSet<String>,

    /// When the item was added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl BillItem {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }

    /// Number of participants sharing this item.
    #[inline]
    pub fn assignee_count(&self) -> usize {
        self.assigned.len()
    }

    /// Checks whether a participant shares this item.
    #[inline]
    pub fn is_assigned(&self, participant_id: &str) -> bool {
        self.assigned.contains(participant_id)
    }
}

// =============================================================================
// Bill Configuration
// =============================================================================

/// Per-bill settings: rates and split mode.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillConfig {
    /// Tax rate applied to the subtotal.
    pub tax_rate: Rate,

    /// Tip rate applied to the subtotal.
    pub tip_rate: Rate,

    /// How the bill is divided.
    pub split_mode: SplitMode,
}

// =============================================================================
// Allocation Result
// =============================================================================

/// One participant's slice of the bill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantShare {
    /// Share of the itemized subtotal, from item assignments.
    pub base_share: f64,

    /// Proportional share of combined tax + tip.
    pub tax_tip_share: f64,

    /// base_share + tax_tip_share.
    pub total: f64,
}

/// Aggregate bill totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BillTotals {
    /// Σ item unit_price × quantity (or the externally supplied subtotal
    /// in equal mode), before tax/tip.
    pub subtotal: f64,

    /// subtotal × tax rate.
    pub tax_amount: f64,

    /// subtotal × tip rate.
    pub tip_amount: f64,

    /// subtotal + tax + tip.
    pub grand_total: f64,
}

/// The published output of the allocation engine.
///
/// Always fully recomputed from the current registry + ledger + config
/// snapshot, never patched in place, so it can never go stale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    /// Per-participant breakdown, keyed by participant id.
    pub shares: BTreeMap<String, ParticipantShare>,

    /// Aggregate totals.
    pub totals: BillTotals,
}

impl AllocationResult {
    /// An empty result (no participants, all totals zero).
    pub fn empty() -> Self {
        AllocationResult::default()
    }

    /// Sum of every participant's total.
    pub fn share_sum(&self) -> f64 {
        self.shares.values().map(|s| s.total).sum()
    }

    /// Checks the conservation invariant: Σ shares == grand total within
    /// a relative tolerance of [`RECONCILE_EPSILON`].
    pub fn reconciles(&self) -> bool {
        let sum = self.share_sum();
        let grand = self.totals.grand_total;
        (sum - grand).abs() <= RECONCILE_EPSILON * grand.abs().max(1.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
