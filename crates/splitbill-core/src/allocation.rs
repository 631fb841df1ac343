//! # Allocation Engine
//!
//! Pure functions mapping (participants, items, rates) → per-participant
//! owed amounts. No side effects; deterministic given its inputs.
//!
//! ## The Two Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Allocation Engine                                 │
//! │                                                                         │
//! │  Equal mode (trivial):                                                  │
//! │    grand_total = subtotal + tax + tip                                   │
//! │    per_person  = grand_total / participant_count                        │
//! │                                                                         │
//! │  Itemized mode (the real work):                                         │
//! │    1. subtotal  = Σ unit_price × quantity                               │
//! │    2. per item: line_total / |assignees| added to each assignee's base  │
//! │    3. pool      = tax + tip (both computed from the subtotal)           │
//! │    4. per person: tax_tip = pool × (base / subtotal)                    │
//! │    5. grand     = subtotal + pool                                       │
//! │                                                                         │
//! │  INVARIANT: Σ per-person totals == grand_total (1e-9 relative),         │
//! │  because no rounding happens anywhere in this module.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarded Divisions
//! Two divisions could misbehave and both are guarded:
//! - `line_total / assignees`: the ledger's fallback rule keeps every
//!   assignment set non-empty; the engine still skips an empty set rather
//!   than dividing by zero, in case it is fed hand-built items
//! - `base / subtotal` when `subtotal == 0` (all items free, or no items):
//!   every proportion is forced to 0 instead of computing 0/0, so the
//!   tax/tip pool simply goes undistributed and `grand = pool`

use std::collections::BTreeMap;

use crate::ledger::ItemLedger;
use crate::registry::ParticipantRegistry;
use crate::types::{AllocationResult, BillConfig, BillItem, BillTotals, ParticipantShare, Rate, SplitMode};

/// Runs the engine over a full state snapshot.
///
/// `equal_subtotal` is the externally supplied subtotal used by equal
/// mode (the itemized ledger is ignored there); itemized mode derives
/// its subtotal from the ledger.
pub fn allocate(
    registry: &ParticipantRegistry,
    ledger: &ItemLedger,
    config: &BillConfig,
    equal_subtotal: f64,
) -> AllocationResult {
    match config.split_mode {
        SplitMode::Equal => {
            allocate_equal(equal_subtotal, config.tax_rate, config.tip_rate, registry.ids())
        }
        SplitMode::Itemized => {
            allocate_itemized(registry.ids(), ledger.iter(), config.tax_rate, config.tip_rate)
        }
    }
}

/// Equal split: everyone pays grand_total / participant_count.
///
/// The result keeps the same shape as itemized mode (each participant's
/// `base_share` is their slice of the subtotal, `tax_tip_share` their
/// slice of the pool), so the presentation layer renders both modes
/// through one code path and the conservation invariant holds uniformly.
///
/// ## Example
/// ```rust
/// use splitbill_core::allocation::allocate_equal;
/// use splitbill_core::types::Rate;
///
/// let result = allocate_equal(
///     100.0,
///     Rate::from_percent(10.0),
///     Rate::from_percent(5.0),
///     vec!["p1".to_string(), "p2".to_string()],
/// );
/// assert_eq!(result.totals.grand_total, 115.0);
/// assert_eq!(result.shares["p1"].total, 57.5);
/// ```
pub fn allocate_equal(
    subtotal: f64,
    tax_rate: Rate,
    tip_rate: Rate,
    participant_ids: impl IntoIterator<Item = String>,
) -> AllocationResult {
    let tax_amount = subtotal * tax_rate.fraction();
    let tip_amount = subtotal * tip_rate.fraction();
    let grand_total = subtotal + tax_amount + tip_amount;

    let ids: Vec<String> = participant_ids.into_iter().collect();
    let mut shares = BTreeMap::new();

    // Participant count is ≥ 1 by the registry invariant; an empty list
    // (engine called directly) yields aggregate totals with no shares.
    if !ids.is_empty() {
        let count = ids.len() as f64;
        let base_share = subtotal / count;
        let tax_tip_share = (tax_amount + tip_amount) / count;
        for id in ids {
            shares.insert(
                id,
                ParticipantShare {
                    base_share,
                    tax_tip_share,
                    total: base_share + tax_tip_share,
                },
            );
        }
    }

    AllocationResult {
        shares,
        totals: BillTotals {
            subtotal,
            tax_amount,
            tip_amount,
            grand_total,
        },
    }
}

/// Itemized split: each participant pays for their assigned items plus a
/// proportional share of tax and tip.
///
/// ## Worked Example
/// ```text
/// Participants: P1, P2, P3
/// Item A: 30000 × 1, assigned {P1, P2}  →  15000 each
/// Item B: 20000 × 1, assigned {P3}      →  20000
/// Tax 10%, tip 10% on subtotal 50000    →  pool 10000
///
/// base      = {P1: 15000, P2: 15000, P3: 20000}
/// tax_tip   = {P1:  3000, P2:  3000, P3:  4000}   (pool × base/subtotal)
/// total     = {P1: 18000, P2: 18000, P3: 24000}
/// grand     = 60000 = Σ totals ✓
/// ```
pub fn allocate_itemized<'a>(
    participant_ids: impl IntoIterator<Item = String>,
    items: impl IntoIterator<Item = &'a BillItem>,
    tax_rate: Rate,
    tip_rate: Rate,
) -> AllocationResult {
    // Every participant appears in the result, assigned items or not:
    // a person with no assignments owes 0, not "missing".
    let mut base: BTreeMap<String, f64> = participant_ids
        .into_iter()
        .map(|id| (id, 0.0))
        .collect();

    let mut subtotal = 0.0;
    for item in items {
        let line_total = item.line_total();
        subtotal += line_total;

        let assignees = item.assignee_count();
        if assignees == 0 {
            continue;
        }

        let per_assignee = line_total / assignees as f64;
        for id in &item.assigned {
            if let Some(share) = base.get_mut(id) {
                *share += per_assignee;
            }
        }
    }

    let tax_amount = subtotal * tax_rate.fraction();
    let tip_amount = subtotal * tip_rate.fraction();
    let pool = tax_amount + tip_amount;

    let shares: BTreeMap<String, ParticipantShare> = base
        .into_iter()
        .map(|(id, base_share)| {
            let proportion = if subtotal > 0.0 {
                base_share / subtotal
            } else {
                0.0
            };
            let tax_tip_share = pool * proportion;
            (
                id,
                ParticipantShare {
                    base_share,
                    tax_tip_share,
                    total: base_share + tax_tip_share,
                },
            )
        })
        .collect();

    AllocationResult {
        shares,
        totals: BillTotals {
            subtotal,
            tax_amount,
            tip_amount,
            grand_total: subtotal + pool,
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RECONCILE_EPSILON;
    use chrono::Utc;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= RECONCILE_EPSILON * b.abs().max(1.0)
    }

    fn item(name: &str, unit_price: f64, quantity: i64, assigned: &[&str]) -> BillItem {
        BillItem {
            id: format!("item-{name}"),
            name: name.to_string(),
            unit_price,
            quantity,
            assigned: assigned.iter().map(|s| s.to_string()).collect(),
            added_at: Utc::now(),
        }
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_equal_split() {
        let result = allocate_equal(
            100.0,
            Rate::from_percent(10.0),
            Rate::from_percent(10.0),
            ids(&["p1", "p2", "p3", "p4"]),
        );

        assert!(approx(result.totals.tax_amount, 10.0));
        assert!(approx(result.totals.tip_amount, 10.0));
        assert!(approx(result.totals.grand_total, 120.0));
        for share in result.shares.values() {
            assert!(approx(share.total, 30.0));
        }
        assert!(result.reconciles());
    }

    #[test]
    fn test_equal_split_zero_subtotal() {
        let result = allocate_equal(
            0.0,
            Rate::from_percent(10.0),
            Rate::zero(),
            ids(&["p1", "p2"]),
        );

        assert_eq!(result.totals.grand_total, 0.0);
        assert_eq!(result.shares["p1"].total, 0.0);
        assert!(result.reconciles());
    }

    /// The reference scenario: two shared assignments, one solo item,
    /// 10% tax + 10% tip prorated by base share.
    #[test]
    fn test_itemized_reference_scenario() {
        let items = [
            item("A", 30000.0, 1, &["p1", "p2"]),
            item("B", 20000.0, 1, &["p3"]),
        ];
        let result = allocate_itemized(
            ids(&["p1", "p2", "p3"]),
            items.iter(),
            Rate::from_percent(10.0),
            Rate::from_percent(10.0),
        );

        assert!(approx(result.totals.subtotal, 50000.0));
        assert!(approx(result.totals.tax_amount, 5000.0));
        assert!(approx(result.totals.tip_amount, 5000.0));
        assert!(approx(result.totals.grand_total, 60000.0));

        assert!(approx(result.shares["p1"].base_share, 15000.0));
        assert!(approx(result.shares["p2"].base_share, 15000.0));
        assert!(approx(result.shares["p3"].base_share, 20000.0));

        assert!(approx(result.shares["p1"].tax_tip_share, 3000.0));
        assert!(approx(result.shares["p2"].tax_tip_share, 3000.0));
        assert!(approx(result.shares["p3"].tax_tip_share, 4000.0));

        assert!(approx(result.shares["p1"].total, 18000.0));
        assert!(approx(result.shares["p2"].total, 18000.0));
        assert!(approx(result.shares["p3"].total, 24000.0));

        assert!(approx(result.share_sum(), result.totals.grand_total));
        assert!(result.reconciles());
    }

    /// Conservation must hold for awkward divisions too (thirds, sevenths).
    #[test]
    fn test_conservation_with_uneven_divisions() {
        let items = [
            item("A", 10.0, 1, &["p1", "p2", "p3"]),
            item("B", 1.0, 7, &["p1", "p2"]),
            item("C", 0.1, 3, &["p3"]),
        ];
        let result = allocate_itemized(
            ids(&["p1", "p2", "p3"]),
            items.iter(),
            Rate::from_percent(8.875),
            Rate::from_percent(18.0),
        );

        assert!(result.reconciles());
        assert!(approx(result.share_sum(), result.totals.grand_total));
    }

    /// Doubling the tax rate doubles every tax_tip share and leaves every
    /// base share untouched.
    #[test]
    fn test_tax_tip_proportionality() {
        let items = [
            item("A", 300.0, 1, &["p1", "p2"]),
            item("B", 200.0, 1, &["p2"]),
        ];
        let participants = ids(&["p1", "p2"]);

        let single = allocate_itemized(
            participants.clone(),
            items.iter(),
            Rate::from_percent(10.0),
            Rate::zero(),
        );
        let double = allocate_itemized(
            participants,
            items.iter(),
            Rate::from_percent(20.0),
            Rate::zero(),
        );

        for id in ["p1", "p2"] {
            assert!(approx(single.shares[id].base_share, double.shares[id].base_share));
            assert!(approx(
                double.shares[id].tax_tip_share,
                2.0 * single.shares[id].tax_tip_share
            ));
        }
    }

    /// All items free: every total is 0, no NaN/Infinity artifacts.
    #[test]
    fn test_degenerate_zero_subtotal() {
        let items = [item("Freebie", 0.0, 2, &["p1", "p2"])];
        let result = allocate_itemized(
            ids(&["p1", "p2"]),
            items.iter(),
            Rate::from_percent(10.0),
            Rate::from_percent(10.0),
        );

        assert_eq!(result.totals.subtotal, 0.0);
        assert_eq!(result.totals.grand_total, 0.0);
        for share in result.shares.values() {
            assert_eq!(share.total, 0.0);
            assert!(share.total.is_finite());
        }
        assert!(result.reconciles());
    }

    #[test]
    fn test_empty_ledger() {
        let result = allocate_itemized(
            ids(&["p1", "p2"]),
            std::iter::empty(),
            Rate::from_percent(10.0),
            Rate::from_percent(5.0),
        );

        assert_eq!(result.totals.subtotal, 0.0);
        assert_eq!(result.totals.grand_total, 0.0);
        assert_eq!(result.shares.len(), 2);
        assert_eq!(result.shares["p1"].total, 0.0);
    }

    /// A participant with no assigned items still appears, owing zero.
    #[test]
    fn test_unassigned_participant_owes_zero() {
        let items = [item("A", 100.0, 1, &["p1"])];
        let result = allocate_itemized(
            ids(&["p1", "p2"]),
            items.iter(),
            Rate::from_percent(10.0),
            Rate::zero(),
        );

        assert!(approx(result.shares["p1"].total, 110.0));
        assert_eq!(result.shares["p2"].total, 0.0);
        assert!(result.reconciles());
    }

    /// Quantity multiplies into the line total before splitting.
    #[test]
    fn test_quantity_multiplies_line_total() {
        let items = [item("A", 2.5, 4, &["p1", "p2"])];
        let result = allocate_itemized(
            ids(&["p1", "p2"]),
            items.iter(),
            Rate::zero(),
            Rate::zero(),
        );

        assert!(approx(result.totals.subtotal, 10.0));
        assert!(approx(result.shares["p1"].base_share, 5.0));
    }

    /// Hand-built item with an empty assignment set (unreachable through
    /// the ledger) is skipped for base shares but still counts toward the
    /// subtotal; its cost sits in the aggregate, not on any person.
    #[test]
    fn test_hand_built_empty_assignment_is_skipped() {
        let orphan = item("Orphan", 100.0, 1, &[]);
        let result = allocate_itemized(
            ids(&["p1"]),
            [&orphan].into_iter(),
            Rate::zero(),
            Rate::zero(),
        );

        assert_eq!(result.totals.subtotal, 100.0);
        assert_eq!(result.shares["p1"].base_share, 0.0);
        assert!(result.shares["p1"].total.is_finite());
    }
}
