//! # Item Ledger
//!
//! Holds the billed line items and their participant assignments.
//!
//! ## Invariants
//! - Every item's `assigned` set is non-empty. Any operation that would
//!   empty it resets it to all current participants (the fallback rule)
//! - New items default their assignment to all participants existing at
//!   creation time
//! - Removing a participant strips their id from every item, firing the
//!   fallback rule per item as needed
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Item Ledger Operations                              │
//! │                                                                         │
//! │  Frontend Action          Ledger Change                                 │
//! │  ───────────────          ─────────────                                 │
//! │                                                                         │
//! │  Add item ──────────────► items.push(), assigned = everyone             │
//! │                                                                         │
//! │  Remove item ───────────► items.remove(), no cascade                    │
//! │                                                                         │
//! │  Tap avatar on item ────► toggle membership; empty set → everyone       │
//! │                                                                         │
//! │  (person removed) ──────► strip id from every item; empty → everyone    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{SplitError, SplitResult};
use crate::types::BillItem;
use crate::validation::{validate_name, validate_quantity, validate_unit_price};

/// The billed line items.
#[derive(Debug, Clone, Default)]
pub struct ItemLedger {
    items: Vec<BillItem>,
}

impl ItemLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        ItemLedger { items: Vec::new() }
    }

    /// Adds a line item assigned to all current participants.
    ///
    /// ## Behavior
    /// - Blank names, non-positive prices, and quantities outside
    ///   1..=[`crate::MAX_ITEM_QUANTITY`] are rejected
    /// - `everyone` is the current participant id set at creation time;
    ///   it becomes the item's initial assignment
    ///
    /// ## Returns
    /// The new item's id.
    pub fn add(
        &mut self,
        name: &str,
        unit_price: f64,
        quantity: i64,
        everyone: &BTreeSet<String>,
    ) -> SplitResult<String> {
        let name = validate_name(name, "item name")?;
        validate_unit_price(unit_price)?;
        validate_quantity(quantity)?;

        let item = BillItem {
            id: Uuid::new_v4().to_string(),
            name,
            unit_price,
            quantity,
            assigned: everyone.clone(),
            added_at: Utc::now(),
        };
        let id = item.id.clone();
        self.items.push(item);

        Ok(id)
    }

    /// Removes an item by id. No cascading effects elsewhere.
    ///
    /// ## Returns
    /// The removed item.
    pub fn remove(&mut self, id: &str) -> SplitResult<BillItem> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| SplitError::ItemNotFound(id.to_string()))?;

        Ok(self.items.remove(pos))
    }

    /// Flips a participant's membership in an item's assignment set.
    ///
    /// ## Fallback Rule
    /// If toggling off the last assignee would empty the set, the set is
    /// reset to `everyone` (all current participants) instead. An item
    /// with nobody assigned is undefined for allocation and must always
    /// have at least one payer.
    pub fn toggle_assignment(
        &mut self,
        item_id: &str,
        participant_id: &str,
        everyone: &BTreeSet<String>,
    ) -> SplitResult<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| SplitError::ItemNotFound(item_id.to_string()))?;

        if !item.assigned.remove(participant_id) {
            item.assigned.insert(participant_id.to_string());
        }

        if item.assigned.is_empty() {
            item.assigned = everyone.clone();
        }

        Ok(())
    }

    /// Strips a removed participant's id from every item's assignment set.
    ///
    /// `remaining` is the participant id set after the removal; any item
    /// left with nobody assigned falls back to it.
    pub fn remove_participant(&mut self, participant_id: &str, remaining: &BTreeSet<String>) {
        for item in &mut self.items {
            if item.assigned.remove(participant_id) && item.assigned.is_empty() {
                item.assigned = remaining.clone();
            }
        }
    }

    /// Σ unit price × quantity over all items, before tax/tip.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(|i| i.line_total()).sum()
    }

    /// Looks up an item by id.
    pub fn get(&self, id: &str) -> Option<&BillItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &BillItem> {
        self.items.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
