//! # Bill Session
//!
//! The recalculation controller: owns the registry, ledger, and config,
//! and republishes a fresh [`AllocationResult`] after every mutation.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Recalculation Controller                             │
//! │                                                                         │
//! │            any successful mutation                                      │
//! │    ┌───────┐ ─────────────────────► ┌───────┐                          │
//! │    │ Fresh │                        │ Stale │                          │
//! │    └───────┘ ◄───────────────────── └───────┘                          │
//! │            synchronous allocate()                                       │
//! │                                                                         │
//! │  There is no asynchronous or debounced path. Recomputation is           │
//! │  O(items × avg assignees + participants) and runs unconditionally       │
//! │  before the mutating call returns, so no caller ever observes a         │
//! │  stale result. A rejected mutation never leaves Fresh.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Absorption
//! Public mutators never return errors. Invalid input, removal of the
//! last participant, and unknown ids are silently rejected (`None`/
//! `false`) and logged at debug level; the UI always has the last good
//! result to redisplay. Internals stay typed via [`SplitError`].

use tracing::{debug, trace};

use crate::allocation;
use crate::error::SplitError;
use crate::ledger::ItemLedger;
use crate::registry::ParticipantRegistry;
use crate::types::{AllocationResult, BillConfig, BillItem, Participant, Rate, SplitMode};
use crate::validation::sanitize_amount;

// =============================================================================
// Recalc State
// =============================================================================

/// Whether the published result reflects the current state.
///
/// `Stale` is only ever observable from inside a mutation; every public
/// method recomputes synchronously before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecalcState {
    /// A mutation has landed and the result has not been recomputed yet.
    Stale,
    /// The published result reflects the current snapshot.
    Fresh,
}

// =============================================================================
// Bill Session
// =============================================================================

/// One bill being split: participants, items, configuration, and the
/// always-current allocation result.
///
/// ## Ownership
/// The session exclusively owns the registry and ledger. External callers
/// interact only through these methods, never by mutating entities
/// directly. Single-threaded and synchronous, so no locks are needed.
#[derive(Debug, Clone)]
pub struct BillSession {
    registry: ParticipantRegistry,
    ledger: ItemLedger,
    config: BillConfig,
    /// Externally supplied subtotal used by equal mode.
    equal_subtotal: f64,
    recalc_state: RecalcState,
    result: AllocationResult,
}

impl BillSession {
    /// Creates a session seeded with two participants.
    ///
    /// The seed keeps the "at least one participant" invariant true from
    /// the first snapshot; the UI renames/removes them as people arrive.
    pub fn new() -> Self {
        let mut session = BillSession {
            registry: ParticipantRegistry::new(),
            ledger: ItemLedger::new(),
            config: BillConfig::default(),
            equal_subtotal: 0.0,
            recalc_state: RecalcState::Stale,
            result: AllocationResult::empty(),
        };
        for name in ["Person 1", "Person 2"] {
            session
                .registry
                .add(name)
                .expect("seed participant names are non-blank");
        }
        session.recompute();
        session
    }

    // -------------------------------------------------------------------------
    // Participant mutations
    // -------------------------------------------------------------------------

    /// Adds a participant. Blank names are silently rejected.
    ///
    /// ## Returns
    /// The new participant's id, or `None` if rejected.
    pub fn add_participant(&mut self, name: &str) -> Option<String> {
        match self.registry.add(name) {
            Ok(id) => {
                self.recompute();
                Some(id)
            }
            Err(err) => {
                self.reject("add_participant", err);
                None
            }
        }
    }

    /// Removes a participant and cascades into the ledger: the id is
    /// stripped from every item's assignment set, and any item left empty
    /// falls back to all remaining participants.
    ///
    /// Removing the last remaining participant is silently rejected.
    pub fn remove_participant(&mut self, id: &str) -> bool {
        match self.registry.remove(id) {
            Ok(removed) => {
                let remaining = self.registry.id_set();
                self.ledger.remove_participant(&removed.id, &remaining);
                self.recompute();
                true
            }
            Err(err) => {
                self.reject("remove_participant", err);
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Item mutations
    // -------------------------------------------------------------------------

    /// Adds a line item assigned to all current participants.
    ///
    /// Raw price input is sanitized first (non-finite/negative → 0), then
    /// the usual rules apply: blank name, non-positive price, or quantity
    /// outside range are silently rejected.
    ///
    /// ## Returns
    /// The new item's id, or `None` if rejected.
    pub fn add_item(&mut self, name: &str, unit_price: f64, quantity: i64) -> Option<String> {
        let unit_price = sanitize_amount(unit_price);
        let everyone = self.registry.id_set();
        match self.ledger.add(name, unit_price, quantity, &everyone) {
            Ok(id) => {
                self.recompute();
                Some(id)
            }
            Err(err) => {
                self.reject("add_item", err);
                None
            }
        }
    }

    /// Removes an item. No cascading effects elsewhere.
    pub fn remove_item(&mut self, id: &str) -> bool {
        match self.ledger.remove(id) {
            Ok(_) => {
                self.recompute();
                true
            }
            Err(err) => {
                self.reject("remove_item", err);
                false
            }
        }
    }

    /// Flips a participant's membership in an item's assignment set.
    ///
    /// Toggling off the last assignee resets the set to all current
    /// participants (fallback rule). Unknown item or participant ids are
    /// silently rejected, so assignment sets only ever hold registered ids.
    pub fn toggle_assignment(&mut self, item_id: &str, participant_id: &str) -> bool {
        if !self.registry.contains(participant_id) {
            self.reject(
                "toggle_assignment",
                SplitError::ParticipantNotFound(participant_id.to_string()),
            );
            return false;
        }

        let everyone = self.registry.id_set();
        match self.ledger.toggle_assignment(item_id, participant_id, &everyone) {
            Ok(()) => {
                self.recompute();
                true
            }
            Err(err) => {
                self.reject("toggle_assignment", err);
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Configuration mutations
    // -------------------------------------------------------------------------

    /// Sets the tax rate from a raw percentage (invalid input → 0).
    pub fn set_tax_rate(&mut self, percent: f64) {
        self.config.tax_rate = Rate::from_percent(percent);
        self.recompute();
    }

    /// Sets the tip rate from a raw percentage (invalid input → 0).
    pub fn set_tip_rate(&mut self, percent: f64) {
        self.config.tip_rate = Rate::from_percent(percent);
        self.recompute();
    }

    /// Switches between equal and itemized splitting.
    pub fn set_split_mode(&mut self, mode: SplitMode) {
        self.config.split_mode = mode;
        self.recompute();
    }

    /// Sets the externally supplied subtotal used by equal mode
    /// (invalid input → 0). Itemized mode ignores it.
    pub fn set_equal_subtotal(&mut self, amount: f64) {
        self.equal_subtotal = sanitize_amount(amount);
        self.recompute();
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// The current allocation result. Always fresh: every mutation
    /// recomputed it before returning.
    pub fn result(&self) -> &AllocationResult {
        &self.result
    }

    /// Participants in join order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.registry.iter()
    }

    /// Items in the order they were added.
    pub fn items(&self) -> impl Iterator<Item = &BillItem> {
        self.ledger.iter()
    }

    /// Current configuration.
    pub fn config(&self) -> &BillConfig {
        &self.config
    }

    /// Equal-mode subtotal as last set (post-sanitization).
    pub fn equal_subtotal(&self) -> f64 {
        self.equal_subtotal
    }

    /// Controller state. `Fresh` from any external vantage point.
    pub fn recalc_state(&self) -> RecalcState {
        self.recalc_state
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Full synchronous recomputation from the current snapshot.
    fn recompute(&mut self) {
        self.recalc_state = RecalcState::Stale;
        self.result = allocation::allocate(
            &self.registry,
            &self.ledger,
            &self.config,
            self.equal_subtotal,
        );
        self.recalc_state = RecalcState::Fresh;
        trace!(
            participants = self.registry.len(),
            items = self.ledger.len(),
            grand_total = self.result.totals.grand_total,
            "allocation recomputed"
        );
    }

    /// Records a rejected mutation and leaves all state untouched.
    fn reject(&self, operation: &'static str, err: SplitError) {
        debug!(%err, operation, "mutation rejected");
    }
}

impl Default for BillSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RECONCILE_EPSILON;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= RECONCILE_EPSILON * b.abs().max(1.0)
    }

    /// Builds the reference bill: three people, one item shared by the
    /// first two, one item solo for the third, 10% tax + 10% tip.
    fn reference_session() -> (BillSession, String, String, String) {
        let mut session = BillSession::new();
        session.set_split_mode(SplitMode::Itemized);
        session.set_tax_rate(10.0);
        session.set_tip_rate(10.0);

        let p3 = session.add_participant("P3").unwrap();
        let existing: Vec<String> = session.participants().map(|p| p.id.clone()).collect();
        let (p1, p2) = (existing[0].clone(), existing[1].clone());

        let a = session.add_item("A", 30000.0, 1).unwrap();
        let b = session.add_item("B", 20000.0, 1).unwrap();

        // Item A becomes {p1, p2}
        session.toggle_assignment(&a, &p3);
        // Item B becomes {p3}
        session.toggle_assignment(&b, &p1);
        session.toggle_assignment(&b, &p2);

        (session, p1, p2, p3)
    }

    #[test]
    fn test_new_session_is_fresh_with_two_participants() {
        let session = BillSession::new();
        assert_eq!(session.recalc_state(), RecalcState::Fresh);
        assert_eq!(session.participants().count(), 2);
        assert_eq!(session.result().shares.len(), 2);
        assert!(session.result().reconciles());
    }

    #[test]
    fn test_reference_scenario_end_to_end() {
        let (session, p1, p2, p3) = reference_session();
        let result = session.result();

        assert!(approx(result.totals.subtotal, 50000.0));
        assert!(approx(result.totals.grand_total, 60000.0));
        assert!(approx(result.shares[&p1].total, 18000.0));
        assert!(approx(result.shares[&p2].total, 18000.0));
        assert!(approx(result.shares[&p3].total, 24000.0));
        assert!(result.reconciles());
    }

    #[test]
    fn test_every_mutation_republishes() {
        let mut session = BillSession::new();
        session.set_split_mode(SplitMode::Itemized);
        session.set_tax_rate(10.0);

        session.add_item("Tea", 100.0, 1).unwrap();
        assert!(approx(session.result().totals.grand_total, 110.0));

        session.set_tax_rate(20.0);
        assert!(approx(session.result().totals.grand_total, 120.0));

        session.set_tip_rate(10.0);
        assert!(approx(session.result().totals.grand_total, 130.0));

        assert_eq!(session.recalc_state(), RecalcState::Fresh);
    }

    #[test]
    fn test_rejected_mutation_is_noop() {
        let mut session = BillSession::new();
        session.set_split_mode(SplitMode::Itemized);
        session.add_item("Tea", 100.0, 1).unwrap();
        let before = session.result().clone();

        assert!(session.add_participant("   ").is_none());
        assert!(session.add_item("", 50.0, 1).is_none());
        assert!(session.add_item("Ghost", -50.0, 1).is_none());
        assert!(!session.remove_item("no-such-id"));
        assert!(!session.toggle_assignment("no-such-item", "no-such-person"));

        assert_eq!(session.result(), &before);
        assert_eq!(session.recalc_state(), RecalcState::Fresh);
    }

    #[test]
    fn test_remove_last_participant_rejected() {
        let mut session = BillSession::new();
        let ids: Vec<String> = session.participants().map(|p| p.id.clone()).collect();

        assert!(session.remove_participant(&ids[0]));
        assert!(!session.remove_participant(&ids[1]));
        assert_eq!(session.participants().count(), 1);
    }

    #[test]
    fn test_remove_participant_cascades_and_falls_back() {
        let (mut session, p1, p2, p3) = reference_session();

        // p3 is the only payer of item B; removing p3 must reassign B to
        // everyone remaining.
        assert!(session.remove_participant(&p3));

        let b = session
            .items()
            .find(|i| i.name == "B")
            .expect("item B still on the ledger")
            .clone();
        assert!(b.is_assigned(&p1));
        assert!(b.is_assigned(&p2));

        let result = session.result();
        assert!(approx(result.totals.subtotal, 50000.0));
        assert!(result.reconciles());
        // B's 20000 now splits between p1 and p2 on top of A's 15000 each
        assert!(approx(result.shares[&p1].base_share, 25000.0));
        assert!(approx(result.shares[&p2].base_share, 25000.0));
    }

    #[test]
    fn test_new_item_assigned_to_participants_at_creation_time() {
        let mut session = BillSession::new();
        session.set_split_mode(SplitMode::Itemized);

        let before = session.add_item("Early", 100.0, 1).unwrap();
        session.add_participant("Late").unwrap();
        let after = session.add_item("Later", 100.0, 1).unwrap();

        let early = session.items().find(|i| i.id == before).unwrap();
        let later = session.items().find(|i| i.id == after).unwrap();
        assert_eq!(early.assignee_count(), 2);
        assert_eq!(later.assignee_count(), 3);
    }

    #[test]
    fn test_equal_mode_uses_external_subtotal() {
        let mut session = BillSession::new();
        session.set_tax_rate(10.0);
        session.set_tip_rate(10.0);
        session.set_equal_subtotal(100.0);

        // Ledger content is irrelevant in equal mode
        session.set_split_mode(SplitMode::Itemized);
        session.add_item("Tea", 999.0, 1).unwrap();
        session.set_split_mode(SplitMode::Equal);

        let result = session.result();
        assert!(approx(result.totals.subtotal, 100.0));
        assert!(approx(result.totals.grand_total, 120.0));
        for share in result.shares.values() {
            assert!(approx(share.total, 60.0));
        }
        assert!(result.reconciles());
    }

    #[test]
    fn test_boundary_sanitization() {
        let mut session = BillSession::new();
        session.set_equal_subtotal(-50.0);
        assert_eq!(session.equal_subtotal(), 0.0);

        session.set_tax_rate(f64::NAN);
        assert!(session.config().tax_rate.is_zero());

        session.set_tip_rate(-10.0);
        assert!(session.config().tip_rate.is_zero());

        assert_eq!(session.result().totals.grand_total, 0.0);
        assert!(session.result().reconciles());
    }
}
