//! # Participant Registry
//!
//! Holds the set of people splitting the bill.
//!
//! ## Invariants
//! - At least one participant always exists once the session is running
//!   (removal of the last participant is rejected)
//! - Ids are unique UUID v4 strings; names may repeat
//! - Insertion order is preserved (the UI lists people in join order)
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Participant Registry Operations                        │
//! │                                                                         │
//! │  Frontend Action        Registry Change          Cascade                │
//! │  ───────────────        ───────────────          ───────                │
//! │                                                                         │
//! │  Add person ──────────► participants.push()      (none)                 │
//! │                                                                         │
//! │  Remove person ───────► participants.remove()    ledger strips the id   │
//! │                         (rejected if last)       from every item, then  │
//! │                                                  fallback rule per item │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{SplitError, SplitResult};
use crate::types::Participant;
use crate::validation::validate_name;

/// The set of people splitting the bill.
#[derive(Debug, Clone, Default)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ParticipantRegistry {
            participants: Vec::new(),
        }
    }

    /// Adds a participant with a fresh unique id.
    ///
    /// ## Behavior
    /// - The name is trimmed; a blank name is rejected
    /// - Duplicate names are allowed (ids are the identity)
    ///
    /// ## Returns
    /// The new participant's id.
    pub fn add(&mut self, name: &str) -> SplitResult<String> {
        let name = validate_name(name, "name")?;

        let participant = Participant {
            id: Uuid::new_v4().to_string(),
            name,
            joined_at: Utc::now(),
        };
        let id = participant.id.clone();
        self.participants.push(participant);

        Ok(id)
    }

    /// Removes a participant by id.
    ///
    /// ## Behavior
    /// - Unknown ids are rejected
    /// - Removing the last remaining participant is rejected: the bill
    ///   always needs at least one payer
    ///
    /// The ledger cascade (stripping the id from item assignments) is the
    /// session's job; the registry only owns the people.
    ///
    /// ## Returns
    /// The removed participant.
    pub fn remove(&mut self, id: &str) -> SplitResult<Participant> {
        let pos = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| SplitError::ParticipantNotFound(id.to_string()))?;

        if self.participants.len() <= 1 {
            return Err(SplitError::LastParticipant);
        }

        Ok(self.participants.remove(pos))
    }

    /// Looks up a participant by id.
    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Checks whether an id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }

    /// All current participant ids, in join order.
    pub fn ids(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    /// All current participant ids as a set (for item assignment defaults
    /// and the fallback rule).
    pub fn id_set(&self) -> BTreeSet<String> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    /// Participants in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Checks if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trims_name() {
        let mut registry = ParticipantRegistry::new();
        let id = registry.add("  Sam  ").unwrap();
        assert_eq!(registry.get(&id).unwrap().name, "Sam");
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let mut registry = ParticipantRegistry::new();
        assert!(registry.add("").is_err());
        assert!(registry.add("   ").is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_are_unique_even_for_duplicate_names() {
        let mut registry = ParticipantRegistry::new();
        let a = registry.add("Sam").unwrap();
        let b = registry.add("Sam").unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_last_participant_rejected() {
        let mut registry = ParticipantRegistry::new();
        let id = registry.add("Sam").unwrap();

        let err = registry.remove(&id).unwrap_err();
        assert!(matches!(err, SplitError::LastParticipant));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_unknown_id_rejected() {
        let mut registry = ParticipantRegistry::new();
        registry.add("Sam").unwrap();

        let err = registry.remove("nope").unwrap_err();
        assert!(matches!(err, SplitError::ParticipantNotFound(_)));
    }

    #[test]
    fn test_remove_returns_participant_and_preserves_order() {
        let mut registry = ParticipantRegistry::new();
        let a = registry.add("A").unwrap();
        let b = registry.add("B").unwrap();
        let c = registry.add("C").unwrap();

        let removed = registry.remove(&b).unwrap();
        assert_eq!(removed.id, b);

        let ids = registry.ids();
        assert_eq!(ids, vec![a, c]);
    }
}
