//! # splitbill-core: Pure Business Logic for the SplitBill Widget
//!
//! This crate is the **heart** of the bill-splitting tool. It contains the
//! itemized settlement engine as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       SplitBill Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (widget UI)                         │   │
//! │  │    People list ──► Item ledger ──► Rates ──► Share breakdown    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ typed bindings (ts-rs)                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ splitbill-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │ registry  │  │  ledger   │  │ allocation │  │  session  │  │   │
//! │  │   │  people   │  │   items   │  │ pure math  │  │ recalc    │  │   │
//! │  │   │           │  │ fallback  │  │ tax/tip    │  │ controller│  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Participant, BillItem, AllocationResult, ...)
//! - [`error`] - Typed rejection reasons (absorbed at the session boundary)
//! - [`validation`] - Input validation and boundary sanitization
//! - [`registry`] - The participant set
//! - [`ledger`] - Billed items and their assignment sets
//! - [`allocation`] - The pure allocation engine (both split modes)
//! - [`session`] - The recalculation controller
//!
//! ## Design Principles
//!
//! 1. **Pure Engine**: allocation is deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **No Rounding**: all money stays f64; rounding to currency units is a
//!    presentation concern, so Σ shares == grand total holds losslessly
//! 4. **Fail Closed**: invalid mutations are silent no-ops, never panics -
//!    the UI always has the last good result to redisplay
//!
//! ## Example Usage
//!
//! ```rust
//! use splitbill_core::{BillSession, SplitMode};
//!
//! let mut session = BillSession::new(); // seeded with two participants
//! session.set_split_mode(SplitMode::Itemized);
//! session.set_tax_rate(10.0);
//! session.set_tip_rate(10.0);
//!
//! session.add_item("Nasi Goreng", 30000.0, 1).unwrap();
//!
//! let result = session.result();
//! assert!((result.totals.grand_total - 36000.0).abs() < 1e-6);
//! assert!(result.reconciles());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use splitbill_core::BillSession` instead of
// `use splitbill_core::session::BillSession`

pub use error::{SplitError, SplitResult, ValidationError};
pub use ledger::ItemLedger;
pub use registry::ParticipantRegistry;
pub use session::{BillSession, RecalcState};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a participant or item display name.
pub const MAX_NAME_LEN: usize = 200;

/// Relative tolerance for the conservation invariant:
/// Σ per-participant totals must equal the grand total within this bound.
///
/// ## Why Not Exact?
/// Shares are produced by float division (thirds, sevenths, ...). The
/// engine never rounds, so the only drift is float representation error,
/// orders of magnitude below this tolerance.
pub const RECONCILE_EPSILON: f64 = 1e-9;
