//! # Error Types
//!
//! Domain-specific error types for splitbill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  splitbill-core errors (this file)                                     │
//! │  ├── SplitError       - Registry/ledger operation rejections           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  Flow: ValidationError → SplitError → absorbed by BillSession          │
//! │                                                                         │
//! │  NOTE: No error ever crosses the session boundary. Rejected mutations  │
//! │  are no-ops (the UI redisplays the last good state); these types exist │
//! │  so the internals stay typed and the rejection reason is loggable.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Split Error
// =============================================================================

/// Registry and ledger operation rejections.
///
/// These never propagate past [`crate::session::BillSession`], which turns
/// them into silent no-ops. They exist so rejections stay typed internally.
#[derive(Debug, Error)]
pub enum SplitError {
    /// The last remaining participant cannot be removed.
    ///
    /// ## Why
    /// Every bill needs at least one payer: the equal split divides by the
    /// participant count, and the assignment fallback rule reassigns items
    /// to "all current participants", both of which are undefined for an
    /// empty registry.
    #[error("cannot remove the last remaining participant")]
    LastParticipant,

    /// No participant with this id exists.
    #[error("participant not found: {0}")]
    ParticipantNotFound(String),

    /// No bill item with this id exists.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before the mutation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank after trimming.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with SplitError.
pub type SplitResult<T> = Result<T, SplitError>;

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
