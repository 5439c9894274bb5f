//! slotlove-core: the SlotLove card spinner.
//!
//! Picks one option code per category, weighted by feedback scores, keeping
//! the chosen place compatible with the chosen action and honoring caller
//! locks. Records likes and dislikes, and reports cards to an optional
//! notification sink.
//!
//! # Public API
//!
//! - [`engine::spin`] / [`engine::quick_spin`] -- pure selection over a catalog
//! - [`choice::weighted_choice`] -- the score-weighted draw
//! - [`feedback`] -- bulk and single-card score updates
//! - [`Spinner`] -- store + engine + sink, one method per request kind
//! - [`NotificationSink`] with [`DisabledSink`], [`MemorySink`] and, with the
//!   `sheets` feature, [`SheetsSink`]

/// Action category; drawn first.
pub const ACTION: &str = "azione";
/// Place category; constrained by the chosen action.
pub const PLACE: &str = "luogo";
/// Category filtered by difficulty level.
pub const ENERGY: &str = "energy";
/// Participants category; locked to pair mode unless explicitly spun.
pub const PARTICIPANTS: &str = "partecipanti";
/// Participants code meaning "default pair mode".
pub const DEFAULT_PAIR_CODE: &str = "part_001";
/// Energy codes start with this prefix followed by the level character.
pub const LEVEL_PREFIX: &str = "int_";
/// Energy codes valid at every level.
pub const ANY_LEVEL_PREFIX: &str = "int_any";

pub mod choice;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod notify;
pub mod service;
#[cfg(feature = "sheets")]
pub mod sheets;

// ── Convenience re-exports ───────────────────────────────────────────

pub use engine::{Locks, Selection};
pub use error::SpinnerError;
pub use feedback::CardFeedback;
pub use notify::{CardEvent, DisabledSink, FeedbackTag, MemorySink, NotificationSink, NotifyError};
pub use service::{SpinOutcome, SpinRequest, Spinner};
#[cfg(feature = "sheets")]
pub use sheets::SheetsSink;
