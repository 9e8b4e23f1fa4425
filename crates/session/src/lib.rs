//! # session
//!
//! Headless editing layer for `.cscr` scripts.
//!
//! - [`EditSession`]: one script with its flat text and offset ledger
//! - [`EditCoalescer`]: debounces keystroke-level [`TextChange`]s into
//!   [`CoalescedEdit`]s for the reconciler
//! - [`SessionConfig`]: debounce window and required format version
//!
//! Nothing here draws or reads a clock. Hosts pass `Instant`s in and render
//! [`EditSession::text`] however they like, using
//! [`EditSession::header_ranges`] to style headers.

mod coalesce;
mod config;
mod error;
mod session;

pub use coalesce::{CoalescedEdit, EditCoalescer, TextChange};
pub use config::{DEFAULT_DEBOUNCE, SessionConfig};
pub use error::SessionError;
pub use session::EditSession;
