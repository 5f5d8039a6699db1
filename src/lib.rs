//! tienet — deterministic merge engine for tie-point control networks.
//!
//! A control network is a named collection of control points, each
//! observed in several images by measures keyed on image serial
//! numbers. tienet folds an ordered list of such networks into one,
//! resolving every conflict under an explicit [`merge::MergePolicy`]
//! and producing an auditable [`merge::ConflictReport`].
//!
//! The primary interface is the `tienet` binary; the library exposes
//! the record model, the merge engine, and the JSON serialization
//! boundary so integration tests and other tools can drive the merge
//! directly.

pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod model;

pub use error::MergeError;
pub use merge::{merge_networks, MergeOutcome, MergePolicy, NetworkStamp};
pub use model::Network;
