//! Common types, traits, and error definitions for landmark_mcl
//!
//! This module provides the value types shared by the agent, every particle,
//! and the external collaborators that consume belief snapshots.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
