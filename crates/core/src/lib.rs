//! Domain types shared by the brainview crates.
//!
//! Timepoints, prompt composition, cases, and the case store interface.
//! Nothing here talks to the network.

pub mod case;
pub mod error;
pub mod prompt;
pub mod store;
pub mod timepoint;
pub mod types;
