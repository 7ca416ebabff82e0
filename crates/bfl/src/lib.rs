//! Black Forest Labs image-generation client and batch adapter.
//!
//! Provides the HTTP client for the BFL job API, the [`ImageProvider`]
//! seam it implements, deadline-bounded job polling, and the batch
//! adapter that fans one request out into a job per timepoint.
//!
//! [`ImageProvider`]: provider::ImageProvider

pub mod api;
pub mod batch;
pub mod config;
pub mod poll;
pub mod provider;
