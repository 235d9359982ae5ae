//! Client-side analysis session manager for a remote comment classification service.
/// Application directory resolution.
pub mod app_dirs;
/// Classification service client.
pub mod classifier;
/// Settings file handling.
pub mod config;
/// Canonical label sets.
pub mod labels;
/// Tracing subscriber setup.
pub mod logging;
/// Domain records.
pub mod model;
/// Label normalization.
pub mod normalize;
/// Analysis session store.
pub mod session;
/// History statistics.
pub mod stats;

mod http_client;
