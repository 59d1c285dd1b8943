/// Tracing subscriber setup.
pub mod logging;
/// Character-safe text helpers shared by extraction and synthesis.
pub mod text;
/// TOML configuration and the snapshot manager.
pub mod toml_config;
