//! Settings are read from a TOML file chosen with `--settings`.
//! See `bin/settings_demo.rs` for a binary that loads and prints them.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
