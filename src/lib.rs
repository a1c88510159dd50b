//! File-level driver for compiled Datalog programs: fact-file loading and
//! writing, and the configuration the command-line tool runs with.
//!
//! The program, relation, tuple and iterator handles live in `bridge_api`;
//! the C surface lives in `bridge_ffi`.

pub mod config;
pub mod facts;

pub use config::{BridgeConfig, ConfigError};
pub use facts::{FactsError, LineError, load_relation, parse_line, write_relation};
