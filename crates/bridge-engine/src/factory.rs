//! Name-keyed registry of compiled programs.
//!
//! Programs register a constructor under a fixed name once per process;
//! callers then create any number of independent instances by name.

use std::sync::LazyLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::engine::{Engine, Evaluator};

/// Builds a fresh evaluator for one program instance.
pub type EvaluatorFactory = fn() -> Box<dyn Evaluator>;

static REGISTRY: LazyLock<RwLock<FxHashMap<String, EvaluatorFactory>>> =
    LazyLock::new(|| RwLock::new(FxHashMap::default()));

/// Process-global program registry.
pub struct ProgramFactory;

impl ProgramFactory {
    /// Register a program. Returns true if an earlier registration was replaced.
    pub fn register(name: &str, factory: EvaluatorFactory) -> bool {
        let replaced = REGISTRY.write().insert(name.to_string(), factory).is_some();
        if replaced {
            warn!(program = name, "program registration replaced");
        } else {
            debug!(program = name, "program registered");
        }
        replaced
    }

    pub fn is_registered(name: &str) -> bool {
        REGISTRY.read().contains_key(name)
    }

    /// Names of all registered programs, sorted.
    pub fn programs() -> Vec<String> {
        let mut names: Vec<String> = REGISTRY.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Create a new instance of a registered program.
    ///
    /// Returns `None` if no program is registered under `name`, or if the
    /// program's declarations are malformed.
    pub fn new_instance(name: &str) -> Option<Engine> {
        let factory = *REGISTRY.read().get(name)?;
        match Engine::new(name, factory()) {
            Ok(engine) => Some(engine),
            Err(err) => {
                warn!(program = name, %err, "program declarations rejected");
                None
            }
        }
    }
}
