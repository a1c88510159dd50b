//! Programs compiled into this binary.
//!
//! Each module holds one rule set compiled by `ascent!` and the adapter that
//! moves tuples between the engine's relations and the compiled struct.
//! [`install`] registers all of them with the [`ProgramFactory`].
//!
//! | name | input | internal | output |
//! |---|---|---|---|
//! | `copy` | `in(unsigned, symbol)` | | `out(unsigned, symbol)` |
//! | `transitive_closure` | `edge(unsigned, unsigned)` | `node(unsigned)` | `path(unsigned, unsigned)`, `cyclic(unsigned)` |
//! | `ranking` | `score(symbol, number)` | `player(symbol)` | `best(symbol, number)`, `leader(number)` |

use std::sync::Once;

use bridge_engine::ProgramFactory;
use tracing::info;

mod closure;
mod copy;
mod ranking;

pub use closure::ClosureProgram;
pub use copy::CopyProgram;
pub use ranking::RankingProgram;

static INSTALL: Once = Once::new();

/// Register every compiled program. Safe to call repeatedly.
pub fn install() {
    INSTALL.call_once(|| {
        ProgramFactory::register(copy::NAME, || Box::new(CopyProgram));
        ProgramFactory::register(closure::NAME, || Box::new(ClosureProgram));
        ProgramFactory::register(ranking::NAME, || Box::new(RankingProgram));
        info!(programs = 3, "compiled programs installed");
    });
}

/// Names of the programs [`install`] registers.
pub const PROGRAMS: [&str; 3] = [copy::NAME, closure::NAME, ranking::NAME];
