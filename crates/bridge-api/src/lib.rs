//! Handle layer over the bridge engine.
//!
//! A [`Program`] owns one engine instance. Everything else borrows from it:
//! [`Relation`] handles, the [`WriteTuple`]s they create, the
//! [`RelationIter`]s they open and the [`TupleView`]s those yield. The borrow
//! checker rejects any use of a handle after its program has been run,
//! purged or destroyed.
//!
//! Within one program state, a relation with an open iterator rejects
//! inserts with [`BridgeError::RelationBusy`].
//!
//! ```
//! use bridge_api::Program;
//!
//! bridge_programs::install();
//! let mut program = Program::create("copy").unwrap();
//!
//! let input = program.relation("in").unwrap();
//! let mut tuple = input.create_tuple();
//! tuple.append_number(7).append_text("alpha");
//! input.insert(tuple).unwrap();
//!
//! program.run().unwrap();
//!
//! let output = program.relation("out").unwrap();
//! let mut iter = output.iter();
//! let mut row = iter.next_tuple().unwrap();
//! assert_eq!(row.read_number().unwrap(), 7);
//! assert_eq!(row.read_text().unwrap(), "alpha");
//! assert!(!iter.has_next());
//! ```
//!
//! A relation handle cannot be used once its program is destroyed:
//!
//! ```compile_fail,E0505
//! use bridge_api::Program;
//!
//! bridge_programs::install();
//! let program = Program::create("copy").unwrap();
//! let input = program.relation("in").unwrap();
//! program.destroy();
//! input.len();
//! ```
//!
//! Running or purging needs the program exclusively, so no relation handle or
//! iterator may be held across it:
//!
//! ```compile_fail,E0502
//! use bridge_api::Program;
//!
//! bridge_programs::install();
//! let mut program = Program::create("copy").unwrap();
//! let input = program.relation("in").unwrap();
//! program.run().unwrap();
//! input.len();
//! ```
//!
//! ```compile_fail,E0502
//! use bridge_api::Program;
//!
//! bridge_programs::install();
//! let mut program = Program::create("copy").unwrap();
//! let output = program.relation("out").unwrap();
//! let iter = output.iter();
//! program.purge();
//! iter.has_next();
//! ```
//!
//! A tuple view is gone once its iterator advances:
//!
//! ```compile_fail,E0499
//! use bridge_api::Program;
//!
//! bridge_programs::install();
//! let program = Program::create("copy").unwrap();
//! let input = program.relation("in").unwrap();
//! let mut iter = input.iter();
//! let first = iter.next_tuple();
//! let second = iter.next_tuple();
//! drop((first, second));
//! ```

mod error;
mod iter;
mod program;
mod relation;
mod tuple;

pub use error::BridgeError;
pub use iter::{IterState, RelationIter};
pub use program::Program;
pub use relation::Relation;
pub use tuple::{TupleView, WriteTuple};

pub use bridge_engine::{FromTuple, FromValue, RelationDecl, RelationRole, Value, ValueKind};
