//! Engine side of the Datalog bridge.
//!
//! A program is a set of compiled rules (an [`Evaluator`]) registered with the
//! [`ProgramFactory`] under a name. Each instance owns a [`Database`] of typed
//! relations; the rules read the input relations and write the derived ones.
//!
//! # Example
//!
//! ```
//! use bridge_engine::{
//!     Database, EngineError, Evaluator, IntoTuple, ProgramFactory, RelationDecl, RelationRole,
//!     ValueKind,
//! };
//!
//! struct Mirror;
//!
//! impl Evaluator for Mirror {
//!     fn declarations(&self) -> Vec<RelationDecl> {
//!         vec![
//!             RelationDecl::new("in", RelationRole::Input).column("x", ValueKind::Unsigned),
//!             RelationDecl::new("out", RelationRole::Output).column("x", ValueKind::Unsigned),
//!         ]
//!     }
//!
//!     fn evaluate(&mut self, db: &mut Database) -> Result<(), EngineError> {
//!         let rows: Vec<(u32,)> = db.decode("in")?;
//!         db.replace("out", rows.into_iter().map(IntoTuple::into_tuple))?;
//!         Ok(())
//!     }
//! }
//!
//! ProgramFactory::register("doc_copy", || Box::new(Mirror));
//! let mut engine = ProgramFactory::new_instance("doc_copy").unwrap();
//! engine.database_mut().insert("in", (7u32,).into_tuple()).unwrap();
//! engine.run().unwrap();
//! assert_eq!(engine.database().relation("out").unwrap().len(), 1);
//! ```

mod database;
mod engine;
mod error;
mod factory;
mod relation;
mod schema;
pub mod value;

pub use database::Database;
pub use engine::{Engine, Evaluator};
pub use error::EngineError;
pub use factory::{EvaluatorFactory, ProgramFactory};
pub use relation::RelationStorage;
pub use schema::{Attribute, RelationDecl, RelationRole};
pub use value::{FromTuple, FromValue, IntoTuple, Tuple, Value, ValueKind};
