//! Program instances.

use std::fmt;
use std::time::Instant;

use tracing::{debug, instrument};

use crate::database::Database;
use crate::error::EngineError;
use crate::schema::{RelationDecl, RelationRole};

/// Compiled rules of one program.
///
/// `evaluate` reads the input relations of `db` and writes every derived
/// relation back into it. It runs to fixpoint before returning.
pub trait Evaluator: Send {
    /// Relation declarations, in the order they are indexed.
    fn declarations(&self) -> Vec<RelationDecl>;

    /// Evaluate to fixpoint.
    fn evaluate(&mut self, db: &mut Database) -> Result<(), EngineError>;
}

/// A running instance of a compiled program.
pub struct Engine {
    name: String,
    db: Database,
    evaluator: Box<dyn Evaluator>,
    runs: u64,
}

impl Engine {
    /// Create an instance with empty relations.
    pub fn new(name: impl Into<String>, evaluator: Box<dyn Evaluator>) -> Result<Self, EngineError> {
        let db = Database::new(evaluator.declarations())?;
        Ok(Engine {
            name: name.into(),
            db,
            evaluator,
            runs: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Number of completed runs since creation.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Run the program to fixpoint.
    #[instrument(level = "debug", skip(self), fields(program = %self.name))]
    pub fn run(&mut self) -> Result<(), EngineError> {
        let start = Instant::now();
        self.evaluator.evaluate(&mut self.db)?;
        self.runs += 1;
        debug!(elapsed = ?start.elapsed(), run = self.runs, "fixpoint reached");
        Ok(())
    }

    pub fn purge_input_relations(&mut self) -> usize {
        self.db.purge_where(RelationRole::is_input)
    }

    pub fn purge_internal_relations(&mut self) -> usize {
        self.db.purge_where(RelationRole::is_internal)
    }

    /// Clears output-only relations; input/output relations go with the inputs.
    pub fn purge_output_relations(&mut self) -> usize {
        self.db.purge_where(|role| role == RelationRole::Output)
    }

    /// Clear input, internal and output relations, in that order.
    pub fn purge(&mut self) {
        let inputs = self.purge_input_relations();
        let internals = self.purge_internal_relations();
        let outputs = self.purge_output_relations();
        debug!(program = %self.name, inputs, internals, outputs, "purged relations");
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name)
            .field("relations", &self.db.len())
            .field("runs", &self.runs)
            .finish()
    }
}
