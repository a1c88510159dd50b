//! Owning program handle.

use bridge_engine::{Engine, EngineError, ProgramFactory};
use tracing::{debug, info, instrument};

use crate::error::BridgeError;
use crate::relation::Relation;
use crate::tuple::TupleView;

/// A running instance of a compiled program.
///
/// The caller owns it exclusively. Every [`Relation`] borrowed from it keeps
/// it alive and immutable for `run`, `purge` and `destroy`, so no handle can
/// outlive the instance or observe it mid-evaluation.
#[derive(Debug)]
pub struct Program {
    engine: Engine,
}

impl Program {
    /// Instantiate a registered program by name.
    ///
    /// Returns `None` if no program is registered under `name`.
    pub fn create(name: &str) -> Option<Program> {
        let Some(engine) = ProgramFactory::new_instance(name) else {
            debug!(program = name, "no such program");
            return None;
        };
        info!(program = name, relations = engine.database().len(), "program created");
        Some(Program { engine })
    }

    /// Wrap an engine instance built outside the factory.
    pub fn from_engine(engine: Engine) -> Self {
        Program { engine }
    }

    pub fn name(&self) -> &str {
        self.engine.name()
    }

    /// Look up a relation by name.
    pub fn relation(&self, name: &str) -> Option<Relation<'_>> {
        let idx = self.engine.database().position(name)?;
        Relation::at(self.engine.database(), idx)
    }

    /// All relations, in declaration order.
    pub fn relations(&self) -> impl Iterator<Item = Relation<'_>> {
        let db = self.engine.database();
        (0..db.len()).filter_map(move |idx| Relation::at(db, idx))
    }

    /// Run to fixpoint. Output relations are re-populated in place.
    #[instrument(level = "info", skip(self), fields(program = %self.name()))]
    pub fn run(&mut self) -> Result<(), BridgeError> {
        self.engine.run()?;
        Ok(())
    }

    /// Clear input, internal and output relations, in that order.
    ///
    /// The instance can be loaded and run again afterwards.
    pub fn purge(&mut self) {
        self.engine.purge();
    }

    /// Release the instance and every relation and tuple it owns.
    pub fn destroy(self) {
        drop(self);
    }

    /// Load one batch, run, read back one output relation, then purge.
    ///
    /// `load` fills the input relations, `extract` turns each output tuple
    /// into a result. The instance is purged even when a step fails, so it
    /// is always ready for the next batch.
    pub fn evaluate<T, L, E>(&mut self, load: L, output: &str, extract: E) -> Result<Vec<T>, BridgeError>
    where
        L: FnOnce(&Program) -> Result<(), BridgeError>,
        E: FnMut(TupleView<'_>) -> Result<T, BridgeError>,
    {
        let result = self.evaluate_batch(load, output, extract);
        self.purge();
        result
    }

    fn evaluate_batch<T, L, E>(&mut self, load: L, output: &str, mut extract: E) -> Result<Vec<T>, BridgeError>
    where
        L: FnOnce(&Program) -> Result<(), BridgeError>,
        E: FnMut(TupleView<'_>) -> Result<T, BridgeError>,
    {
        load(self)?;
        self.run()?;

        let relation = self
            .relation(output)
            .ok_or_else(|| EngineError::UnknownRelation(output.to_string()))?;
        let mut iter = relation.iter();
        let mut results = Vec::with_capacity(iter.remaining());
        while let Some(tuple) = iter.next_tuple() {
            results.push(extract(tuple)?);
        }
        Ok(results)
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        debug!(program = %self.engine.name(), runs = self.engine.runs(), "program destroyed");
    }
}
