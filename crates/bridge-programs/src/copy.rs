//! `copy`: every tuple of `in` appears in `out`.

use ascent::ascent;
use bridge_engine::{
    Database, EngineError, Evaluator, IntoTuple, RelationDecl, RelationRole, ValueKind,
};

ascent! {
    struct CopyRules;
    relation input(u32, String);
    relation output(u32, String);

    output(x, s) <-- input(x, s);
}

pub const NAME: &str = "copy";

pub struct CopyProgram;

impl Evaluator for CopyProgram {
    fn declarations(&self) -> Vec<RelationDecl> {
        vec![
            RelationDecl::new("in", RelationRole::Input)
                .column("id", ValueKind::Unsigned)
                .column("label", ValueKind::Symbol),
            RelationDecl::new("out", RelationRole::Output)
                .column("id", ValueKind::Unsigned)
                .column("label", ValueKind::Symbol),
        ]
    }

    fn evaluate(&mut self, db: &mut Database) -> Result<(), EngineError> {
        let mut rules = CopyRules {
            input: db.decode("in")?,
            ..Default::default()
        };
        rules.run();
        db.replace("out", rules.output.into_iter().map(IntoTuple::into_tuple))?;
        Ok(())
    }
}
