//! `transitive_closure`: reachability over a directed edge list.

use ascent::ascent;
use bridge_engine::{
    Database, EngineError, Evaluator, IntoTuple, RelationDecl, RelationRole, ValueKind,
};

ascent! {
    struct ClosureRules;
    relation edge(u32, u32);
    relation node(u32);
    relation path(u32, u32);
    relation cyclic(u32);

    node(x) <-- edge(x, _);
    node(y) <-- edge(_, y);
    path(x, y) <-- edge(x, y);
    path(x, z) <-- edge(x, y), path(y, z);
    cyclic(x) <-- path(x, y), if x == y;
}

pub const NAME: &str = "transitive_closure";

pub struct ClosureProgram;

fn pair(name: &str, role: RelationRole) -> RelationDecl {
    RelationDecl::new(name, role)
        .column("from", ValueKind::Unsigned)
        .column("to", ValueKind::Unsigned)
}

impl Evaluator for ClosureProgram {
    fn declarations(&self) -> Vec<RelationDecl> {
        vec![
            pair("edge", RelationRole::Input),
            RelationDecl::new("node", RelationRole::Internal).column("id", ValueKind::Unsigned),
            pair("path", RelationRole::Output),
            RelationDecl::new("cyclic", RelationRole::Output).column("id", ValueKind::Unsigned),
        ]
    }

    fn evaluate(&mut self, db: &mut Database) -> Result<(), EngineError> {
        let mut rules = ClosureRules {
            edge: db.decode("edge")?,
            ..Default::default()
        };
        rules.run();
        db.replace("node", rules.node.into_iter().map(IntoTuple::into_tuple))?;
        db.replace("path", rules.path.into_iter().map(IntoTuple::into_tuple))?;
        db.replace("cyclic", rules.cyclic.into_iter().map(IntoTuple::into_tuple))?;
        Ok(())
    }
}
