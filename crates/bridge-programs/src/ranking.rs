//! `ranking`: best score per player and the overall leading score.

use ascent::aggregators::max;
use ascent::ascent;
use bridge_engine::{
    Database, EngineError, Evaluator, IntoTuple, RelationDecl, RelationRole, ValueKind,
};

ascent! {
    struct RankingRules;
    relation score(String, i32);
    relation player(String);
    relation best(String, i32);
    relation leader(i32);

    player(p) <-- score(p, _);
    best(p, m) <-- player(p), agg m = max(s) in score(p, s);
    leader(m) <-- agg m = max(s) in best(_, s);
}

pub const NAME: &str = "ranking";

pub struct RankingProgram;

impl Evaluator for RankingProgram {
    fn declarations(&self) -> Vec<RelationDecl> {
        vec![
            RelationDecl::new("score", RelationRole::Input)
                .column("player", ValueKind::Symbol)
                .column("points", ValueKind::Signed),
            RelationDecl::new("player", RelationRole::Internal).column("name", ValueKind::Symbol),
            RelationDecl::new("best", RelationRole::Output)
                .column("player", ValueKind::Symbol)
                .column("points", ValueKind::Signed),
            RelationDecl::new("leader", RelationRole::Output).column("points", ValueKind::Signed),
        ]
    }

    fn evaluate(&mut self, db: &mut Database) -> Result<(), EngineError> {
        let mut rules = RankingRules {
            score: db.decode("score")?,
            ..Default::default()
        };
        rules.run();
        db.replace("player", rules.player.into_iter().map(IntoTuple::into_tuple))?;
        db.replace("best", rules.best.into_iter().map(IntoTuple::into_tuple))?;
        db.replace("leader", rules.leader.into_iter().map(IntoTuple::into_tuple))?;
        Ok(())
    }
}
