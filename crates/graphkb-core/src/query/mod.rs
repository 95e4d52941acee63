//! Query plans and their compilation into graph-query text.

mod builder;
mod plan;

pub use builder::GraphQueryBuilder;
pub use plan::{
    BindingKind, DataModelBinding, QueryPlanPatterns, QueryType, TriplePattern, TYPE_MARKER,
};
