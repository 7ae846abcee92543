pub mod router;
pub mod scorer;

pub use router::{RoutingObserver, RoutingOutcome, StagedRouter};
pub use scorer::RelevanceScorer;
