//! Price-graph evaluation engine.
//!
//! Builds a typed DAG of origin leaves and aggregator nodes (median,
//! indirect chain), refreshes it in batches grouped by origin (the
//! [`Feeder`]), and evaluates it bottom-up into ticks (the [`Evaluator`]).

pub mod aggregate;
pub mod cancel;
pub mod clock;
pub mod error;
pub mod evaluator;
pub mod feed;
pub mod node;
pub mod origin;
pub mod types;
pub mod walk;

pub use cancel::CancelToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::OracleError;
pub use evaluator::{evaluate, Evaluator, Tick, WarningNode};
pub use feed::{Feed, Feeder, Warnings};
pub use node::{IndirectInner, MedianInner, Node, OriginLeaf};
pub use origin::{OriginHandler, Set};
pub use types::{FetchResult, OriginPair, OriginPrice, Pair, PairPrice, Symbol};
