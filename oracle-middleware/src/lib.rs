//! Decorators over [`oracle_core::OriginHandler`]: a blacklist that trips
//! on all-pairs failure, a fixed-window call quota, and a builder that
//! composes them in a fixed onion order.

mod blacklist;
mod builder;
mod quota;

pub use blacklist::BlacklistHandler;
pub use builder::HandlerBuilder;
pub use quota::QuotaHandler;
