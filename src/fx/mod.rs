//! Foreign exchange: provider comparison and local conversion

pub mod aggregator;
pub mod convert;
pub mod providers;

pub use aggregator::{rank_quotes, validate_pair, FxAggregator, QuoteSource};
pub use convert::{build_table, convert, FxTable};
pub use providers::FxProvider;
