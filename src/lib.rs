//! NHL results ingest and scorer analytics: head-to-head records,
//! co-scoring duo/trio/quartet combinations, recency-weighted aggregation,
//! and naive goal/assist-weighted matchup predictions over a local SQLite
//! match store.

pub mod advanced;
pub mod aggregate;
pub mod attribution;
pub mod combos;
pub mod head_to_head;
pub mod http_cache;
pub mod http_client;
pub mod model;
pub mod nhl_fetch;
pub mod normalize;
pub mod predict;
pub mod schedule;
pub mod store;
pub mod weighting;
