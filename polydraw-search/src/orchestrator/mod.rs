//! Search orchestrator: concurrent lookups, staleness guard, merge.
//!
//! This module fans a query out to both providers concurrently, discards
//! answers that were superseded by a newer query, and interleaves the two
//! ranked lists with coordinate deduplication.

pub mod merge;
pub mod search;
pub mod sequencer;
