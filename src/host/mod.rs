//! Host-facing command contract and stdio bridge for the map UI.

pub mod channel;
pub mod contract;
pub mod handler;
pub mod stdio;
