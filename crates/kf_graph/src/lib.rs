//! The kf_graph crate.
//!
//! Turns validated pair tables into typed structural element graphs:
//!  - pseudoknot resolution (maximum-weight crossing-free subset),
//!  - decomposition into stems, loops, bulges, junction segments and tails,
//!  - the immutable, queryable [`StructureGraph`].
//!
//! Data flows strictly forward: `PairTable` → [`PseudoknotResolver`] →
//! [`StructureGraph`]. Every stage consumes immutable input and produces
//! a new immutable value, so independent structures can be processed in
//! parallel without synchronization.

mod builder;
mod config;
mod elements;
mod error;
mod graph;
mod resolver;

pub use config::*;
pub use elements::*;
pub use error::*;
pub use graph::*;
pub use resolver::*;
