//! Agents built on the state graph.
//!
//! - [`pdca`]: Plan / Do / Check / Act loop with a web search tool.

pub mod pdca;
