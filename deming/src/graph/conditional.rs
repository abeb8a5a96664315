//! Conditional edges: route to the next node based on state.
//!
//! A source node carries a routing function that maps the merged state to a key; the key is
//! the next node id, or is looked up in an optional path map.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Router function: `(state) -> key`.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Routing function plus optional path map.
///
/// With a path map, `next = path_map[key]` when present, otherwise the key itself.
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> ConditionalRouter<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(path: ConditionalRouterFn<S>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    /// Resolves the next node id (or END) from the current state.
    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        self.path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key)
    }

    /// Targets reachable through the path map, sorted. Empty without a path map.
    pub fn targets(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .path_map
            .as_ref()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        out.sort();
        out
    }
}

/// How the compiled graph picks the node after a given node.
#[derive(Clone)]
pub enum NextEntry<S> {
    /// Fixed next node (or END).
    Unconditional(String),
    /// Decided by the router from the state the node returned.
    Conditional(ConditionalRouter<S>),
}
