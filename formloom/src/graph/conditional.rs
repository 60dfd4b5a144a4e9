//! Conditional edges: route from a node by inspecting the state it produced.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Returns a routing key for the state; mapped through `path_map` when one is given,
/// otherwise used as the target node id directly.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

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

    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        self.path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key)
    }
}

/// How the runner picks the node after a given one.
#[derive(Clone)]
pub enum NextEntry<S> {
    Unconditional(String),
    Conditional(ConditionalRouter<S>),
}
