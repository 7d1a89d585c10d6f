//! Reply gate: at most one in-flight generation per scope.
//!
//! Under [`ReplyPolicy::Global`] the whole process shares one scope, so a
//! mention arriving anywhere while a reply is being generated is dropped.
//! Under [`ReplyPolicy::PerContext`] each context has its own scope.

use dashmap::DashSet;

use neighbot_types::config::ReplyPolicy;

const GLOBAL_SCOPE: &str = "*";

/// Tracks which scopes currently have a generation in flight.
#[derive(Debug)]
pub struct ReplyGate {
    policy: ReplyPolicy,
    busy: DashSet<String>,
}

impl ReplyGate {
    pub fn new(policy: ReplyPolicy) -> Self {
        Self {
            policy,
            busy: DashSet::new(),
        }
    }

    pub fn policy(&self) -> ReplyPolicy {
        self.policy
    }

    fn scope(&self, context_id: &str) -> String {
        match self.policy {
            ReplyPolicy::Global => GLOBAL_SCOPE.to_string(),
            ReplyPolicy::PerContext => context_id.to_string(),
        }
    }

    /// Claim the scope for `context_id`, or `None` if it is busy.
    ///
    /// The scope is released when the returned permit is dropped.
    pub fn try_acquire(&self, context_id: &str) -> Option<ReplyPermit<'_>> {
        let scope = self.scope(context_id);
        if self.busy.insert(scope.clone()) {
            Some(ReplyPermit { gate: self, scope })
        } else {
            None
        }
    }

    /// Whether a generation is in flight for `context_id`'s scope.
    pub fn is_busy(&self, context_id: &str) -> bool {
        self.busy.contains(&self.scope(context_id))
    }
}

impl Default for ReplyGate {
    fn default() -> Self {
        Self::new(ReplyPolicy::default())
    }
}

/// Held for the duration of one generation.
#[derive(Debug)]
pub struct ReplyPermit<'a> {
    gate: &'a ReplyGate,
    scope: String,
}

impl Drop for ReplyPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.remove(&self.scope);
    }
}
