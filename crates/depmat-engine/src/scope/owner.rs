//! Scope owners: the identity a work unit is registered under.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_OWNER: ScopeOwner = ScopeOwner::new();
}

#[derive(Debug)]
struct OwnerToken {
    id: u64,
}

/// Handle identifying whoever drives a unit of work.
///
/// The registry only holds a weak reference: once every clone of an owner
/// is dropped, its open unit counts as abandoned.
#[derive(Debug, Clone)]
pub struct ScopeOwner {
    token: Arc<OwnerToken>,
}

impl ScopeOwner {
    pub fn new() -> Self {
        Self {
            token: Arc::new(OwnerToken {
                id: NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed),
            }),
        }
    }

    /// The owner bound to the calling thread. It dies with the thread.
    pub fn current_thread() -> Self {
        THREAD_OWNER
            .try_with(Clone::clone)
            .unwrap_or_else(|_| Self::new())
    }

    pub fn id(&self) -> u64 {
        self.token.id
    }

    pub(crate) fn downgrade(&self) -> OwnerRef {
        OwnerRef(Arc::downgrade(&self.token))
    }
}

impl Default for ScopeOwner {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ScopeOwner {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ScopeOwner {}

/// Weak reference held by the registry.
#[derive(Debug, Clone)]
pub(crate) struct OwnerRef(Weak<OwnerToken>);

impl OwnerRef {
    pub(crate) fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}
