//! # Control groups: bulk `off` / `flush` over tagged registrations.
//!
//! A [`ControlGroup`] is an identity token passed in
//! [`ListenerOptions::control`](crate::ListenerOptions::control). Every emitter
//! that accepts a registration tagged with the group attaches a member to it;
//! the group itself owns that list, so a handle reused across emitters only
//! ever reaches registrations of the emitters it was actually given to.
//!
//! ```text
//! on(ev, l, {control: g}) ──► emitter ──► g.attach(member{emitter, registration})
//!
//! g.off()   ──► for live member: emitter removes that registration
//! g.flush() ──► for live member: emitter flushes that registration's bucket
//! ```
//!
//! Members hold both the emitter and the registration weakly. A member whose
//! registration was removed (`off`, `off_all`, `cleanup`, a fired one-shot) or
//! whose emitter was dropped is dead and is pruned on the next group access.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Type-erased registration recorded against a group.
pub(crate) trait GroupMember: Send + Sync {
    /// Removes the recorded registration from its emitter.
    fn off(&self) -> bool;
    /// Flushes the recorded registration's bucket, if any.
    fn flush(&self) -> bool;
    /// False once the registration or its emitter is gone.
    fn is_live(&self) -> bool;
}

#[derive(Default)]
struct GroupInner {
    members: Mutex<Vec<Arc<dyn GroupMember>>>,
}

/// Opaque handle for bulk operations on tagged registrations.
///
/// Equality is identity: clones compare equal, separately created groups do not.
#[derive(Clone, Default)]
pub struct ControlGroup {
    inner: Arc<GroupInner>,
}

impl ControlGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every registration tagged with this group.
    ///
    /// Returns `true` if at least one registration was removed.
    pub fn off(&self) -> bool {
        self.members()
            .iter()
            .fold(false, |removed, m| m.off() | removed)
    }

    /// Flushes every buffered registration tagged with this group.
    ///
    /// Returns `true` if at least one bucket was delivered.
    pub fn flush(&self) -> bool {
        self.members()
            .iter()
            .fold(false, |flushed, m| m.flush() | flushed)
    }

    /// Number of live registrations tagged with this group.
    pub fn len(&self) -> usize {
        let mut members = self.inner.members.lock();
        members.retain(|m| m.is_live());
        members.len()
    }

    /// True if no live registration is tagged with this group.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn attach(&self, member: Arc<dyn GroupMember>) {
        let mut members = self.inner.members.lock();
        members.retain(|m| m.is_live());
        members.push(member);
    }

    // Listeners invoked by `flush` may register with this group again; never
    // iterate while holding the lock.
    fn members(&self) -> Vec<Arc<dyn GroupMember>> {
        let mut members = self.inner.members.lock();
        members.retain(|m| m.is_live());
        members.clone()
    }
}

impl PartialEq for ControlGroup {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ControlGroup {}

impl fmt::Debug for ControlGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlGroup")
            .field("id", &Arc::as_ptr(&self.inner))
            .field("members", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Counting {
        offs: AtomicUsize,
        flushes: AtomicUsize,
        live: AtomicBool,
        result: bool,
    }

    impl GroupMember for Counting {
        fn off(&self) -> bool {
            self.offs.fetch_add(1, Ordering::SeqCst);
            self.result
        }

        fn flush(&self) -> bool {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            self.result
        }

        fn is_live(&self) -> bool {
            self.live.load(Ordering::SeqCst)
        }
    }

    fn member(result: bool) -> Arc<Counting> {
        Arc::new(Counting {
            offs: AtomicUsize::new(0),
            flushes: AtomicUsize::new(0),
            live: AtomicBool::new(true),
            result,
        })
    }

    #[test]
    fn test_identity_equality() {
        let a = ControlGroup::new();
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, ControlGroup::new());
    }

    #[test]
    fn test_bulk_ops_visit_every_member() {
        let group = ControlGroup::new();
        let hit = member(true);
        let miss = member(false);
        group.attach(hit.clone());
        group.attach(miss.clone());

        assert!(group.off());
        assert!(group.flush());
        assert_eq!(hit.offs.load(Ordering::SeqCst), 1);
        assert_eq!(miss.offs.load(Ordering::SeqCst), 1);
        assert_eq!(miss.flushes.load(Ordering::SeqCst), 1);
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_dead_members_are_pruned_and_skipped() {
        let group = ControlGroup::new();
        let gone = member(true);
        let kept = member(true);
        group.attach(gone.clone());
        group.attach(kept.clone());

        gone.live.store(false, Ordering::SeqCst);
        assert_eq!(group.len(), 1);
        assert!(group.off());
        assert_eq!(gone.offs.load(Ordering::SeqCst), 0);
        assert_eq!(kept.offs.load(Ordering::SeqCst), 1);
        assert_eq!(Arc::strong_count(&gone), 1);
    }

    #[test]
    fn test_empty_group_reports_nothing_done() {
        let group = ControlGroup::new();
        assert!(group.is_empty());
        assert!(!group.off());
        assert!(!group.flush());
    }
}
