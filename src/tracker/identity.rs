/// Integer label attached to one tracked physical object.
pub type Identity = u64;

/// Monotonic identity generator owned by a single tracker.
///
/// Every call to [`next_identity`](IdentityCounter::next_identity) returns a
/// value strictly greater than the previous one; values are never handed out
/// twice, even after the object they labelled has been pruned. Once
/// `Identity::MAX` has been handed out the counter is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCounter {
    next: Option<Identity>,
}

impl Default for IdentityCounter {
    fn default() -> Self {
        Self::starting_at(0)
    }
}

impl IdentityCounter {
    pub fn starting_at(first: Identity) -> Self {
        Self { next: Some(first) }
    }

    /// Hand out the next identity, or `None` if the counter is exhausted.
    pub fn next_identity(&mut self) -> Option<Identity> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(id)
    }

    /// The value the next call will return.
    pub fn peek(&self) -> Option<Identity> {
        self.next
    }

    /// Whether `count` more identities can be handed out.
    pub fn has_room_for(&self, count: usize) -> bool {
        if count == 0 {
            return true;
        }
        match self.next {
            Some(next) => next.checked_add(count as u64 - 1).is_some(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_monotonic() {
        let mut ids = IdentityCounter::starting_at(7);
        assert_eq!(ids.peek(), Some(7));
        assert_eq!(ids.next_identity(), Some(7));
        assert_eq!(ids.next_identity(), Some(8));
        assert_eq!(ids.peek(), Some(9));
    }

    #[test]
    fn test_counters_are_independent() {
        let mut a = IdentityCounter::default();
        let mut b = IdentityCounter::default();
        a.next_identity();
        a.next_identity();
        assert_eq!(b.next_identity(), Some(0));
    }

    #[test]
    fn test_counter_exhaustion_never_wraps() {
        let mut ids = IdentityCounter::starting_at(Identity::MAX - 1);
        assert!(ids.has_room_for(2));
        assert!(!ids.has_room_for(3));

        assert_eq!(ids.next_identity(), Some(Identity::MAX - 1));
        assert_eq!(ids.next_identity(), Some(Identity::MAX));
        assert_eq!(ids.peek(), None);
        assert!(ids.has_room_for(0));
        assert!(!ids.has_room_for(1));
        assert_eq!(ids.next_identity(), None);
    }
}
