//! Membership registry for one side of the set.

use crate::types::ParticipantId;
use std::collections::HashMap;

/// The members of one side (sinks or sources), keyed by identity.
pub struct Registry<M> {
    members: HashMap<ParticipantId, M>,
}

impl<M> Registry<M> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            members: HashMap::with_capacity(capacity),
        }
    }

    /// Check if `id` is a member.
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.members.contains_key(&id)
    }

    /// Get member count.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if there are no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate member identities.
    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.members.keys().copied()
    }

    /// Iterate members.
    pub fn members(&self) -> impl Iterator<Item = &M> + '_ {
        self.members.values()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ParticipantId, &M)> + '_ {
        self.members.iter().map(|(id, m)| (*id, m))
    }

    /// Returns false if `id` was already a member.
    pub(crate) fn insert(&mut self, id: ParticipantId, member: M) -> bool {
        if self.members.contains_key(&id) {
            return false;
        }
        self.members.insert(id, member);
        true
    }

    pub(crate) fn remove(&mut self, id: ParticipantId) -> Option<M> {
        self.members.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.members.clear();
    }
}
