//! Typed set views over one side of a [`SubscriptionSet`].

use super::registry::Registry;
use super::subscription_set::{SinkRef, SourceRef, SubscriptionSet};
use crate::error::Result;
use crate::types::{ParticipantId, Removal};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// One side of a subscription set. Implemented only by [`Sinks`] and [`Sources`].
pub trait Side<T: 'static>: sealed::Sealed {
    type Member: Clone;

    fn registry(set: &SubscriptionSet<T>) -> &Registry<Self::Member>;

    fn add(set: &mut SubscriptionSet<T>, member: Self::Member) -> Result<bool>;

    fn remove(set: &mut SubscriptionSet<T>, id: ParticipantId) -> Result<Removal>;

    fn clear(set: &mut SubscriptionSet<T>) -> Result<()>;

    fn id(member: &Self::Member) -> ParticipantId;
}

/// Marker for the sink side.
pub enum Sinks {}

/// Marker for the source side.
pub enum Sources {}

impl sealed::Sealed for Sinks {}
impl sealed::Sealed for Sources {}

impl<T: 'static> Side<T> for Sinks {
    type Member = SinkRef<T>;

    fn registry(set: &SubscriptionSet<T>) -> &Registry<SinkRef<T>> {
        &set.sinks
    }

    fn add(set: &mut SubscriptionSet<T>, member: SinkRef<T>) -> Result<bool> {
        set.add_sink(member)
    }

    fn remove(set: &mut SubscriptionSet<T>, id: ParticipantId) -> Result<Removal> {
        set.remove_sink_id(id)
    }

    fn clear(set: &mut SubscriptionSet<T>) -> Result<()> {
        set.clear_sinks()
    }

    fn id(member: &SinkRef<T>) -> ParticipantId {
        ParticipantId::of(member)
    }
}

impl<T: 'static> Side<T> for Sources {
    type Member = SourceRef<T>;

    fn registry(set: &SubscriptionSet<T>) -> &Registry<SourceRef<T>> {
        &set.sources
    }

    fn add(set: &mut SubscriptionSet<T>, member: SourceRef<T>) -> Result<bool> {
        set.add_source(member)
    }

    fn remove(set: &mut SubscriptionSet<T>, id: ParticipantId) -> Result<Removal> {
        set.remove_source_id(id)
    }

    fn clear(set: &mut SubscriptionSet<T>) -> Result<()> {
        set.clear_sources()
    }

    fn id(member: &SourceRef<T>) -> ParticipantId {
        ParticipantId::of(member)
    }
}

/// Mutable set surface over one side of a subscription set.
///
/// Every mutation goes through the set's add/remove, so the subscription
/// cross-product is maintained no matter which operator is used.
pub struct View<'a, T: 'static, S: Side<T>> {
    set: &'a mut SubscriptionSet<T>,
    _side: PhantomData<S>,
}

/// View over the sinks of a subscription set.
pub type SinkView<'a, T> = View<'a, T, Sinks>;

/// View over the sources of a subscription set.
pub type SourceView<'a, T> = View<'a, T, Sources>;

impl<'a, T: 'static, S: Side<T>> View<'a, T, S> {
    pub(crate) fn new(set: &'a mut SubscriptionSet<T>) -> Self {
        Self {
            set,
            _side: PhantomData,
        }
    }

    fn registry(&self) -> &Registry<S::Member> {
        S::registry(&*self.set)
    }

    /// Get member count.
    pub fn len(&self) -> usize {
        self.registry().len()
    }

    /// Check if the side has no members.
    pub fn is_empty(&self) -> bool {
        self.registry().is_empty()
    }

    /// Check if `member` is a member.
    pub fn contains(&self, member: &S::Member) -> bool {
        self.registry().contains(S::id(member))
    }

    /// Iterate members in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &S::Member> + '_ {
        self.registry().members()
    }

    /// Copy every member into `buffer`.
    pub fn copy_to<E: Extend<S::Member>>(&self, buffer: &mut E) {
        buffer.extend(self.registry().members().cloned());
    }

    /// Collect the members into a new vector.
    pub fn to_vec(&self) -> Vec<S::Member> {
        self.registry().members().cloned().collect()
    }

    /// Returns `Ok(false)` if already a member.
    pub fn insert(&mut self, member: S::Member) -> Result<bool> {
        S::add(self.set, member)
    }

    /// Remove a member and dispose its subscriptions.
    pub fn remove(&mut self, member: &S::Member) -> Result<Removal> {
        S::remove(self.set, S::id(member))
    }

    /// Remove every member of this side.
    pub fn clear(&mut self) -> Result<()> {
        S::clear(self.set)
    }

    // --- Set algebra ---

    /// Remove every member that appears in `other`.
    pub fn except_with<I>(&mut self, other: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        for member in other {
            S::remove(self.set, S::id(member.borrow()))?.into_result()?;
        }
        Ok(())
    }

    /// Remove every member that does not appear in `other`.
    pub fn intersect_with<I>(&mut self, other: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        let keep = Self::ids_of(other);
        let victims: Vec<ParticipantId> =
            self.registry().ids().filter(|id| !keep.contains(id)).collect();
        for id in victims {
            S::remove(self.set, id)?.into_result()?;
        }
        Ok(())
    }

    /// Toggle membership of every distinct participant in `other`.
    pub fn symmetric_except_with<I>(&mut self, other: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        let mut seen = HashSet::new();
        for member in other {
            let member: &S::Member = member.borrow();
            let id = S::id(member);
            if !seen.insert(id) {
                continue;
            }
            if self.registry().contains(id) {
                S::remove(self.set, id)?.into_result()?;
            } else {
                S::add(self.set, member.clone())?;
            }
        }
        Ok(())
    }

    /// Add every participant in `other`.
    pub fn union_with<I>(&mut self, other: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        for member in other {
            S::add(self.set, member.borrow().clone())?;
        }
        Ok(())
    }

    /// Whether every member appears in `other`.
    pub fn is_subset_of<I>(&self, other: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        let other = Self::ids_of(other);
        self.registry().ids().all(|id| other.contains(&id))
    }

    /// Subset of `other` with fewer members.
    pub fn is_proper_subset_of<I>(&self, other: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        let other = Self::ids_of(other);
        self.len() < other.len() && self.registry().ids().all(|id| other.contains(&id))
    }

    /// Whether every participant in `other` is a member.
    pub fn is_superset_of<I>(&self, other: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        let registry = self.registry();
        other
            .into_iter()
            .all(|member| registry.contains(S::id(member.borrow())))
    }

    /// Superset of `other` with more members.
    pub fn is_proper_superset_of<I>(&self, other: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        let other = Self::ids_of(other);
        let registry = self.registry();
        other.len() < registry.len() && other.iter().all(|id| registry.contains(*id))
    }

    /// Whether any participant in `other` is a member.
    pub fn overlaps<I>(&self, other: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        let registry = self.registry();
        other
            .into_iter()
            .any(|member| registry.contains(S::id(member.borrow())))
    }

    /// Whether the members are exactly the participants in `other`.
    pub fn set_equals<I>(&self, other: I) -> bool
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        let other = Self::ids_of(other);
        let registry = self.registry();
        other.len() == registry.len() && other.iter().all(|id| registry.contains(*id))
    }

    fn ids_of<I>(other: I) -> HashSet<ParticipantId>
    where
        I: IntoIterator,
        I::Item: Borrow<S::Member>,
    {
        other.into_iter().map(|m| S::id(m.borrow())).collect()
    }
}
