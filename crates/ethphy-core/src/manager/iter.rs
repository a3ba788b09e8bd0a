//! Iteration over the current membership

use std::iter::FusedIterator;

use crate::types::IntfId;

/// Iterator over physical interfaces
///
/// Membership is copied when the iterator is created; interfaces created or
/// deleted afterwards do not affect an iterator already handed out. To see
/// later changes, ask the manager for a new one. An interface yielded here
/// may have been deleted by the time it is queried, in which case the query
/// reports `NotFound`.
#[derive(Debug, Clone)]
pub struct EthPhyIntfIter {
    inner: std::vec::IntoIter<IntfId>,
}

impl EthPhyIntfIter {
    pub(crate) fn new(snapshot: Vec<IntfId>) -> Self {
        Self {
            inner: snapshot.into_iter(),
        }
    }
}

impl Iterator for EthPhyIntfIter {
    type Item = IntfId;

    fn next(&mut self) -> Option<IntfId> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for EthPhyIntfIter {}

impl FusedIterator for EthPhyIntfIter {}
