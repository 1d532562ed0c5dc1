use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// One giver → receiver pair of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing<T> {
    pub giver: T,
    pub receiver: T,
}

/// A complete round: one receiver per giver, ordered like the input participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment<T> {
    pairs: Vec<Pairing<T>>,
}

/// Reasons an assignment fails [`Assignment::verify`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentViolation {
    #[error("Assignment covers {actual} givers, expected {expected}")]
    WrongSize { expected: usize, actual: usize },

    #[error("Unknown participant in assignment: {0}")]
    UnknownParticipant(String),

    #[error("Participant gives more than once: {0}")]
    RepeatedGiver(String),

    #[error("Participant receives more than once: {0}")]
    RepeatedReceiver(String),

    #[error("Participant assigned to themselves: {0}")]
    FixedPoint(String),

    #[error("Excluded pair matched: {giver} -> {receiver}")]
    ExcludedPair { giver: String, receiver: String },
}

impl<T> Assignment<T> {
    pub(crate) fn from_pairs(pairs: Vec<Pairing<T>>) -> Self {
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pairing<T>> {
        self.pairs.iter()
    }

    pub fn into_pairs(self) -> Vec<Pairing<T>> {
        self.pairs
    }
}

impl<T: PartialEq> Assignment<T> {
    pub fn receiver_of(&self, giver: &T) -> Option<&T> {
        self.pairs
            .iter()
            .find(|p| &p.giver == giver)
            .map(|p| &p.receiver)
    }

    pub fn giver_of(&self, receiver: &T) -> Option<&T> {
        self.pairs
            .iter()
            .find(|p| &p.receiver == receiver)
            .map(|p| &p.giver)
    }
}

impl<T: Eq + Hash + Debug> Assignment<T> {
    /// Re-check that this is a fixed-point-free bijection over `participants`
    /// avoiding every excluded pair
    pub fn verify<F>(&self, participants: &[T], excluded: F) -> Result<(), AssignmentViolation>
    where
        F: Fn(&T, &T) -> bool,
    {
        if self.pairs.len() != participants.len() {
            return Err(AssignmentViolation::WrongSize {
                expected: participants.len(),
                actual: self.pairs.len(),
            });
        }

        let known: HashSet<&T> = participants.iter().collect();
        let mut givers = HashSet::with_capacity(self.pairs.len());
        let mut receivers = HashSet::with_capacity(self.pairs.len());

        for pair in &self.pairs {
            for id in [&pair.giver, &pair.receiver] {
                if !known.contains(id) {
                    return Err(AssignmentViolation::UnknownParticipant(format!("{:?}", id)));
                }
            }
            if !givers.insert(&pair.giver) {
                return Err(AssignmentViolation::RepeatedGiver(format!("{:?}", pair.giver)));
            }
            if !receivers.insert(&pair.receiver) {
                return Err(AssignmentViolation::RepeatedReceiver(format!("{:?}", pair.receiver)));
            }
            if pair.giver == pair.receiver {
                return Err(AssignmentViolation::FixedPoint(format!("{:?}", pair.giver)));
            }
            if excluded(&pair.giver, &pair.receiver) {
                return Err(AssignmentViolation::ExcludedPair {
                    giver: format!("{:?}", pair.giver),
                    receiver: format!("{:?}", pair.receiver),
                });
            }
        }

        Ok(())
    }
}

impl<'a, T> IntoIterator for &'a Assignment<T> {
    type Item = &'a Pairing<T>;
    type IntoIter = std::slice::Iter<'a, Pairing<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
