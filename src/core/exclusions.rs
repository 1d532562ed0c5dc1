use std::collections::BTreeSet;
use std::fmt::Debug;

use super::error::MatchError;

/// Symmetric set of pairs that must never be matched to each other
///
/// Pairs are stored canonically as `(smaller, larger)` so that membership,
/// duplicate detection and removal do not depend on argument order.
/// Self-pairs are rejected with [`MatchError::SelfExclusion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet<T: Ord> {
    pairs: BTreeSet<(T, T)>,
}

impl<T: Ord + Clone + Debug> ExclusionSet<T> {
    pub fn new() -> Self {
        Self {
            pairs: BTreeSet::new(),
        }
    }

    /// Build a snapshot from stored pairs, in any orientation
    pub fn from_pairs<I>(pairs: I) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = (T, T)>,
    {
        let mut set = Self::new();
        for (a, b) in pairs {
            set.add(a, b)?;
        }
        Ok(set)
    }

    /// Register an exclusion; returns `false` if it was already present
    pub fn add(&mut self, a: T, b: T) -> Result<bool, MatchError> {
        let key = canonical(a, b)?;
        Ok(self.pairs.insert(key))
    }

    /// Drop an exclusion; returns `false` if it was not present
    pub fn remove(&mut self, a: &T, b: &T) -> bool {
        match canonical(a.clone(), b.clone()) {
            Ok(key) => self.pairs.remove(&key),
            Err(_) => false,
        }
    }

    #[inline]
    pub fn is_excluded(&self, a: &T, b: &T) -> bool {
        if a == b {
            return false;
        }
        let key = if a < b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        self.pairs.contains(&key)
    }

    /// Remove every pair that mentions `id`, returning how many were dropped
    pub fn remove_participant(&mut self, id: &T) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|(a, b)| a != id && b != id);
        before - self.pairs.len()
    }

    /// All pairs in canonical order, for administrative display
    pub fn list_all(&self) -> Vec<(T, T)> {
        self.pairs.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<T: Ord + Clone + Debug> Default for ExclusionSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Order a pair as `(smaller, larger)`, rejecting self-pairs
pub fn canonical<T: Ord + Debug>(a: T, b: T) -> Result<(T, T), MatchError> {
    if a == b {
        return Err(MatchError::SelfExclusion(format!("{:?}", a)));
    }
    Ok(if a < b { (a, b) } else { (b, a) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut set = ExclusionSet::new();
        assert!(set.add(1, 2).unwrap());
        assert!(!set.add(1, 2).unwrap());
        assert!(!set.add(2, 1).unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_membership_is_symmetric() {
        let mut set = ExclusionSet::new();
        set.add(5, 3).unwrap();
        assert!(set.is_excluded(&3, &5));
        assert!(set.is_excluded(&5, &3));
        assert!(!set.is_excluded(&3, &4));
        assert_eq!(set.list_all(), vec![(3, 5)]);
    }

    #[test]
    fn test_self_pair_rejected() {
        let mut set = ExclusionSet::new();
        assert_eq!(set.add(4, 4), Err(MatchError::SelfExclusion("4".into())));
        assert!(set.is_empty());
        assert!(!set.is_excluded(&4, &4));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut set = ExclusionSet::new();
        set.add(1, 2).unwrap();
        assert!(!set.remove(&1, &3));
        assert!(!set.remove(&2, &2));
        assert!(set.remove(&2, &1));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_participant_drops_all_pairs() {
        let mut set = ExclusionSet::from_pairs(vec![(1, 2), (3, 1), (2, 3)]).unwrap();
        assert_eq!(set.remove_participant(&1), 2);
        assert_eq!(set.list_all(), vec![(2, 3)]);
    }

    #[test]
    fn test_exclusions_not_transitive() {
        let set = ExclusionSet::from_pairs(vec![("a", "b"), ("b", "c")]).unwrap();
        assert!(!set.is_excluded(&"a", &"c"));
    }
}
