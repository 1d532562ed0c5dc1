use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use crate::core::assignment::{Assignment, Pairing};
use crate::core::error::MatchError;

/// Default number of uniform shuffles tried once a round is known to be feasible
pub const DEFAULT_SHUFFLE_ATTEMPTS: usize = 1000;

/// Tuning knobs for the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherSettings {
    /// Uniform shuffle-and-check attempts made after feasibility is proven.
    /// Zero returns the augmenting-path matching directly.
    pub shuffle_attempts: usize,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            shuffle_attempts: DEFAULT_SHUFFLE_ATTEMPTS,
        }
    }
}

/// Compatibility graph over participant indices
///
/// Edge `(g, r)` exists iff `g != r` and the pair is not excluded.
struct CompatibilityGraph {
    n: usize,
    allowed: Vec<bool>,
    candidates: Vec<Vec<usize>>,
}

impl CompatibilityGraph {
    fn build<T, F>(participants: &[T], excluded: &F) -> Self
    where
        F: Fn(&T, &T) -> bool,
    {
        let n = participants.len();
        let mut allowed = vec![false; n * n];
        let mut candidates = vec![Vec::new(); n];

        for g in 0..n {
            for r in 0..n {
                if g != r && !excluded(&participants[g], &participants[r]) {
                    allowed[g * n + r] = true;
                    candidates[g].push(r);
                }
            }
        }

        Self {
            n,
            allowed,
            candidates,
        }
    }

    #[inline]
    fn allows(&self, giver: usize, receiver: usize) -> bool {
        self.allowed[giver * self.n + receiver]
    }

    /// Kuhn's algorithm visiting givers in `order`
    ///
    /// Returns `owner[r] = Some(g)` for every matched receiver and the number
    /// of matched givers. A giver with no augmenting path now never gains one
    /// later, so a single pass yields a maximum matching.
    fn max_matching(&self, order: &[usize]) -> (Vec<Option<usize>>, usize) {
        let mut owner = vec![None; self.n];
        let mut visited = vec![false; self.n];
        let mut matched = 0;

        for &giver in order {
            visited.iter_mut().for_each(|v| *v = false);
            if self.augment(giver, &mut visited, &mut owner) {
                matched += 1;
            }
        }

        (owner, matched)
    }

    fn augment(&self, giver: usize, visited: &mut [bool], owner: &mut [Option<usize>]) -> bool {
        for &receiver in &self.candidates[giver] {
            if visited[receiver] {
                continue;
            }
            visited[receiver] = true;

            let free = match owner[receiver] {
                None => true,
                Some(current) => self.augment(current, visited, owner),
            };

            if free {
                owner[receiver] = Some(giver);
                return true;
            }
        }
        false
    }

    fn shuffle_candidates<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for list in &mut self.candidates {
            list.shuffle(rng);
        }
    }
}

/// Secret Santa matcher
///
/// Draws a giver → receiver bijection with no fixed point that avoids every
/// excluded pair, or proves that none exists.
///
/// # Algorithm
/// 1. Input validation (at least 2 distinct participants)
/// 2. Compatibility graph construction
/// 3. Randomized augmenting-path search (Kuhn) decides feasibility
/// 4. Optional uniform shuffle attempts for a less biased draw
///
/// The matcher holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    settings: MatcherSettings,
}

impl Matcher {
    pub fn new(settings: MatcherSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> MatcherSettings {
        self.settings
    }

    /// Draw an assignment using the thread-local RNG
    pub fn assign<T, F>(&self, participants: &[T], excluded: F) -> Result<Assignment<T>, MatchError>
    where
        T: Clone + Eq + Hash + Debug,
        F: Fn(&T, &T) -> bool,
    {
        let mut rng = rand::thread_rng();
        self.assign_with_rng(participants, excluded, &mut rng)
    }

    /// Draw an assignment with a caller-supplied RNG
    ///
    /// # Returns
    /// The assignment in input order, `MatchError::Infeasible` when the
    /// compatibility graph has no perfect matching, or an input error.
    pub fn assign_with_rng<T, F, R>(
        &self,
        participants: &[T],
        excluded: F,
        rng: &mut R,
    ) -> Result<Assignment<T>, MatchError>
    where
        T: Clone + Eq + Hash + Debug,
        F: Fn(&T, &T) -> bool,
        R: Rng + ?Sized,
    {
        validate_participants(participants)?;

        let n = participants.len();
        let mut graph = CompatibilityGraph::build(participants, &excluded);
        graph.shuffle_candidates(rng);

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let (owner, matched) = graph.max_matching(&order);
        if matched < n {
            tracing::debug!("No perfect matching: {} of {} givers matched", matched, n);
            return Err(MatchError::Infeasible {
                matched,
                required: n,
            });
        }

        let receivers = match self.try_shuffles(&graph, rng) {
            Some(receivers) => receivers,
            None => invert(&owner),
        };

        let pairs = receivers
            .iter()
            .enumerate()
            .map(|(giver, &receiver)| Pairing {
                giver: participants[giver].clone(),
                receiver: participants[receiver].clone(),
            })
            .collect();

        Ok(Assignment::from_pairs(pairs))
    }

    /// Uniform shuffle-and-check; `receivers[g]` is the receiver index of giver `g`
    fn try_shuffles<R: Rng + ?Sized>(
        &self,
        graph: &CompatibilityGraph,
        rng: &mut R,
    ) -> Option<Vec<usize>> {
        let mut receivers: Vec<usize> = (0..graph.n).collect();

        for attempt in 0..self.settings.shuffle_attempts {
            receivers.shuffle(rng);
            if receivers
                .iter()
                .enumerate()
                .all(|(giver, &receiver)| graph.allows(giver, receiver))
            {
                tracing::trace!("Shuffle accepted after {} attempts", attempt + 1);
                return Some(receivers);
            }
        }

        None
    }
}

/// Size of a maximum matching in the compatibility graph
///
/// Equal to the participant count exactly when a valid assignment exists.
pub fn max_matching_size<T, F>(participants: &[T], excluded: F) -> usize
where
    F: Fn(&T, &T) -> bool,
{
    let graph = CompatibilityGraph::build(participants, &excluded);
    let order: Vec<usize> = (0..participants.len()).collect();
    graph.max_matching(&order).1
}

fn validate_participants<T: Eq + Hash + Debug>(participants: &[T]) -> Result<(), MatchError> {
    if participants.len() < 2 {
        return Err(MatchError::TooFewParticipants {
            count: participants.len(),
        });
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if !seen.insert(id) {
            return Err(MatchError::DuplicateParticipant(format!("{:?}", id)));
        }
    }

    Ok(())
}

fn invert(owner: &[Option<usize>]) -> Vec<usize> {
    let mut receivers = vec![0; owner.len()];
    for (receiver, giver) in owner.iter().enumerate() {
        if let Some(giver) = giver {
            receivers[*giver] = receiver;
        }
    }
    receivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::exclusions::ExclusionSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn augmenting_only() -> Matcher {
        Matcher::new(MatcherSettings { shuffle_attempts: 0 })
    }

    #[test]
    fn test_three_without_exclusions() {
        let matcher = Matcher::default();
        let people = ["A", "B", "C"];
        let result = matcher.assign(&people, |_, _| false).unwrap();

        assert_eq!(result.len(), 3);
        assert!(result.verify(&people, |_, _| false).is_ok());
        // Only the two 3-cycles are derangements of three
        let first = *result.receiver_of(&"A").unwrap();
        let expected_c = if first == "B" { "A" } else { "B" };
        assert_eq!(*result.receiver_of(&"C").unwrap(), expected_c);
    }

    #[test]
    fn test_excluded_pair_of_two_is_infeasible() {
        let mut exclusions = ExclusionSet::new();
        exclusions.add("A", "B").unwrap();

        let result = Matcher::default().assign(&["A", "B"], |a, b| exclusions.is_excluded(a, b));
        assert_eq!(result, Err(MatchError::Infeasible { matched: 0, required: 2 }));
    }

    #[test]
    fn test_four_with_one_couple() {
        let mut exclusions = ExclusionSet::new();
        exclusions.add("A", "B").unwrap();
        let people = ["A", "B", "C", "D"];

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = augmenting_only()
                .assign_with_rng(&people, |a, b| exclusions.is_excluded(a, b), &mut rng)
                .unwrap();
            assert!(result.verify(&people, |a, b| exclusions.is_excluded(a, b)).is_ok());
            assert_ne!(result.receiver_of(&"A"), Some(&"B"));
            assert_ne!(result.receiver_of(&"B"), Some(&"A"));
        }
    }

    #[test]
    fn test_too_few_participants() {
        let matcher = Matcher::default();
        assert_eq!(
            matcher.assign(&[1], |_, _| false),
            Err(MatchError::TooFewParticipants { count: 1 })
        );
        assert_eq!(
            matcher.assign::<i32, _>(&[], |_, _| false),
            Err(MatchError::TooFewParticipants { count: 0 })
        );
    }

    #[test]
    fn test_duplicate_participant() {
        assert_eq!(
            Matcher::default().assign(&[1, 2, 1], |_, _| false),
            Err(MatchError::DuplicateParticipant("1".into()))
        );
    }

    #[test]
    fn test_star_exclusion_is_infeasible() {
        // Participant 0 is excluded from everyone: nobody can give to them
        let people: Vec<u32> = (0..6).collect();
        let excluded = |a: &u32, b: &u32| *a == 0 || *b == 0;

        let result = augmenting_only().assign(&people, excluded);
        assert_eq!(result, Err(MatchError::Infeasible { matched: 5, required: 6 }));
        assert_eq!(max_matching_size(&people, excluded), 5);
    }

    #[test]
    fn test_hall_violation_detected() {
        // 1, 2, 3 may only give to 4 or 5: three givers, two receivers
        let people = [1, 2, 3, 4, 5];
        let group = |x: &i32| *x <= 3;
        let excluded = |a: &i32, b: &i32| group(a) && group(b);

        assert!(matches!(
            Matcher::default().assign(&people, excluded),
            Err(MatchError::Infeasible { .. })
        ));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let people: Vec<u32> = (0..12).collect();
        let matcher = Matcher::default();

        let a = matcher
            .assign_with_rng(&people, |_, _| false, &mut StdRng::seed_from_u64(7))
            .unwrap();
        let b = matcher
            .assign_with_rng(&people, |_, _| false, &mut StdRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_augmenting_search_varies_between_calls() {
        let people: Vec<u32> = (0..8).collect();
        let matcher = augmenting_only();
        let mut rng = StdRng::seed_from_u64(42);

        let draws: HashSet<Vec<u32>> = (0..20)
            .map(|_| {
                let assignment = matcher.assign_with_rng(&people, |_, _| false, &mut rng).unwrap();
                assignment.iter().map(|p| p.receiver).collect()
            })
            .collect();
        assert!(draws.len() > 1);
    }

    #[test]
    fn test_dense_but_feasible_found_without_shuffles() {
        // Each participant may only give to the next one around the circle
        let n = 10u32;
        let people: Vec<u32> = (0..n).collect();
        let excluded = |a: &u32, b: &u32| (a + 1) % n != *b && (b + 1) % n != *a;

        let result = augmenting_only().assign(&people, excluded).unwrap();
        assert!(result.verify(&people, excluded).is_ok());
    }
}
