use indexmap::IndexSet;
use thiserror::Error;

use crate::agenda::{Agenda, AlternativeId};
use crate::permutation::{Permutation, PermutationError};

/// Three-way outcome of comparing two alternatives under a preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// The first alternative is strictly preferred to the second.
    Better,
    /// The two alternatives lie in the same indifference class.
    Indifferent,
    /// The second alternative is strictly preferred to the first.
    Worse,
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Alternative id {id} is not in the agenda")]
    OutOfDomain { id: AlternativeId },
    #[error("Indifference class {index} is empty")]
    EmptyClass { index: usize },
    #[error("Alternative '{name}' appears in more than one indifference class")]
    DuplicateAlternative { name: String },
    #[error("Alternative '{name}' is missing from the ranking")]
    MissingAlternative { name: String },
    #[error("Relation is {got} entries wide, agenda has {expected} alternatives")]
    RelationSize { expected: usize, got: usize },
    #[error("Relation is not reflexive at '{name}'")]
    NotReflexive { name: String },
    #[error("Relation is not total between '{left}' and '{right}'")]
    NotTotal { left: String, right: String },
    #[error(
        "Relation is not transitive: '{first}' covers '{second}' and '{second}' covers '{third}' \
         but '{first}' does not cover '{third}'"
    )]
    NotTransitive {
        first: String,
        second: String,
        third: String,
    },
    #[error(transparent)]
    Permutation(#[from] PermutationError),
}

/// A complete preorder (weak order) over an agenda's alternatives.
///
/// Stored canonically as an ordered partition into indifference classes,
/// **best class first**, together with a rank table mapping every
/// alternative to its class index. The canonical form makes comparison a
/// rank lookup and upper-contour queries a class-prefix walk instead of
/// relation evaluations.
///
/// Invariant: every alternative of the agenda appears in exactly one
/// non-empty class. Both constructors establish this; the value is
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceOrder {
    /// Indifference classes, most preferred first.
    classes: Vec<IndexSet<AlternativeId>>,
    /// `rank[x]` is the class index of alternative `x`.
    rank: Vec<usize>,
}

impl PreferenceOrder {
    /// Build an order from indifference classes listed best-first.
    ///
    /// The classes must partition the agenda's alternative set: no empty
    /// class, no repeats, nothing missing, nothing foreign.
    pub fn from_classes(
        agenda: &Agenda,
        classes: Vec<Vec<AlternativeId>>,
    ) -> Result<Self, OrderError> {
        let n = agenda.num_alternatives();
        let mut rank = vec![usize::MAX; n];
        let mut canonical = Vec::with_capacity(classes.len());
        for (index, class) in classes.into_iter().enumerate() {
            if class.is_empty() {
                return Err(OrderError::EmptyClass { index });
            }
            let mut set = IndexSet::with_capacity(class.len());
            for id in class {
                if id >= n {
                    return Err(OrderError::OutOfDomain { id });
                }
                if rank[id] != usize::MAX || !set.insert(id) {
                    return Err(OrderError::DuplicateAlternative {
                        name: agenda.alternative_name(id).unwrap_or_default().to_owned(),
                    });
                }
                rank[id] = index;
            }
            canonical.push(set);
        }
        if let Some(id) = rank.iter().position(|&r| r == usize::MAX) {
            return Err(OrderError::MissingAlternative {
                name: agenda.alternative_name(id).unwrap_or_default().to_owned(),
            });
        }
        Ok(Self {
            classes: canonical,
            rank,
        })
    }

    /// Build an order from a weak-preference relation matrix, where
    /// `relation[x][y]` holds iff `x` is weakly preferred to `y`.
    ///
    /// Validates reflexivity, totality, and transitivity, then
    /// canonicalizes the relation into indifference classes.
    pub fn from_relation(agenda: &Agenda, relation: &[Vec<bool>]) -> Result<Self, OrderError> {
        let n = agenda.num_alternatives();
        if relation.len() != n {
            return Err(OrderError::RelationSize {
                expected: n,
                got: relation.len(),
            });
        }
        for row in relation {
            if row.len() != n {
                return Err(OrderError::RelationSize {
                    expected: n,
                    got: row.len(),
                });
            }
        }
        let name = |id: AlternativeId| agenda.alternative_name(id).unwrap_or_default().to_owned();
        for x in 0..n {
            if !relation[x][x] {
                return Err(OrderError::NotReflexive { name: name(x) });
            }
            for y in (x + 1)..n {
                if !relation[x][y] && !relation[y][x] {
                    return Err(OrderError::NotTotal {
                        left: name(x),
                        right: name(y),
                    });
                }
            }
        }
        for x in 0..n {
            for y in 0..n {
                if !relation[x][y] {
                    continue;
                }
                for z in 0..n {
                    if relation[y][z] && !relation[x][z] {
                        return Err(OrderError::NotTransitive {
                            first: name(x),
                            second: name(y),
                            third: name(z),
                        });
                    }
                }
            }
        }

        // In a complete preorder the size of an alternative's lower set is
        // constant on indifference classes and strictly increasing with
        // preference, so sorting by it recovers the class structure.
        let score = |x: AlternativeId| (0..n).filter(|&y| relation[x][y]).count();
        let mut by_score: Vec<(usize, AlternativeId)> = (0..n).map(|x| (score(x), x)).collect();
        by_score.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut classes: Vec<IndexSet<AlternativeId>> = Vec::new();
        let mut rank = vec![0; n];
        let mut previous_score = usize::MAX;
        for (score, id) in by_score {
            if score != previous_score {
                classes.push(IndexSet::new());
                previous_score = score;
            }
            let index = classes.len() - 1;
            classes[index].insert(id);
            rank[id] = index;
        }
        Ok(Self { classes, rank })
    }

    pub fn num_alternatives(&self) -> usize {
        self.rank.len()
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// The indifference classes, most preferred first.
    pub fn weak_ranking(&self) -> &[IndexSet<AlternativeId>] {
        &self.classes
    }

    /// The most preferred indifference class. Non-empty by invariant.
    pub fn best(&self) -> &IndexSet<AlternativeId> {
        &self.classes[0]
    }

    /// Class index of `x` (0 is best).
    ///
    /// `x` must be an id of the order's agenda; ids obtained from a
    /// matching agenda or lottery support always are.
    pub fn class_index(&self, x: AlternativeId) -> usize {
        self.rank[x]
    }

    /// Checked variant of [`class_index`](Self::class_index).
    pub fn rank_of(&self, x: AlternativeId) -> Result<usize, OrderError> {
        self.rank
            .get(x)
            .copied()
            .ok_or(OrderError::OutOfDomain { id: x })
    }

    /// Compare two alternatives; total over the agenda.
    pub fn compare(&self, x: AlternativeId, y: AlternativeId) -> Result<Comparison, OrderError> {
        let rx = self.rank_of(x)?;
        let ry = self.rank_of(y)?;
        Ok(match rx.cmp(&ry) {
            std::cmp::Ordering::Less => Comparison::Better,
            std::cmp::Ordering::Equal => Comparison::Indifferent,
            std::cmp::Ordering::Greater => Comparison::Worse,
        })
    }

    /// Whether `x` is weakly preferred to `y`.
    pub fn weakly_prefers(&self, x: AlternativeId, y: AlternativeId) -> Result<bool, OrderError> {
        Ok(self.compare(x, y)? != Comparison::Worse)
    }

    /// Whether `x` is strictly preferred to `y`.
    pub fn strictly_prefers(&self, x: AlternativeId, y: AlternativeId) -> Result<bool, OrderError> {
        Ok(self.compare(x, y)? == Comparison::Better)
    }

    /// Whether `x` and `y` are indifferent.
    pub fn indifferent(&self, x: AlternativeId, y: AlternativeId) -> Result<bool, OrderError> {
        Ok(self.compare(x, y)? == Comparison::Indifferent)
    }

    /// The upper contour set of `x`: every alternative weakly preferred to
    /// `x`, i.e. the union of the classes ranked at or above `x`'s class.
    pub fn upper_contour_set(&self, x: AlternativeId) -> Result<IndexSet<AlternativeId>, OrderError> {
        let rank = self.rank_of(x)?;
        let mut set = IndexSet::new();
        for class in &self.classes[..=rank] {
            set.extend(class.iter().copied());
        }
        Ok(set)
    }

    /// Whether every indifference class is a singleton (a strict total order).
    pub fn is_strict(&self) -> bool {
        self.classes.iter().all(|class| class.len() == 1)
    }

    /// Relabel alternatives through `sigma`: the returned order ranks
    /// `sigma(x)` exactly where this order ranks `x`.
    pub fn permute(&self, sigma: &Permutation) -> Result<Self, OrderError> {
        if sigma.len() != self.rank.len() {
            return Err(PermutationError::LengthMismatch {
                expected: self.rank.len(),
                got: sigma.len(),
            }
            .into());
        }
        let classes: Vec<IndexSet<AlternativeId>> = self
            .classes
            .iter()
            .map(|class| class.iter().map(|&x| sigma.apply(x)).collect())
            .collect();
        let mut rank = vec![0; self.rank.len()];
        for (index, class) in classes.iter().enumerate() {
            for &x in class {
                rank[x] = index;
            }
        }
        Ok(Self { classes, rank })
    }

    /// Render the ranking with agenda names, e.g. `c > a ~ b`.
    pub fn render(&self, agenda: &Agenda) -> String {
        self.classes
            .iter()
            .map(|class| {
                class
                    .iter()
                    .map(|&x| agenda.alternative_name(x).unwrap_or("?"))
                    .collect::<Vec<_>>()
                    .join(" ~ ")
            })
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Agenda {
        Agenda::new(["1", "2"], ["a", "b", "c"]).unwrap()
    }

    #[test]
    fn classes_must_partition_the_agenda() {
        let agenda = abc();
        assert!(matches!(
            PreferenceOrder::from_classes(&agenda, vec![vec![0], vec![], vec![1, 2]]),
            Err(OrderError::EmptyClass { index: 1 })
        ));
        assert!(matches!(
            PreferenceOrder::from_classes(&agenda, vec![vec![0, 1], vec![1, 2]]),
            Err(OrderError::DuplicateAlternative { .. })
        ));
        assert!(matches!(
            PreferenceOrder::from_classes(&agenda, vec![vec![0], vec![2]]),
            Err(OrderError::MissingAlternative { .. })
        ));
        assert!(matches!(
            PreferenceOrder::from_classes(&agenda, vec![vec![0, 1, 2, 3]]),
            Err(OrderError::OutOfDomain { id: 3 })
        ));
    }

    #[test]
    fn compare_follows_class_ranks() {
        let agenda = abc();
        // c best, a and b tied below.
        let order = PreferenceOrder::from_classes(&agenda, vec![vec![2], vec![0, 1]]).unwrap();
        assert_eq!(order.compare(2, 0).unwrap(), Comparison::Better);
        assert_eq!(order.compare(0, 1).unwrap(), Comparison::Indifferent);
        assert_eq!(order.compare(0, 2).unwrap(), Comparison::Worse);
        assert!(order.weakly_prefers(0, 1).unwrap());
        assert!(!order.strictly_prefers(0, 1).unwrap());
        assert!(matches!(
            order.compare(0, 9),
            Err(OrderError::OutOfDomain { id: 9 })
        ));
    }

    #[test]
    fn upper_contour_set_is_a_class_prefix() {
        let agenda = abc();
        let order = PreferenceOrder::from_classes(&agenda, vec![vec![2], vec![1], vec![0]]).unwrap();
        let ucs_b: Vec<_> = order.upper_contour_set(1).unwrap().into_iter().collect();
        assert_eq!(ucs_b, vec![2, 1]);
        let ucs_c: Vec<_> = order.upper_contour_set(2).unwrap().into_iter().collect();
        assert_eq!(ucs_c, vec![2]);
        assert_eq!(order.upper_contour_set(0).unwrap().len(), 3);
    }

    #[test]
    fn upper_contour_set_matches_negated_strict_preference() {
        let agenda = abc();
        let order = PreferenceOrder::from_classes(&agenda, vec![vec![1, 2], vec![0]]).unwrap();
        for x in agenda.alternatives() {
            let ucs = order.upper_contour_set(x).unwrap();
            for y in agenda.alternatives() {
                let strictly_below = order.strictly_prefers(x, y).unwrap();
                assert_eq!(ucs.contains(&y), !strictly_below);
            }
        }
    }

    #[test]
    fn relation_constructor_validates_axioms() {
        let agenda = abc();
        let t = true;
        let f = false;

        let irreflexive = vec![vec![f, t, t], vec![f, t, t], vec![f, f, t]];
        assert!(matches!(
            PreferenceOrder::from_relation(&agenda, &irreflexive),
            Err(OrderError::NotReflexive { .. })
        ));

        let partial = vec![vec![t, f, f], vec![f, t, f], vec![f, f, t]];
        assert!(matches!(
            PreferenceOrder::from_relation(&agenda, &partial),
            Err(OrderError::NotTotal { .. })
        ));

        // b >= a, a >= c, but not b >= c.
        let intransitive = vec![vec![t, f, t], vec![t, t, f], vec![f, t, t]];
        assert!(matches!(
            PreferenceOrder::from_relation(&agenda, &intransitive),
            Err(OrderError::NotTransitive { .. })
        ));

        let wrong_size = vec![vec![t, t], vec![t, t]];
        assert!(matches!(
            PreferenceOrder::from_relation(&agenda, &wrong_size),
            Err(OrderError::RelationSize { expected: 3, .. })
        ));
    }

    #[test]
    fn relation_constructor_recovers_classes() {
        let agenda = abc();
        // c strictly best, a and b indifferent below it.
        let order = PreferenceOrder::from_classes(&agenda, vec![vec![2], vec![0, 1]]).unwrap();
        let n = agenda.num_alternatives();
        let relation: Vec<Vec<bool>> = (0..n)
            .map(|x| (0..n).map(|y| order.weakly_prefers(x, y).unwrap()).collect())
            .collect();
        let recovered = PreferenceOrder::from_relation(&agenda, &relation).unwrap();
        assert_eq!(recovered, order);
    }

    #[test]
    fn permute_relabels_and_round_trips() {
        let agenda = abc();
        let order = PreferenceOrder::from_classes(&agenda, vec![vec![2], vec![1], vec![0]]).unwrap();
        let sigma = Permutation::new(vec![1, 2, 0]).unwrap();
        let permuted = order.permute(&sigma).unwrap();
        // sigma(2) = 0 must now occupy the rank 2 had before.
        assert_eq!(permuted.class_index(0), order.class_index(2));
        assert_eq!(permuted.class_index(2), order.class_index(1));
        assert_eq!(permuted.permute(&sigma.inverse()).unwrap(), order);
    }

    #[test]
    fn strictness_means_singleton_classes() {
        let agenda = abc();
        let strict =
            PreferenceOrder::from_classes(&agenda, vec![vec![2], vec![1], vec![0]]).unwrap();
        assert!(strict.is_strict());
        let tied = PreferenceOrder::from_classes(&agenda, vec![vec![2], vec![0, 1]]).unwrap();
        assert!(!tied.is_strict());
    }

    #[test]
    fn render_uses_agenda_names() {
        let agenda = abc();
        let order = PreferenceOrder::from_classes(&agenda, vec![vec![2], vec![0, 1]]).unwrap();
        assert_eq!(order.render(&agenda), "c > a ~ b");
    }
}
