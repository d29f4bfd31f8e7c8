use indexmap::{IndexMap, IndexSet};
use num::rational::BigRational;
use num::traits::{One, Zero};
use thiserror::Error;

use crate::agenda::{Agenda, AlternativeId};
use crate::permutation::{Permutation, PermutationError};

#[derive(Debug, Error)]
pub enum LotteryError {
    #[error("Alternative id {id} is not in the agenda")]
    OutOfDomain { id: AlternativeId },
    #[error("Alternative id {id} has negative probability {probability}")]
    NegativeProbability {
        id: AlternativeId,
        probability: BigRational,
    },
    #[error("Probabilities sum to {total}, expected exactly 1")]
    MassNotOne { total: BigRational },
    #[error("A lottery requires non-empty support")]
    EmptySupport,
    #[error(transparent)]
    Permutation(#[from] PermutationError),
}

/// A probability distribution over an agenda's alternatives.
///
/// Probabilities are exact rationals and must sum to exactly 1; there is no
/// floating tolerance anywhere in the crate. Only strictly positive entries
/// are stored, so the representation is canonical: two lotteries are equal
/// iff they assign the same probability to every alternative.
///
/// Immutable value type; every transformation returns a new lottery.
#[derive(Debug, Clone)]
pub struct Lottery {
    /// Support map; entries are strictly positive and sum to one.
    probs: IndexMap<AlternativeId, BigRational>,
}

impl Lottery {
    /// Build a lottery from `(alternative, probability)` entries.
    ///
    /// Entries for the same alternative are summed. Fails on negative
    /// entries, foreign alternatives, or total mass different from 1.
    pub fn new<I>(agenda: &Agenda, entries: I) -> Result<Self, LotteryError>
    where
        I: IntoIterator<Item = (AlternativeId, BigRational)>,
    {
        let mut probs: IndexMap<AlternativeId, BigRational> = IndexMap::new();
        for (id, probability) in entries {
            if !agenda.contains_alternative(id) {
                return Err(LotteryError::OutOfDomain { id });
            }
            if probability < BigRational::zero() {
                return Err(LotteryError::NegativeProbability { id, probability });
            }
            *probs.entry(id).or_insert_with(BigRational::zero) += probability;
        }
        let total: BigRational = probs.values().cloned().sum();
        if total != BigRational::one() {
            return Err(LotteryError::MassNotOne { total });
        }
        probs.retain(|_, p| !p.is_zero());
        Ok(Self { probs })
    }

    /// The lottery placing probability 1 on `x`: the canonical embedding of
    /// a single alternative.
    pub fn point_mass(agenda: &Agenda, x: AlternativeId) -> Result<Self, LotteryError> {
        if !agenda.contains_alternative(x) {
            return Err(LotteryError::OutOfDomain { id: x });
        }
        let mut probs = IndexMap::new();
        probs.insert(x, BigRational::one());
        Ok(Self { probs })
    }

    /// The even split over a non-empty set of alternatives.
    pub fn uniform<I>(agenda: &Agenda, over: I) -> Result<Self, LotteryError>
    where
        I: IntoIterator<Item = AlternativeId>,
    {
        let support: IndexSet<AlternativeId> = over.into_iter().collect();
        if support.is_empty() {
            return Err(LotteryError::EmptySupport);
        }
        let share = BigRational::new(1.into(), (support.len() as i64).into());
        let mut probs = IndexMap::new();
        for id in support {
            if !agenda.contains_alternative(id) {
                return Err(LotteryError::OutOfDomain { id });
            }
            probs.insert(id, share.clone());
        }
        Ok(Self { probs })
    }

    /// The probability of `x`; zero off the support.
    pub fn probability(&self, x: AlternativeId) -> BigRational {
        self.probs.get(&x).cloned().unwrap_or_else(BigRational::zero)
    }

    /// The total probability of a set of alternatives. Repeated ids in the
    /// input are counted once.
    pub fn probability_of_set<I>(&self, set: I) -> BigRational
    where
        I: IntoIterator<Item = AlternativeId>,
    {
        let unique: IndexSet<AlternativeId> = set.into_iter().collect();
        unique.into_iter().map(|id| self.probability(id)).sum()
    }

    /// Alternatives with positive probability, in insertion order.
    pub fn support(&self) -> impl Iterator<Item = AlternativeId> + '_ {
        self.probs.keys().copied()
    }

    pub fn support_size(&self) -> usize {
        self.probs.len()
    }

    /// Support entries with their probabilities.
    pub fn entries(&self) -> impl Iterator<Item = (AlternativeId, &BigRational)> {
        self.probs.iter().map(|(&id, p)| (id, p))
    }

    /// `Some(x)` when the lottery is the point mass on `x`.
    pub fn as_point_mass(&self) -> Option<AlternativeId> {
        if self.probs.len() == 1 {
            self.probs.keys().next().copied()
        } else {
            None
        }
    }

    /// Push the distribution forward through `f`; probabilities of
    /// alternatives sharing an image are summed. Images must lie in the
    /// agenda.
    pub fn map_alternatives<F>(&self, agenda: &Agenda, f: F) -> Result<Self, LotteryError>
    where
        F: Fn(AlternativeId) -> AlternativeId,
    {
        let mut probs: IndexMap<AlternativeId, BigRational> = IndexMap::new();
        for (id, p) in self.entries() {
            let image = f(id);
            if !agenda.contains_alternative(image) {
                return Err(LotteryError::OutOfDomain { id: image });
            }
            *probs.entry(image).or_insert_with(BigRational::zero) += p.clone();
        }
        Ok(Self { probs })
    }

    /// Relabel the support through a permutation of the agenda's
    /// alternatives; the bijective special case of
    /// [`map_alternatives`](Self::map_alternatives).
    pub fn permute(&self, sigma: &Permutation) -> Result<Self, LotteryError> {
        let mut probs = IndexMap::with_capacity(self.probs.len());
        for (id, p) in self.entries() {
            if id >= sigma.len() {
                return Err(LotteryError::OutOfDomain { id });
            }
            probs.insert(sigma.apply(id), p.clone());
        }
        Ok(Self { probs })
    }

    /// Render the distribution with agenda names, e.g. `1/2 b + 1/2 c`.
    pub fn render(&self, agenda: &Agenda) -> String {
        self.probs
            .iter()
            .map(|(&id, p)| format!("{} {}", p, agenda.alternative_name(id).unwrap_or("?")))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl PartialEq for Lottery {
    fn eq(&self, other: &Self) -> bool {
        self.probs.len() == other.probs.len()
            && self
                .probs
                .iter()
                .all(|(id, p)| other.probs.get(id) == Some(p))
    }
}

impl Eq for Lottery {}
