use indexmap::IndexSet;
use num::rational::BigRational;
use num::traits::Zero;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use sortition_core::{AlternativeId, Lottery, PreferenceOrder, PreferenceProfile};

#[derive(Debug, Error)]
pub enum DominanceError {
    #[error("Alternative id {id} is not in the agenda")]
    OutOfDomain { id: AlternativeId },
}

/// Four-way outcome of comparing two lotteries under one agent's order.
///
/// Stochastic dominance is a preorder, not a total order, so two lotteries
/// may be incomparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SdComparison {
    /// Each lottery weakly dominates the other.
    #[serde(rename = "equivalent")]
    Equivalent,
    /// The first lottery strictly dominates the second.
    #[serde(rename = "dominates")]
    Dominates,
    /// The second lottery strictly dominates the first.
    #[serde(rename = "dominated_by")]
    DominatedBy,
    /// Neither lottery weakly dominates the other.
    #[serde(rename = "incomparable")]
    Incomparable,
}

/// Whether `y` Pareto-dominates `x` under `profile`: every agent weakly
/// prefers `y` to `x` and at least one agent strictly prefers `y` to `x`.
/// Irreflexive by definition.
pub fn pareto_dominated(
    profile: &PreferenceProfile,
    x: AlternativeId,
    y: AlternativeId,
) -> Result<bool, DominanceError> {
    let n = profile.agenda().num_alternatives();
    if x >= n {
        return Err(DominanceError::OutOfDomain { id: x });
    }
    if y >= n {
        return Err(DominanceError::OutOfDomain { id: y });
    }
    Ok(pareto_dominated_unchecked(profile, x, y))
}

/// `pareto_dominated` for ids already known to be in the agenda.
pub(crate) fn pareto_dominated_unchecked(
    profile: &PreferenceProfile,
    x: AlternativeId,
    y: AlternativeId,
) -> bool {
    if x == y {
        return false;
    }
    let mut strict = false;
    for (_, order) in profile.orders() {
        let rank_x = order.class_index(x);
        let rank_y = order.class_index(y);
        if rank_y > rank_x {
            // This agent strictly prefers x, so y cannot dominate.
            return false;
        }
        if rank_y < rank_x {
            strict = true;
        }
    }
    strict
}

/// All alternatives Pareto-dominated by some other alternative: the
/// pairwise O(|alternatives|² · |agents|) scan.
pub fn pareto_losers(profile: &PreferenceProfile) -> IndexSet<AlternativeId> {
    let n = profile.agenda().num_alternatives();
    let mut losers = IndexSet::new();
    for x in 0..n {
        if (0..n).any(|y| pareto_dominated_unchecked(profile, x, y)) {
            losers.insert(x);
        }
    }
    debug!(
        losers = losers.len(),
        alternatives = n,
        "pareto loser scan complete"
    );
    losers
}

/// The alternatives that are not Pareto-dominated.
pub fn pareto_frontier(profile: &PreferenceProfile) -> IndexSet<AlternativeId> {
    let losers = pareto_losers(profile);
    profile
        .agenda()
        .alternatives()
        .filter(|x| !losers.contains(x))
        .collect()
}

/// The probability each indifference class of `order` receives under
/// `lottery`, best class first.
fn class_masses(order: &PreferenceOrder, lottery: &Lottery) -> Vec<BigRational> {
    let mut masses = vec![BigRational::zero(); order.num_classes()];
    for (id, p) in lottery.entries() {
        masses[order.class_index(id)] += p.clone();
    }
    masses
}

/// Whether `p` weakly stochastically dominates `q` under `order`: for every
/// alternative, `p` puts at least as much probability on the alternative's
/// upper contour set as `q` does.
///
/// Upper contour sets only change at class boundaries, so the check walks
/// cumulative class masses from the best class down. The relation is a
/// preorder: reflexive, and transitive pointwise in the cumulative masses.
pub fn stochastic_dominates(order: &PreferenceOrder, p: &Lottery, q: &Lottery) -> bool {
    let masses_p = class_masses(order, p);
    let masses_q = class_masses(order, q);
    let mut cumulative_p = BigRational::zero();
    let mut cumulative_q = BigRational::zero();
    for k in 0..order.num_classes() {
        cumulative_p += masses_p[k].clone();
        cumulative_q += masses_q[k].clone();
        if cumulative_p < cumulative_q {
            return false;
        }
    }
    true
}

/// Whether `p` strictly stochastically dominates `q`: `p` weakly dominates
/// `q` and `q` does not weakly dominate `p`.
pub fn strictly_stochastic_dominates(order: &PreferenceOrder, p: &Lottery, q: &Lottery) -> bool {
    stochastic_dominates(order, p, q) && !stochastic_dominates(order, q, p)
}

/// Classify the SD relation between `p` and `q` under `order`.
pub fn sd_compare(order: &PreferenceOrder, p: &Lottery, q: &Lottery) -> SdComparison {
    match (
        stochastic_dominates(order, p, q),
        stochastic_dominates(order, q, p),
    ) {
        (true, true) => SdComparison::Equivalent,
        (true, false) => SdComparison::Dominates,
        (false, true) => SdComparison::DominatedBy,
        (false, false) => SdComparison::Incomparable,
    }
}
