use num::rational::BigRational;
use thiserror::Error;

use sortition_core::{
    AgentId, Lottery, LotteryError, Permutation, PreferenceOrder, PreferenceProfile, ProfileError,
};

use crate::dominance::strictly_stochastic_dominates;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Scheme failed: {0}")]
    Scheme(String),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Lottery(#[from] LotteryError),
}

/// A social decision scheme: any map from preference profiles to lotteries
/// over the same agenda.
///
/// The harness treats the scheme as a black box; it only runs it on
/// transformed profiles and compares outcomes.
pub trait Sds {
    fn run(&self, profile: &PreferenceProfile) -> Result<Lottery, HarnessError>;
}

/// Witness that a scheme is not anonymous: relabeling the agents changed
/// the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymityViolation {
    pub original: Lottery,
    pub permuted: Lottery,
}

/// Check anonymity of `scheme` at `profile` under the agent relabeling
/// `pi`: an anonymous scheme returns the same lottery on both profiles.
pub fn anonymity_violation(
    scheme: &dyn Sds,
    profile: &PreferenceProfile,
    pi: &Permutation,
) -> Result<Option<AnonymityViolation>, HarnessError> {
    let original = scheme.run(profile)?;
    let permuted = scheme.run(&profile.permute_agents(pi)?)?;
    Ok((original != permuted).then(|| AnonymityViolation { original, permuted }))
}

/// Witness that a scheme is not neutral: relabeling alternatives in the
/// profile does not commute with relabeling them in the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeutralityViolation {
    /// The scheme's outcome on the relabeled profile.
    pub outcome_of_permuted: Lottery,
    /// The relabeled outcome on the original profile.
    pub permuted_outcome: Lottery,
}

/// Check neutrality of `scheme` at `profile` under the alternative
/// relabeling `sigma`.
pub fn neutrality_violation(
    scheme: &dyn Sds,
    profile: &PreferenceProfile,
    sigma: &Permutation,
) -> Result<Option<NeutralityViolation>, HarnessError> {
    let outcome_of_permuted = scheme.run(&profile.permute_alternatives(sigma)?)?;
    let permuted_outcome = scheme.run(profile)?.permute(sigma)?;
    Ok((outcome_of_permuted != permuted_outcome).then(|| NeutralityViolation {
        outcome_of_permuted,
        permuted_outcome,
    }))
}

/// Whether `agent` can gain by reporting `misreport` instead of their
/// order in `profile`: true iff the deviation outcome strictly
/// SD-dominates the truthful outcome under the agent's *true* order. An
/// SD-strategyproof scheme admits no such misreport.
pub fn manipulation_by(
    scheme: &dyn Sds,
    profile: &PreferenceProfile,
    agent: AgentId,
    misreport: &PreferenceOrder,
) -> Result<bool, HarnessError> {
    let truthful_outcome = scheme.run(profile)?;
    let deviated = profile.update_agent(agent, misreport.clone())?;
    let deviated_outcome = scheme.run(&deviated)?;
    let true_order = profile.order(agent)?;
    Ok(strictly_stochastic_dominates(
        true_order,
        &deviated_outcome,
        &truthful_outcome,
    ))
}

/// Uniform random dictatorship: a dictator is drawn uniformly at random
/// and their probability share is spread evenly over their top
/// indifference class. The classic anonymous, neutral, SD-strategyproof
/// scheme; used as the reference instance for the harness.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDictatorship;

impl Sds for RandomDictatorship {
    fn run(&self, profile: &PreferenceProfile) -> Result<Lottery, HarnessError> {
        let num_agents = profile.num_agents();
        let mut entries = Vec::new();
        for (_, order) in profile.orders() {
            let favorites = order.best();
            let share =
                BigRational::new(1.into(), ((num_agents * favorites.len()) as i64).into());
            for &x in favorites {
                entries.push((x, share.clone()));
            }
        }
        Ok(Lottery::new(profile.agenda(), entries)?)
    }
}
