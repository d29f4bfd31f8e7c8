use num::rational::BigRational;
use num::traits::{One, Zero};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use sortition_core::{AlternativeId, Lottery, LotteryError, PreferenceProfile};

use crate::dominance::pareto_dominated_unchecked;
use crate::simplex::{ConstraintOp, LinearProgram, SimplexError};

#[derive(Debug, Error)]
pub enum EfficiencyError {
    #[error("Alternative id {id} is not in the agenda")]
    OutOfDomain { id: AlternativeId },
    #[error(transparent)]
    Solver(#[from] SimplexError),
    #[error(transparent)]
    Lottery(#[from] LotteryError),
}

/// Whether no alternative Pareto-dominates `x` under `profile`: the
/// combinatorial special case of SD-efficiency for point masses.
pub fn is_pareto_efficient(
    profile: &PreferenceProfile,
    x: AlternativeId,
) -> Result<bool, EfficiencyError> {
    if !profile.agenda().contains_alternative(x) {
        return Err(EfficiencyError::OutOfDomain { id: x });
    }
    Ok(!profile
        .agenda()
        .alternatives()
        .any(|y| pareto_dominated_unchecked(profile, x, y)))
}

/// Whether no lottery over the agenda SD-dominates `p`: weakly for every
/// agent and strictly for at least one.
pub fn is_sd_efficient(profile: &PreferenceProfile, p: &Lottery) -> Result<bool, EfficiencyError> {
    Ok(sd_improvement(profile, p)?.is_none())
}

/// Find a lottery that SD-dominates `p` under `profile`, if one exists.
///
/// Point masses are settled by the Pareto scan directly: the point mass on
/// `x` is SD-dominated iff `x` is a Pareto loser, and any dominating
/// alternative's point mass is a witness. Every other lottery goes through
/// the exact surplus-maximization program.
pub fn sd_improvement(
    profile: &PreferenceProfile,
    p: &Lottery,
) -> Result<Option<Lottery>, EfficiencyError> {
    let agenda = profile.agenda();
    for id in p.support() {
        if !agenda.contains_alternative(id) {
            return Err(EfficiencyError::OutOfDomain { id });
        }
    }

    if let Some(x) = p.as_point_mass() {
        let dominator = agenda
            .alternatives()
            .find(|&y| pareto_dominated_unchecked(profile, x, y));
        return match dominator {
            Some(y) => Ok(Some(Lottery::point_mass(agenda, y)?)),
            None => Ok(None),
        };
    }

    let (program, target) = improvement_program(profile, p)?;
    debug!(
        vars = program.num_vars(),
        constraints = program.num_constraints(),
        "solving sd-efficiency program"
    );
    let solution = program.maximize()?;
    if solution.value > target {
        let entries = solution
            .point
            .into_iter()
            .enumerate()
            .filter(|(_, probability)| !probability.is_zero());
        Ok(Some(Lottery::new(agenda, entries)?))
    } else {
        Ok(None)
    }
}

/// The surplus-maximization program deciding SD-efficiency of `p`.
///
/// Variables are the probabilities of a candidate lottery `q`. For every
/// agent and every upper-contour set of that agent's order there is one row
/// `q(set) >= p(set)`; the full-set row is omitted because it coincides
/// with the simplex equality. The objective is the total surplus of `q`
/// over `p` across all rows. `q = p` is feasible with surplus zero, so `p`
/// is SD-efficient iff the optimum equals the returned target value, and
/// any vertex strictly above it weakly dominates for every agent and
/// strictly for at least one.
fn improvement_program(
    profile: &PreferenceProfile,
    p: &Lottery,
) -> Result<(LinearProgram, BigRational), SimplexError> {
    let n = profile.agenda().num_alternatives();
    let mut program = LinearProgram::new(n);
    let mut objective = vec![BigRational::zero(); n];
    let mut target = BigRational::zero();

    for (_, order) in profile.orders() {
        let mut prefix = vec![BigRational::zero(); n];
        let mut prefix_mass = BigRational::zero();
        let classes = order.weak_ranking();
        for (k, class) in classes.iter().enumerate() {
            for &a in class {
                prefix[a] = BigRational::one();
                prefix_mass += p.probability(a);
            }
            if k + 1 == classes.len() {
                break;
            }
            for (a, coefficient) in prefix.iter().enumerate() {
                if !coefficient.is_zero() {
                    objective[a] += BigRational::one();
                }
            }
            target += prefix_mass.clone();
            program.add_constraint(prefix.clone(), ConstraintOp::Ge, prefix_mass.clone())?;
        }
    }

    program.add_constraint(vec![BigRational::one(); n], ConstraintOp::Eq, BigRational::one())?;
    program.set_objective(objective)?;
    Ok((program, target))
}

/// Serializable summary of one efficiency decision. Probabilities are
/// rendered as exact `numerator/denominator` strings.
#[derive(Debug, Clone, Serialize)]
pub struct EfficiencyReport {
    pub efficient: bool,
    /// The improving lottery keyed by alternative name, when one exists.
    pub improvement: Option<Vec<(String, String)>>,
}

/// Decide SD-efficiency of `p` and package the outcome for reporting.
pub fn efficiency_report(
    profile: &PreferenceProfile,
    p: &Lottery,
) -> Result<EfficiencyReport, EfficiencyError> {
    let witness = sd_improvement(profile, p)?;
    let agenda = profile.agenda();
    Ok(EfficiencyReport {
        efficient: witness.is_none(),
        improvement: witness.map(|q| {
            q.entries()
                .map(|(id, probability)| {
                    (
                        agenda.alternative_name(id).unwrap_or("?").to_owned(),
                        probability.to_string(),
                    )
                })
                .collect()
        }),
    })
}
