use indexmap::IndexMap;
use thiserror::Error;

use crate::agenda::{Agenda, AgentId};
use crate::order::{OrderError, PreferenceOrder};
use crate::permutation::{Permutation, PermutationError};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Agent '{agent}' has no assigned preference order")]
    IncompleteProfile { agent: String },
    #[error("Agent id {id} is not in the agenda")]
    UnknownAgent { id: AgentId },
    #[error("Order ranks {got} alternatives, agenda has {expected}")]
    AgendaMismatch { expected: usize, got: usize },
    #[error(transparent)]
    Permutation(#[from] PermutationError),
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// A preference profile: one validated order per agent of an agenda.
///
/// Construction checks that every agent is covered and every order ranks
/// exactly the agenda's alternatives; after that the profile is an
/// immutable value, and the transforms below return new profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceProfile {
    agenda: Agenda,
    /// Orders indexed by `AgentId`.
    orders: Vec<PreferenceOrder>,
}

impl PreferenceProfile {
    /// Build a profile from an agent → order assignment.
    pub fn new(
        agenda: Agenda,
        assignments: IndexMap<AgentId, PreferenceOrder>,
    ) -> Result<Self, ProfileError> {
        let expected = agenda.num_alternatives();
        let mut slots: Vec<Option<PreferenceOrder>> = vec![None; agenda.num_agents()];
        for (id, order) in assignments {
            if !agenda.contains_agent(id) {
                return Err(ProfileError::UnknownAgent { id });
            }
            if order.num_alternatives() != expected {
                return Err(ProfileError::AgendaMismatch {
                    expected,
                    got: order.num_alternatives(),
                });
            }
            slots[id] = Some(order);
        }
        let mut orders = Vec::with_capacity(slots.len());
        for (id, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(order) => orders.push(order),
                None => {
                    return Err(ProfileError::IncompleteProfile {
                        agent: agenda.agent_name(id).unwrap_or_default().to_owned(),
                    })
                }
            }
        }
        Ok(Self { agenda, orders })
    }

    /// Build a profile from orders listed in agent-id order.
    pub fn from_orders(
        agenda: Agenda,
        orders: Vec<PreferenceOrder>,
    ) -> Result<Self, ProfileError> {
        let assignments: IndexMap<AgentId, PreferenceOrder> =
            orders.into_iter().enumerate().collect();
        if assignments.len() > agenda.num_agents() {
            return Err(ProfileError::UnknownAgent {
                id: agenda.num_agents(),
            });
        }
        Self::new(agenda, assignments)
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub fn num_agents(&self) -> usize {
        self.orders.len()
    }

    /// The order held by `agent`.
    pub fn order(&self, agent: AgentId) -> Result<&PreferenceOrder, ProfileError> {
        self.orders
            .get(agent)
            .ok_or(ProfileError::UnknownAgent { id: agent })
    }

    /// All `(agent, order)` pairs in agent-id order.
    pub fn orders(&self) -> impl Iterator<Item = (AgentId, &PreferenceOrder)> {
        self.orders.iter().enumerate()
    }

    /// Reassign orders across agents: agent `i` of the result holds the
    /// order of agent `pi(i)`. An anonymous social decision scheme is
    /// invariant under this transform.
    pub fn permute_agents(&self, pi: &Permutation) -> Result<Self, ProfileError> {
        if pi.len() != self.orders.len() {
            return Err(PermutationError::LengthMismatch {
                expected: self.orders.len(),
                got: pi.len(),
            }
            .into());
        }
        let orders = (0..self.orders.len())
            .map(|i| self.orders[pi.apply(i)].clone())
            .collect();
        Ok(Self {
            agenda: self.agenda.clone(),
            orders,
        })
    }

    /// Relabel alternatives in every agent's order through `sigma`. A
    /// neutral social decision scheme commutes with this transform.
    pub fn permute_alternatives(&self, sigma: &Permutation) -> Result<Self, ProfileError> {
        let orders = self
            .orders
            .iter()
            .map(|order| order.permute(sigma))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            agenda: self.agenda.clone(),
            orders,
        })
    }

    /// Replace one agent's order: a single-agent deviation from this
    /// profile.
    pub fn update_agent(
        &self,
        agent: AgentId,
        order: PreferenceOrder,
    ) -> Result<Self, ProfileError> {
        if !self.agenda.contains_agent(agent) {
            return Err(ProfileError::UnknownAgent { id: agent });
        }
        if order.num_alternatives() != self.agenda.num_alternatives() {
            return Err(ProfileError::AgendaMismatch {
                expected: self.agenda.num_alternatives(),
                got: order.num_alternatives(),
            });
        }
        let mut orders = self.orders.clone();
        orders[agent] = order;
        Ok(Self {
            agenda: self.agenda.clone(),
            orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agenda() -> Agenda {
        Agenda::new(["1", "2"], ["a", "b", "c"]).unwrap()
    }

    fn strict(agenda: &Agenda, ranking: [usize; 3]) -> PreferenceOrder {
        PreferenceOrder::from_classes(agenda, ranking.into_iter().map(|x| vec![x]).collect())
            .unwrap()
    }

    #[test]
    fn every_agent_needs_an_order() {
        let agenda = agenda();
        let one = strict(&agenda, [2, 1, 0]);
        let mut assignments = IndexMap::new();
        assignments.insert(0, one);
        assert!(matches!(
            PreferenceProfile::new(agenda, assignments),
            Err(ProfileError::IncompleteProfile { agent }) if agent == "2"
        ));
    }

    #[test]
    fn foreign_agents_and_mismatched_orders_are_rejected() {
        let agenda = agenda();
        let order = strict(&agenda, [2, 1, 0]);
        let mut assignments = IndexMap::new();
        assignments.insert(5, order.clone());
        assert!(matches!(
            PreferenceProfile::new(agenda.clone(), assignments),
            Err(ProfileError::UnknownAgent { id: 5 })
        ));

        let small = Agenda::new(["1", "2"], ["a", "b"]).unwrap();
        let short = PreferenceOrder::from_classes(&small, vec![vec![0], vec![1]]).unwrap();
        assert!(matches!(
            PreferenceProfile::from_orders(agenda, vec![short.clone(), short]),
            Err(ProfileError::AgendaMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn permute_agents_reassigns_orders() {
        let agenda = agenda();
        let first = strict(&agenda, [2, 1, 0]);
        let second = strict(&agenda, [1, 2, 0]);
        let profile =
            PreferenceProfile::from_orders(agenda, vec![first.clone(), second.clone()]).unwrap();
        let swap = Permutation::transposition(2, 0, 1).unwrap();
        let swapped = profile.permute_agents(&swap).unwrap();
        assert_eq!(swapped.order(0).unwrap(), &second);
        assert_eq!(swapped.order(1).unwrap(), &first);
        assert_eq!(swapped.permute_agents(&swap).unwrap(), profile);
    }

    #[test]
    fn permute_alternatives_round_trips() {
        let agenda = agenda();
        let profile = PreferenceProfile::from_orders(
            agenda.clone(),
            vec![strict(&agenda, [2, 1, 0]), strict(&agenda, [1, 2, 0])],
        )
        .unwrap();
        let sigma = Permutation::new(vec![1, 2, 0]).unwrap();
        let permuted = profile.permute_alternatives(&sigma).unwrap();
        assert_ne!(permuted, profile);
        assert_eq!(
            permuted.permute_alternatives(&sigma.inverse()).unwrap(),
            profile
        );
    }

    #[test]
    fn update_agent_is_a_single_deviation() {
        let agenda = agenda();
        let truthful = strict(&agenda, [2, 1, 0]);
        let misreport = strict(&agenda, [0, 1, 2]);
        let profile =
            PreferenceProfile::from_orders(agenda, vec![truthful.clone(), truthful.clone()])
                .unwrap();
        let deviated = profile.update_agent(1, misreport.clone()).unwrap();
        assert_eq!(deviated.order(0).unwrap(), &truthful);
        assert_eq!(deviated.order(1).unwrap(), &misreport);
        assert!(matches!(
            profile.update_agent(9, misreport),
            Err(ProfileError::UnknownAgent { id: 9 })
        ));
    }
}
