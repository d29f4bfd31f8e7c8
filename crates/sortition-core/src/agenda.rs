use indexmap::IndexSet;
use thiserror::Error;

/// A unique identifier for an alternative in an agenda.
pub type AlternativeId = usize;
/// A unique identifier for an agent in an agenda.
pub type AgentId = usize;

#[derive(Debug, Error)]
pub enum AgendaError {
    #[error("An agenda requires at least one agent")]
    EmptyAgents,
    #[error("An agenda requires at least one alternative")]
    EmptyAlternatives,
    #[error("Duplicate agent name '{0}'")]
    DuplicateAgent(String),
    #[error("Duplicate alternative name '{0}'")]
    DuplicateAlternative(String),
}

/// The fixed universe of one social-choice problem: who decides, and what
/// can be decided.
///
/// Agents and alternatives are kept in insertion order and addressed by
/// dense ids (`AgentId`, `AlternativeId`), with names retained for lookup
/// and rendering. Both sets are fixed for the lifetime of the agenda;
/// orders, lotteries, and profiles are validated against it once, at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agenda {
    agents: IndexSet<String>,
    alternatives: IndexSet<String>,
}

impl Agenda {
    /// Build an agenda from agent and alternative names.
    ///
    /// Fails if either set is empty or contains a repeated name.
    pub fn new<A, B>(agents: A, alternatives: B) -> Result<Self, AgendaError>
    where
        A: IntoIterator,
        A::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        let mut agent_set = IndexSet::new();
        for name in agents {
            let name = name.into();
            if !agent_set.insert(name.clone()) {
                return Err(AgendaError::DuplicateAgent(name));
            }
        }
        let mut alternative_set = IndexSet::new();
        for name in alternatives {
            let name = name.into();
            if !alternative_set.insert(name.clone()) {
                return Err(AgendaError::DuplicateAlternative(name));
            }
        }
        if agent_set.is_empty() {
            return Err(AgendaError::EmptyAgents);
        }
        if alternative_set.is_empty() {
            return Err(AgendaError::EmptyAlternatives);
        }
        Ok(Self {
            agents: agent_set,
            alternatives: alternative_set,
        })
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn num_alternatives(&self) -> usize {
        self.alternatives.len()
    }

    /// All agent ids, in insertion order.
    pub fn agents(&self) -> impl Iterator<Item = AgentId> {
        0..self.agents.len()
    }

    /// All alternative ids, in insertion order.
    pub fn alternatives(&self) -> impl Iterator<Item = AlternativeId> {
        0..self.alternatives.len()
    }

    pub fn contains_agent(&self, id: AgentId) -> bool {
        id < self.agents.len()
    }

    pub fn contains_alternative(&self, id: AlternativeId) -> bool {
        id < self.alternatives.len()
    }

    /// Resolve an agent name to its id.
    pub fn agent_id(&self, name: &str) -> Option<AgentId> {
        self.agents.get_index_of(name)
    }

    /// Resolve an alternative name to its id.
    pub fn alternative_id(&self, name: &str) -> Option<AlternativeId> {
        self.alternatives.get_index_of(name)
    }

    pub fn agent_name(&self, id: AgentId) -> Option<&str> {
        self.agents.get_index(id).map(String::as_str)
    }

    pub fn alternative_name(&self, id: AlternativeId) -> Option<&str> {
        self.alternatives.get_index(id).map(String::as_str)
    }
}
