#![doc = include_str!("../README.md")]

//! Decision procedures for randomized social choice.
//!
//! This crate implements Pareto and stochastic dominance over the
//! `sortition-core` data model, SD-efficiency decided by an exact-rational
//! linear program with improving-lottery witnesses, and the property
//! harness (anonymity, neutrality, SD-manipulability) for externally
//! supplied social decision schemes.

pub mod dominance;
pub mod efficiency;
pub mod harness;
pub mod simplex;

pub use dominance::{
    pareto_dominated, pareto_frontier, pareto_losers, sd_compare, stochastic_dominates,
    strictly_stochastic_dominates, DominanceError, SdComparison,
};
pub use efficiency::{
    efficiency_report, is_pareto_efficient, is_sd_efficient, sd_improvement, EfficiencyError,
    EfficiencyReport,
};
pub use harness::{
    anonymity_violation, manipulation_by, neutrality_violation, AnonymityViolation, HarnessError,
    NeutralityViolation, RandomDictatorship, Sds,
};
