#![doc = include_str!("../README.md")]

//! Data model for randomized social choice.
//!
//! This crate defines the agenda (fixed agent and alternative sets),
//! preference orders stored canonically as weak rankings, exact-rational
//! lotteries, preference profiles, and the permutation transforms used to
//! state anonymity and neutrality of a social decision scheme. Every value
//! is validated at construction; queries over validated values are total.

pub mod agenda;
pub mod lottery;
pub mod order;
pub mod permutation;
pub mod profile;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;

pub use agenda::{Agenda, AgendaError, AgentId, AlternativeId};
pub use lottery::{Lottery, LotteryError};
pub use order::{Comparison, OrderError, PreferenceOrder};
pub use permutation::{Permutation, PermutationError};
pub use profile::{PreferenceProfile, ProfileError};
