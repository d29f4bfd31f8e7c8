//! Proptest strategies for generating well-formed agendas, preference
//! orders, lotteries, and profiles.

use num::rational::BigRational;
use proptest::prelude::*;

use crate::agenda::Agenda;
use crate::lottery::Lottery;
use crate::order::PreferenceOrder;
use crate::permutation::Permutation;
use crate::profile::PreferenceProfile;

/// Strategy for a small agenda: 1–4 agents, 2–5 alternatives.
pub fn arb_agenda() -> impl Strategy<Value = Agenda> {
    (1..=4usize, 2..=5usize).prop_map(|(num_agents, num_alternatives)| {
        Agenda::new(
            (0..num_agents).map(|i| format!("agent{i}")),
            (0..num_alternatives).map(|i| format!("alt{i}")),
        )
        .expect("generated agenda is well-formed")
    })
}

/// Strategy for a weak order over `agenda`: a shuffled ranking with random
/// indifference-class breaks.
pub fn arb_order(agenda: Agenda) -> impl Strategy<Value = PreferenceOrder> {
    let n = agenda.num_alternatives();
    let ids: Vec<usize> = (0..n).collect();
    (
        Just(ids).prop_shuffle(),
        proptest::collection::vec(any::<bool>(), n.saturating_sub(1)),
    )
        .prop_map(move |(shuffled, breaks)| {
            let mut classes: Vec<Vec<usize>> = vec![vec![shuffled[0]]];
            for (i, &x) in shuffled.iter().enumerate().skip(1) {
                if breaks[i - 1] {
                    classes.push(vec![x]);
                } else if let Some(class) = classes.last_mut() {
                    class.push(x);
                }
            }
            PreferenceOrder::from_classes(&agenda, classes)
                .expect("generated classes partition the agenda")
        })
}

/// Strategy for a strict total order over `agenda` (all classes singleton).
pub fn arb_strict_order(agenda: Agenda) -> impl Strategy<Value = PreferenceOrder> {
    let ids: Vec<usize> = (0..agenda.num_alternatives()).collect();
    Just(ids).prop_shuffle().prop_map(move |shuffled| {
        PreferenceOrder::from_classes(&agenda, shuffled.into_iter().map(|x| vec![x]).collect())
            .expect("generated ranking partitions the agenda")
    })
}

/// Strategy for a lottery over `agenda`: random small integer weights,
/// normalized exactly.
pub fn arb_lottery(agenda: Agenda) -> impl Strategy<Value = Lottery> {
    let n = agenda.num_alternatives();
    proptest::collection::vec(0u32..=6, n)
        .prop_filter("at least one positive weight", |weights| {
            weights.iter().any(|&w| w > 0)
        })
        .prop_map(move |weights| {
            let total: i64 = weights.iter().map(|&w| i64::from(w)).sum();
            let entries = weights.iter().enumerate().filter(|(_, &w)| w > 0).map(|(id, &w)| {
                (id, BigRational::new(i64::from(w).into(), total.into()))
            });
            Lottery::new(&agenda, entries).expect("normalized weights sum to one")
        })
}

/// Strategy for a full profile over `agenda`.
pub fn arb_profile(agenda: Agenda) -> impl Strategy<Value = PreferenceProfile> {
    let num_agents = agenda.num_agents();
    proptest::collection::vec(arb_order(agenda.clone()), num_agents..=num_agents).prop_map(
        move |orders| {
            PreferenceProfile::from_orders(agenda.clone(), orders)
                .expect("generated profile covers every agent")
        },
    )
}

/// Strategy for a profile over a generated agenda.
pub fn arb_any_profile() -> impl Strategy<Value = PreferenceProfile> {
    arb_agenda().prop_flat_map(arb_profile)
}

/// Strategy for a profile plus `count` lotteries over the same agenda.
pub fn arb_profile_and_lotteries(
    count: usize,
) -> impl Strategy<Value = (PreferenceProfile, Vec<Lottery>)> {
    arb_agenda().prop_flat_map(move |agenda| {
        (
            arb_profile(agenda.clone()),
            proptest::collection::vec(arb_lottery(agenda), count..=count),
        )
    })
}

/// Strategy for a permutation of `0..n`.
pub fn arb_permutation(n: usize) -> impl Strategy<Value = Permutation> {
    Just((0..n).collect::<Vec<usize>>())
        .prop_shuffle()
        .prop_map(|mapping| Permutation::new(mapping).expect("shuffled identity is a bijection"))
}
