//! # Separation
//!
//! Pairwise repulsion that keeps enemies from stacking on top of each other.
//! The push is a small positional nudge and ignores walls.

use crate::game::agent::Agent;
use crate::utils::math::Vec2;
use log::trace;

/// Default multiplier applied to each neighbor's repulsion.
pub const DEFAULT_SEPARATION_STRENGTH: f64 = 2.0;

/// Sums the repulsion felt at `position` from every neighbor closer than `separation_distance`.
///
/// Each close neighbor pushes directly away with weight
/// `(separation_distance - distance) / separation_distance * strength`.
/// Neighbors at exactly the same position give no direction and are skipped.
///
/// # Examples
///
/// ```
/// use pythy::{separation_vector, Vec2};
///
/// let push = separation_vector(Vec2::new(0.0, 0.0), [Vec2::new(40.0, 0.0)], 80.0, 2.0);
/// assert_eq!(push, Vec2::new(-1.0, 0.0));
/// ```
pub fn separation_vector<I>(position: Vec2, neighbors: I, separation_distance: f64, strength: f64) -> Vec2
where
    I: IntoIterator<Item = Vec2>,
{
    let mut push = Vec2::ZERO;
    if separation_distance <= 0.0 {
        return push;
    }

    for neighbor in neighbors {
        let away = position - neighbor;
        let distance = away.length();
        if distance >= separation_distance {
            continue;
        }

        if let Some(direction) = away.normalized() {
            let weight = (separation_distance - distance) / separation_distance;
            push += direction * (weight * strength);
        }
    }

    push
}

/// Nudges `agents[index]` one unit away from its close neighbors.
///
/// Neighbor positions are read as they are when the call is made.
pub fn separate(agents: &mut [Agent], index: usize, separation_distance: f64, strength: f64) {
    let Some(position) = agents.get(index).map(Agent::position) else {
        return;
    };

    let neighbors: Vec<Vec2> = agents
        .iter()
        .enumerate()
        .filter(|(other, _)| *other != index)
        .map(|(_, agent)| agent.position())
        .collect();

    let push = separation_vector(position, neighbors, separation_distance, strength);
    if push != Vec2::ZERO {
        trace!("Separating agent {} by {:?}", index, push);
        agents[index].nudge(push);
    }
}

/// Runs [`separate`] for every agent in order.
pub fn separate_all(agents: &mut [Agent], separation_distance: f64, strength: f64) {
    for index in 0..agents.len() {
        separate(agents, index, separation_distance, strength);
    }
}
