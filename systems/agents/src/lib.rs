#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reference agents exercising the toolkit façade.
//!
//! These agents double as living documentation of the [`Agent`] contract:
//! they hold no privileged access and observe the match purely through the
//! snapshot and toolkit.

use storm_arena_core::{Action, EntityKind};
use storm_arena_toolkit::{Agent, ArenaSnapshot, Toolkit};

/// Agent that never acts. Useful as a sparring dummy and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdleAgent;

impl Agent for IdleAgent {
    fn name(&self) -> &str {
        "idle"
    }

    fn next_action(&mut self, _snapshot: &ArenaSnapshot, _toolkit: &mut Toolkit<'_>) -> Action {
        Action::NoAction
    }
}

/// Agent that picks a uniformly random action every round.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomAgent;

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn next_action(&mut self, _snapshot: &ArenaSnapshot, toolkit: &mut Toolkit<'_>) -> Action {
        toolkit.choose_randomly(&Action::ALL)
    }
}

/// Chase-and-shoot heuristic.
///
/// Priorities per round: retreat to a health pack when wounded, shoot the
/// opponent down a clear lane, drop a mine when adjacent, otherwise close
/// the distance along the shortest path.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeekerAgent;

/// Health at or below which the seeker prefers a health pack over a fight.
const RETREAT_THRESHOLD: u8 = 2;

/// Furthest opponent distance at which the seeker bothers shooting.
const FIRING_RANGE: u32 = 5;

impl Agent for SeekerAgent {
    fn name(&self) -> &str {
        "seeker"
    }

    fn next_action(&mut self, snapshot: &ArenaSnapshot, toolkit: &mut Toolkit<'_>) -> Action {
        let me = snapshot.me();
        let opponent = snapshot.opponent();

        if me.health.get() <= RETREAT_THRESHOLD {
            if let Ok(Some(pack)) = toolkit.find_nearest(EntityKind::HealthPack, me.position) {
                if let Ok(action) = toolkit.move_towards(pack) {
                    if action != Action::NoAction {
                        return action;
                    }
                }
            }
        }

        let distance = me.position.manhattan_distance(opponent.position);
        if snapshot.can_shoot()
            && distance <= FIRING_RANGE
            && toolkit.line_of_sight(me.position, opponent.position) == Ok(true)
        {
            if let Ok(action) = toolkit.shoot_towards(opponent.position) {
                if action != Action::NoAction {
                    return action;
                }
            }
        }

        if snapshot.can_place_mine() && distance == 1 {
            if let Ok(action) = toolkit.place_mine_towards(opponent.position) {
                if action != Action::NoAction {
                    return action;
                }
            }
        }

        if let Ok(action) = toolkit.move_towards(opponent.position) {
            if action != Action::NoAction {
                return action;
            }
        }
        Action::NoAction
    }
}
