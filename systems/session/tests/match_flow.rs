//! End-to-end match flow over the public session API.

use storm_arena_agents::{IdleAgent, RandomAgent, SeekerAgent};
use storm_arena_core::{Event, MatchConfig};
use storm_arena_session::{MatchOutcome, Phase, Session};
use storm_arena_world::query;

fn open_config() -> MatchConfig {
    MatchConfig {
        width: 8,
        height: 8,
        wall_density: 0.0,
        health_pack_density: 0.0,
        ..MatchConfig::default()
    }
}

#[test]
fn storm_closes_in_on_schedule() {
    let mut session = Session::new(
        open_config(),
        [Box::new(IdleAgent), Box::new(IdleAgent)],
        5,
    )
    .expect("setup succeeds");
    let starting_positions: Vec<_> = session
        .players()
        .iter()
        .map(|&player| {
            query::player(session.world(), player)
                .expect("player present")
                .position
        })
        .collect();

    for _ in 0..19 {
        let _ = session.play_round();
    }
    assert_eq!(query::storm_size(session.world()), 0);

    let events = session.play_round();
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::StormAdvanced { size: 1 })));
    assert_eq!(query::storm_size(session.world()), 1);

    for (index, &player) in session.players().iter().enumerate() {
        let ring = starting_positions[index].ring_distance(8, 8);
        if ring <= 1 {
            assert!(!query::is_active(session.world(), player));
        } else {
            assert!(query::is_active(session.world(), player));
            let view = query::player(session.world(), player).expect("survivor present");
            assert_eq!(view.position, starting_positions[index]);
        }
    }
}

#[test]
fn idle_match_terminates_in_a_draw() {
    let mut session = Session::new(
        open_config(),
        [Box::new(IdleAgent), Box::new(IdleAgent)],
        5,
    )
    .expect("setup succeeds");
    let outcome = session.run();
    assert_eq!(outcome, MatchOutcome::Draw);
    assert!(session.round() <= 200);
    assert!(matches!(session.phase(), Phase::GameOver(MatchOutcome::Draw)));
}

#[test]
fn mixed_agents_play_to_a_verdict() {
    let config = MatchConfig {
        width: 10,
        height: 10,
        wall_density: 0.2,
        health_pack_density: 0.02,
        max_rounds: 120,
        ..MatchConfig::default()
    };
    let mut session = Session::new(config, [Box::new(SeekerAgent), Box::new(RandomAgent)], 42)
        .expect("setup succeeds");
    let _ = session.run();
    assert!(session.outcome().is_some());
    assert!(session.round() >= 1);
    assert!(session.round() <= 120);
}
