//! Collision resolution for co-located entity pairs.
//!
//! [`resolve_pair`] applies both directions of a contact. Reactions are
//! authored so the symmetric sum produces each net effect exactly once
//! regardless of which entity reacts first: a reaction that merely removes
//! the reactor leaves the substantive effect (damage, healing) to the other
//! entity's reaction, and a reactor marked destroyed by the first leg skips
//! the second.

use storm_arena_core::{EntityId, EntityKind, Event};

use crate::{Entity, World};

/// Resolves a contact between two co-located entities, both directions.
pub(crate) fn resolve_pair(world: &mut World, a: EntityId, b: EntityId, out: &mut Vec<Event>) {
    react(world, a, b, out);
    react(world, b, a, out);
}

fn react(world: &mut World, reactor: EntityId, other: EntityId, out: &mut Vec<Event>) {
    let Some(reactor_entity) = world.entity(reactor) else {
        return;
    };
    if reactor_entity.destroyed {
        return;
    }
    let reactor_kind = reactor_entity.kind();
    let Some(other_kind) = world.entity(other).map(Entity::kind) else {
        return;
    };
    match (reactor_kind, other_kind) {
        (EntityKind::Player, EntityKind::Wall) => world.kill_player(reactor, out),
        (EntityKind::Player, EntityKind::Mine) => {
            world.damage_player(reactor, 1, out);
            world.destroy(other, out);
        }
        (EntityKind::Player, EntityKind::Projectile) => {
            if world.projectile_owner(other) != Some(reactor) {
                world.damage_player(reactor, 1, out);
                world.destroy(other, out);
            }
        }
        (EntityKind::Player, EntityKind::HealthPack) => {
            world.heal_player(reactor, 1, out);
            world.destroy(other, out);
        }
        (EntityKind::Player, EntityKind::Storm) => world.kill_player(reactor, out),
        (EntityKind::Mine, EntityKind::Player | EntityKind::Wall | EntityKind::Storm) => {
            world.destroy(reactor, out);
        }
        (EntityKind::Mine, EntityKind::Projectile) => {
            world.destroy(reactor, out);
            world.destroy(other, out);
        }
        (EntityKind::Projectile, EntityKind::Wall | EntityKind::Storm) => {
            world.destroy(reactor, out);
        }
        (EntityKind::Projectile, EntityKind::Player) => {
            if world.projectile_owner(reactor) != Some(other) {
                world.destroy(reactor, out);
            }
        }
        (EntityKind::Projectile, EntityKind::Mine | EntityKind::Projectile) => {
            world.destroy(reactor, out);
            world.destroy(other, out);
        }
        (EntityKind::Projectile, EntityKind::HealthPack) => {
            if let Some(owner) = world.projectile_owner(reactor) {
                world.heal_player(owner, 1, out);
            }
            world.destroy(reactor, out);
            world.destroy(other, out);
        }
        (
            EntityKind::HealthPack,
            EntityKind::Wall | EntityKind::Storm | EntityKind::Player | EntityKind::Projectile,
        ) => {
            world.destroy(reactor, out);
        }
        (EntityKind::HealthPack, EntityKind::Mine) => {
            world.destroy(reactor, out);
            world.destroy(other, out);
        }
        (
            EntityKind::Wall,
            EntityKind::Mine | EntityKind::Projectile | EntityKind::HealthPack,
        ) => {
            world.destroy(other, out);
        }
        (EntityKind::Wall, EntityKind::Player) => world.kill_player(other, out),
        (EntityKind::Wall, EntityKind::Storm) => world.destroy(reactor, out),
        (EntityKind::Storm, EntityKind::Player) => world.kill_player(other, out),
        (
            EntityKind::Storm,
            EntityKind::Wall | EntityKind::Mine | EntityKind::Projectile | EntityKind::HealthPack,
        ) => {
            world.destroy(other, out);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storm_arena_core::{Direction, GridPos, Health, MatchConfig};

    use crate::{Payload, PlayerState, ProjectileState};

    fn arena() -> World {
        World::new(&MatchConfig {
            width: 8,
            height: 8,
            ..MatchConfig::default()
        })
    }

    fn add_player(world: &mut World, position: GridPos) -> EntityId {
        world.insert(Payload::Player(PlayerState::new()), position)
    }

    fn add_projectile(world: &mut World, position: GridPos, owner: EntityId) -> EntityId {
        world.insert(
            Payload::Projectile(ProjectileState {
                direction: Direction::Right,
                owner,
            }),
            position,
        )
    }

    fn is_destroyed(world: &World, id: EntityId) -> bool {
        world.entity(id).is_none_or(|entity| entity.destroyed)
    }

    fn health_of(world: &World, player: EntityId) -> u8 {
        world
            .player_state(player)
            .map(|state| state.health.get())
            .expect("player present")
    }

    #[test]
    fn mine_contact_costs_one_health_in_either_order() {
        for swap in [false, true] {
            let mut world = arena();
            let cell = GridPos::new(3, 3);
            let player = add_player(&mut world, cell);
            let mine = world.insert(Payload::Mine, cell);
            let mut events = Vec::new();
            let (a, b) = if swap { (mine, player) } else { (player, mine) };
            resolve_pair(&mut world, a, b, &mut events);
            assert_eq!(health_of(&world, player), 2);
            assert!(is_destroyed(&world, mine));
            assert!(!is_destroyed(&world, player));
        }
    }

    #[test]
    fn hostile_projectile_damages_and_expires_in_either_order() {
        for swap in [false, true] {
            let mut world = arena();
            let cell = GridPos::new(3, 3);
            let shooter = add_player(&mut world, GridPos::new(0, 0));
            let target = add_player(&mut world, cell);
            let projectile = add_projectile(&mut world, cell, shooter);
            let mut events = Vec::new();
            let (a, b) = if swap {
                (projectile, target)
            } else {
                (target, projectile)
            };
            resolve_pair(&mut world, a, b, &mut events);
            assert_eq!(health_of(&world, target), 2);
            assert!(is_destroyed(&world, projectile));
        }
    }

    #[test]
    fn owner_contact_leaves_both_untouched() {
        let mut world = arena();
        let cell = GridPos::new(3, 3);
        let shooter = add_player(&mut world, cell);
        let projectile = add_projectile(&mut world, cell, shooter);
        let mut events = Vec::new();
        resolve_pair(&mut world, shooter, projectile, &mut events);
        resolve_pair(&mut world, projectile, shooter, &mut events);
        assert_eq!(health_of(&world, shooter), 3);
        assert!(!is_destroyed(&world, projectile));
        assert!(events.is_empty());
    }

    #[test]
    fn health_pack_heals_one_point_and_vanishes() {
        let mut world = arena();
        let cell = GridPos::new(3, 3);
        let player = add_player(&mut world, cell);
        let pack = world.insert(Payload::HealthPack, cell);
        let mut events = Vec::new();
        world.damage_player(player, 2, &mut events);
        resolve_pair(&mut world, player, pack, &mut events);
        assert_eq!(health_of(&world, player), 2);
        assert!(is_destroyed(&world, pack));
    }

    #[test]
    fn healing_saturates_at_full_health() {
        let mut world = arena();
        let cell = GridPos::new(3, 3);
        let player = add_player(&mut world, cell);
        let mut events = Vec::new();
        world.heal_player(player, 2, &mut events);
        assert_eq!(health_of(&world, player), Health::MAX);
        let pack = world.insert(Payload::HealthPack, cell);
        resolve_pair(&mut world, player, pack, &mut events);
        assert_eq!(health_of(&world, player), Health::MAX);
        assert!(is_destroyed(&world, pack));
    }

    #[test]
    fn storm_contact_is_lethal_in_either_order() {
        for swap in [false, true] {
            let mut world = arena();
            let cell = GridPos::new(0, 0);
            let player = add_player(&mut world, cell);
            let storm = world.insert(Payload::Storm, cell);
            let mut events = Vec::new();
            let (a, b) = if swap { (storm, player) } else { (player, storm) };
            resolve_pair(&mut world, a, b, &mut events);
            assert!(is_destroyed(&world, player));
            assert!(!is_destroyed(&world, storm));
            assert!(events
                .iter()
                .any(|event| matches!(event, Event::PlayerDied { player: died } if *died == player)));
        }
    }

    #[test]
    fn projectile_detonates_a_mine() {
        let mut world = arena();
        let cell = GridPos::new(3, 3);
        let shooter = add_player(&mut world, GridPos::new(0, 0));
        let mine = world.insert(Payload::Mine, cell);
        let projectile = add_projectile(&mut world, cell, shooter);
        let mut events = Vec::new();
        resolve_pair(&mut world, mine, projectile, &mut events);
        assert!(is_destroyed(&world, mine));
        assert!(is_destroyed(&world, projectile));
    }

    #[test]
    fn projectile_collects_a_pack_for_its_owner() {
        for swap in [false, true] {
            let mut world = arena();
            let cell = GridPos::new(3, 3);
            let shooter = add_player(&mut world, GridPos::new(0, 0));
            let mut events = Vec::new();
            world.damage_player(shooter, 2, &mut events);
            let pack = world.insert(Payload::HealthPack, cell);
            let projectile = add_projectile(&mut world, cell, shooter);
            let (a, b) = if swap {
                (pack, projectile)
            } else {
                (projectile, pack)
            };
            resolve_pair(&mut world, a, b, &mut events);
            assert_eq!(health_of(&world, shooter), 2);
            assert!(is_destroyed(&world, pack));
            assert!(is_destroyed(&world, projectile));
        }
    }

    #[test]
    fn crossing_projectiles_destroy_each_other() {
        let mut world = arena();
        let cell = GridPos::new(3, 3);
        let shooter = add_player(&mut world, GridPos::new(0, 0));
        let first = add_projectile(&mut world, cell, shooter);
        let second = add_projectile(&mut world, cell, shooter);
        let mut events = Vec::new();
        resolve_pair(&mut world, first, second, &mut events);
        assert!(is_destroyed(&world, first));
        assert!(is_destroyed(&world, second));
    }

    fn add_of_kind(
        world: &mut World,
        kind: EntityKind,
        position: GridPos,
        shooter: EntityId,
    ) -> EntityId {
        match kind {
            EntityKind::Wall => world.insert(Payload::Wall, position),
            EntityKind::Mine => world.insert(Payload::Mine, position),
            EntityKind::HealthPack => world.insert(Payload::HealthPack, position),
            EntityKind::Storm => world.insert(Payload::Storm, position),
            EntityKind::Projectile => add_projectile(world, position, shooter),
            _ => unreachable!("static contact table only"),
        }
    }

    #[test]
    fn non_player_contacts_settle_the_same_in_either_order() {
        let cases = [
            (EntityKind::Storm, EntityKind::Mine, false, true),
            (EntityKind::Storm, EntityKind::Projectile, false, true),
            (EntityKind::Storm, EntityKind::HealthPack, false, true),
            (EntityKind::Wall, EntityKind::Mine, false, true),
            (EntityKind::Wall, EntityKind::Projectile, false, true),
            (EntityKind::Wall, EntityKind::HealthPack, false, true),
            (EntityKind::HealthPack, EntityKind::Mine, true, true),
        ];
        for (first_kind, second_kind, first_gone, second_gone) in cases {
            for swap in [false, true] {
                let mut world = arena();
                let cell = GridPos::new(3, 3);
                let shooter = add_player(&mut world, GridPos::new(0, 0));
                let first = add_of_kind(&mut world, first_kind, cell, shooter);
                let second = add_of_kind(&mut world, second_kind, cell, shooter);
                let mut events = Vec::new();
                let (a, b) = if swap { (second, first) } else { (first, second) };
                resolve_pair(&mut world, a, b, &mut events);
                assert_eq!(
                    is_destroyed(&world, first),
                    first_gone,
                    "{first_kind:?} against {second_kind:?}, swapped {swap}"
                );
                assert_eq!(
                    is_destroyed(&world, second),
                    second_gone,
                    "{first_kind:?} against {second_kind:?}, swapped {swap}"
                );
                assert_eq!(health_of(&world, shooter), 3);
            }
        }
    }

    #[test]
    fn storm_sweeps_static_entities() {
        let mut world = arena();
        let cell = GridPos::new(0, 0);
        let wall = world.insert(Payload::Wall, cell);
        let storm = world.insert(Payload::Storm, cell);
        let mut events = Vec::new();
        resolve_pair(&mut world, storm, wall, &mut events);
        assert!(is_destroyed(&world, wall));
        assert!(!is_destroyed(&world, storm));
    }
}
