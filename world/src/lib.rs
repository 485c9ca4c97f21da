#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative arena state for Storm Arena matches.
//!
//! The world owns every entity on the grid and is the only place state
//! mutates. Callers submit [`Command`] values through [`apply`] and receive
//! [`Event`] values describing the mutations that actually happened; the
//! [`query`] module exposes read-only views for snapshot capture.
//!
//! Destruction is a two-phase affair: entities are first marked destroyed
//! (and stop participating in updates and collisions) and are physically
//! removed at the next flush barrier. A tick flushes once before updating
//! the roster and once after the collision pass.

use storm_arena_core::{
    Action, Command, Direction, EntityId, EntityKind, Event, GridPos, Health, MatchConfig,
};

mod resolution;

/// Mutable match state: grid dimensions, the entity arena, and the storm.
#[derive(Clone, Debug)]
pub struct World {
    width: i32,
    height: i32,
    shoot_cooldown: u32,
    mine_cooldown: u32,
    entities: Vec<Entity>,
    players: Vec<EntityId>,
    next_id: u32,
    storm_size: u32,
    storm_max_size: u32,
}

#[derive(Clone, Debug)]
struct Entity {
    id: EntityId,
    position: GridPos,
    destroyed: bool,
    payload: Payload,
}

impl Entity {
    fn kind(&self) -> EntityKind {
        match self.payload {
            Payload::Wall => EntityKind::Wall,
            Payload::Mine => EntityKind::Mine,
            Payload::HealthPack => EntityKind::HealthPack,
            Payload::Storm => EntityKind::Storm,
            Payload::Player(_) => EntityKind::Player,
            Payload::Projectile(_) => EntityKind::Projectile,
        }
    }
}

#[derive(Clone, Debug)]
enum Payload {
    Wall,
    Mine,
    HealthPack,
    Storm,
    Player(PlayerState),
    Projectile(ProjectileState),
}

#[derive(Clone, Copy, Debug)]
struct PlayerState {
    health: Health,
    shoot_cooldown: u32,
    mine_cooldown: u32,
    facing: i8,
}

impl PlayerState {
    fn new() -> Self {
        Self {
            health: Health::starting(),
            shoot_cooldown: 0,
            mine_cooldown: 0,
            facing: 1,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ProjectileState {
    direction: Direction,
    owner: EntityId,
}

impl World {
    /// Creates an empty world sized according to the provided configuration.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            shoot_cooldown: config.shoot_cooldown,
            mine_cooldown: config.mine_cooldown,
            entities: Vec::new(),
            players: Vec::new(),
            next_id: 0,
            storm_size: 0,
            storm_max_size: config.storm_max_size(),
        }
    }

    fn in_bounds(&self, position: GridPos) -> bool {
        (0..self.width).contains(&position.x()) && (0..self.height).contains(&position.y())
    }

    fn in_storm(&self, position: GridPos) -> bool {
        self.storm_size > 0
            && position.ring_distance(self.width, self.height) <= self.storm_size as i32
    }

    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    /// First live entity occupying the cell; players shadow everything else.
    fn entity_at(&self, position: GridPos) -> Option<&Entity> {
        for &player in &self.players {
            if let Some(entity) = self.entity(player) {
                if !entity.destroyed && entity.position == position {
                    return Some(entity);
                }
            }
        }
        self.entities
            .iter()
            .find(|entity| !entity.destroyed && entity.position == position)
    }

    fn storm_at(&self, position: GridPos) -> bool {
        self.entities.iter().any(|entity| {
            !entity.destroyed
                && entity.position == position
                && matches!(entity.payload, Payload::Storm)
        })
    }

    fn can_place(&self, kind: EntityKind, position: GridPos) -> bool {
        if !self.in_bounds(position) {
            return false;
        }
        let occupied = |blocking: fn(EntityKind) -> bool| {
            self.entities.iter().any(|entity| {
                !entity.destroyed && entity.position == position && blocking(entity.kind())
            })
        };
        match kind {
            EntityKind::Wall | EntityKind::Player | EntityKind::HealthPack => !occupied(|_| true),
            EntityKind::Mine | EntityKind::Projectile => {
                !occupied(|kind| matches!(kind, EntityKind::Wall | EntityKind::Storm))
            }
            EntityKind::Storm => !self.storm_at(position),
            EntityKind::Empty => false,
        }
    }

    fn insert(&mut self, payload: Payload, position: GridPos) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        let is_player = matches!(payload, Payload::Player(_));
        self.entities.push(Entity {
            id,
            position,
            destroyed: false,
            payload,
        });
        if is_player {
            self.players.push(id);
        }
        id
    }

    /// Marks the entity destroyed. Removal waits for the next flush barrier,
    /// but the entity stops participating in updates and collisions now.
    fn destroy(&mut self, id: EntityId, out: &mut Vec<Event>) {
        let Some(entity) = self.entity_mut(id) else {
            return;
        };
        if entity.destroyed {
            return;
        }
        entity.destroyed = true;
        let kind = entity.kind();
        let position = entity.position;
        out.push(Event::EntityDestroyed { id, kind, position });
        if kind == EntityKind::Player {
            self.players.retain(|player| *player != id);
            out.push(Event::PlayerDied { player: id });
        }
    }

    fn flush(&mut self) {
        self.entities.retain(|entity| !entity.destroyed);
    }

    fn player_state(&self, player: EntityId) -> Option<&PlayerState> {
        match self.entity(player) {
            Some(Entity {
                payload: Payload::Player(state),
                ..
            }) => Some(state),
            _ => None,
        }
    }

    fn player_state_mut(&mut self, player: EntityId) -> Option<&mut PlayerState> {
        match self.entity_mut(player) {
            Some(Entity {
                payload: Payload::Player(state),
                ..
            }) => Some(state),
            _ => None,
        }
    }

    fn set_player_health(&mut self, player: EntityId, health: Health, out: &mut Vec<Event>) {
        let Some(entity) = self.entity_mut(player) else {
            return;
        };
        if entity.destroyed {
            return;
        }
        let Payload::Player(state) = &mut entity.payload else {
            return;
        };
        if state.health == health {
            return;
        }
        state.health = health;
        out.push(Event::PlayerHealthChanged { player, health });
        if health.is_zero() {
            self.destroy(player, out);
        }
    }

    fn damage_player(&mut self, player: EntityId, amount: u8, out: &mut Vec<Event>) {
        if let Some(health) = self.player_state(player).map(|state| state.health) {
            self.set_player_health(player, health.lose(amount), out);
        }
    }

    fn heal_player(&mut self, player: EntityId, amount: u8, out: &mut Vec<Event>) {
        if let Some(health) = self.player_state(player).map(|state| state.health) {
            self.set_player_health(player, health.gain(amount), out);
        }
    }

    fn kill_player(&mut self, player: EntityId, out: &mut Vec<Event>) {
        self.set_player_health(player, Health::new(0), out);
    }

    fn projectile_owner(&self, id: EntityId) -> Option<EntityId> {
        match self.entity(id) {
            Some(Entity {
                payload: Payload::Projectile(state),
                ..
            }) => Some(state.owner),
            _ => None,
        }
    }

    fn spawn(&mut self, kind: EntityKind, payload: Payload, position: GridPos, out: &mut Vec<Event>) {
        if !self.can_place(kind, position) {
            out.push(Event::SpawnRejected { kind, position });
            return;
        }
        let id = self.insert(payload, position);
        if kind == EntityKind::Player {
            out.push(Event::PlayerSpawned {
                player: id,
                position,
            });
        } else {
            out.push(Event::EntitySpawned { id, kind, position });
        }
    }

    fn update_facing(&mut self, player: EntityId, direction: Direction) {
        let facing = match direction {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Up | Direction::Down => return,
        };
        if let Some(state) = self.player_state_mut(player) {
            state.facing = facing;
        }
    }

    fn perform_action(&mut self, player: EntityId, action: Action, out: &mut Vec<Event>) -> bool {
        let alive = self
            .entity(player)
            .is_some_and(|entity| !entity.destroyed && entity.kind() == EntityKind::Player);
        if !alive {
            return false;
        }
        let Some(direction) = action.direction() else {
            return true;
        };
        match action {
            Action::MoveUp | Action::MoveDown | Action::MoveLeft | Action::MoveRight => {
                self.move_player(player, direction, out)
            }
            Action::ShootUp | Action::ShootDown | Action::ShootLeft | Action::ShootRight => {
                self.shoot(player, direction, out)
            }
            Action::PlaceMineUp
            | Action::PlaceMineDown
            | Action::PlaceMineLeft
            | Action::PlaceMineRight => self.place_mine(player, direction, out),
            Action::NoAction => true,
        }
    }

    fn move_player(&mut self, player: EntityId, direction: Direction, out: &mut Vec<Event>) -> bool {
        self.update_facing(player, direction);
        let Some(origin) = self.entity(player).map(|entity| entity.position) else {
            return false;
        };
        let destination = origin.step(direction);
        if !self.in_bounds(destination) {
            return false;
        }
        let blocked = self.entities.iter().any(|entity| {
            !entity.destroyed
                && entity.position == destination
                && matches!(entity.kind(), EntityKind::Wall | EntityKind::Player)
        });
        if blocked {
            return false;
        }
        let occupant = self
            .entities
            .iter()
            .find(|entity| !entity.destroyed && entity.position == destination)
            .map(|entity| entity.id);
        if let Some(entity) = self.entity_mut(player) {
            entity.position = destination;
        }
        if let Some(other) = occupant {
            resolution::resolve_pair(self, player, other, out);
        }
        true
    }

    /// Fires a projectile into the adjacent cell. An expired cooldown is
    /// consumed by the attempt even when the spawn cell rejects the
    /// projectile.
    fn shoot(&mut self, player: EntityId, direction: Direction, out: &mut Vec<Event>) -> bool {
        self.update_facing(player, direction);
        if !self.player_state(player).is_some_and(|state| state.shoot_cooldown == 0) {
            return false;
        }
        let cooldown = self.shoot_cooldown;
        if let Some(state) = self.player_state_mut(player) {
            state.shoot_cooldown = cooldown;
        }
        let Some(origin) = self.entity(player).map(|entity| entity.position) else {
            return false;
        };
        let destination = origin.step(direction);
        if !self.can_place(EntityKind::Projectile, destination) {
            return false;
        }
        let id = self.insert(
            Payload::Projectile(ProjectileState {
                direction,
                owner: player,
            }),
            destination,
        );
        out.push(Event::EntitySpawned {
            id,
            kind: EntityKind::Projectile,
            position: destination,
        });
        true
    }

    fn place_mine(&mut self, player: EntityId, direction: Direction, out: &mut Vec<Event>) -> bool {
        self.update_facing(player, direction);
        if !self.player_state(player).is_some_and(|state| state.mine_cooldown == 0) {
            return false;
        }
        let cooldown = self.mine_cooldown;
        if let Some(state) = self.player_state_mut(player) {
            state.mine_cooldown = cooldown;
        }
        let Some(origin) = self.entity(player).map(|entity| entity.position) else {
            return false;
        };
        let destination = origin.step(direction);
        if !self.can_place(EntityKind::Mine, destination) {
            return false;
        }
        let id = self.insert(Payload::Mine, destination);
        out.push(Event::EntitySpawned {
            id,
            kind: EntityKind::Mine,
            position: destination,
        });
        true
    }

    fn update_entity(&mut self, id: EntityId, out: &mut Vec<Event>) {
        let Some(entity) = self.entity(id) else {
            return;
        };
        if entity.destroyed {
            return;
        }
        match entity.payload {
            Payload::Player(_) => {
                if let Some(state) = self.player_state_mut(id) {
                    state.shoot_cooldown = state.shoot_cooldown.saturating_sub(1);
                    state.mine_cooldown = state.mine_cooldown.saturating_sub(1);
                }
            }
            Payload::Projectile(state) => {
                let destination = entity.position.step(state.direction);
                if !self.in_bounds(destination) {
                    self.destroy(id, out);
                    return;
                }
                let occupant = self
                    .entities
                    .iter()
                    .find(|other| {
                        !other.destroyed && other.id != id && other.position == destination
                    })
                    .map(|other| (other.id, other.kind()));
                // A projectile expires in place against a wall or storm cell;
                // its recorded position never enters the blocking cell.
                let blocked = occupant.is_some_and(|(_, kind)| {
                    matches!(kind, EntityKind::Wall | EntityKind::Storm)
                });
                if !blocked {
                    if let Some(entity) = self.entity_mut(id) {
                        entity.position = destination;
                    }
                }
                if let Some((other, _)) = occupant {
                    resolution::resolve_pair(self, id, other, out);
                }
            }
            Payload::Wall | Payload::Mine | Payload::HealthPack | Payload::Storm => {}
        }
    }

    fn tick(&mut self, roster: &[EntityId], out: &mut Vec<Event>) {
        self.flush();
        for &id in roster {
            self.update_entity(id, out);
        }
        let ids: Vec<EntityId> = self.entities.iter().map(|entity| entity.id).collect();
        for (index, &first) in ids.iter().enumerate() {
            for &second in &ids[index + 1..] {
                let colliding = match (self.entity(first), self.entity(second)) {
                    (Some(a), Some(b)) => {
                        !a.destroyed && !b.destroyed && a.position == b.position
                    }
                    _ => false,
                };
                if colliding {
                    resolution::resolve_pair(self, first, second, out);
                }
            }
        }
        self.flush();
    }

    fn advance_storm(&mut self, out: &mut Vec<Event>) {
        self.storm_size = (self.storm_size + 1).min(self.storm_max_size);
        for y in 0..self.height {
            for x in 0..self.width {
                let position = GridPos::new(x, y);
                if !self.in_storm(position) || self.storm_at(position) {
                    continue;
                }
                let occupant = self.entity_at(position).map(|entity| entity.id);
                let storm = self.insert(Payload::Storm, position);
                if let Some(other) = occupant {
                    resolution::resolve_pair(self, storm, other, out);
                }
            }
        }
        self.flush();
        out.push(Event::StormAdvanced {
            size: self.storm_size,
        });
    }
}

/// Executes a command against the world, appending resulting events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnWall { position } => {
            world.spawn(EntityKind::Wall, Payload::Wall, position, out_events);
        }
        Command::SpawnHealthPack { position } => {
            world.spawn(
                EntityKind::HealthPack,
                Payload::HealthPack,
                position,
                out_events,
            );
        }
        Command::SpawnPlayer { position } => {
            world.spawn(
                EntityKind::Player,
                Payload::Player(PlayerState::new()),
                position,
                out_events,
            );
        }
        Command::Perform { player, action } => {
            let performed = world.perform_action(player, action, out_events);
            out_events.push(Event::ActionResolved {
                player,
                action,
                performed,
            });
        }
        Command::Tick { roster } => world.tick(&roster, out_events),
        Command::AdvanceStorm => world.advance_storm(out_events),
    }
}

/// Read-only views over the world for snapshot capture and orchestration.
pub mod query {
    use storm_arena_core::{Direction, EntityId, EntityKind, GridPos, Health};

    use crate::{Payload, World};

    /// Immutable description of a player combatant.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlayerView {
        /// Identifier of the player.
        pub id: EntityId,
        /// Cell the player occupies.
        pub position: GridPos,
        /// Current health.
        pub health: Health,
        /// Rounds until the player may shoot again.
        pub shoot_cooldown: u32,
        /// Rounds until the player may place a mine again.
        pub mine_cooldown: u32,
        /// Horizontal facing: `1` for right, `-1` for left. Presentation
        /// only; no rule consults it.
        pub facing: i8,
    }

    /// Immutable description of a projectile in flight.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ProjectileView {
        /// Identifier of the projectile.
        pub id: EntityId,
        /// Cell the projectile occupies.
        pub position: GridPos,
        /// Direction of travel.
        pub direction: Direction,
        /// Player that fired the projectile.
        pub owner: EntityId,
    }

    /// Grid width in cells.
    #[must_use]
    pub fn width(world: &World) -> i32 {
        world.width
    }

    /// Grid height in cells.
    #[must_use]
    pub fn height(world: &World) -> i32 {
        world.height
    }

    /// Current storm ring size.
    #[must_use]
    pub fn storm_size(world: &World) -> u32 {
        world.storm_size
    }

    /// Largest ring size the storm may reach on this grid.
    #[must_use]
    pub fn storm_max_size(world: &World) -> u32 {
        world.storm_max_size
    }

    /// Kind of the entity occupying the cell, [`EntityKind::Empty`] when the
    /// cell is vacant or out of bounds. Players shadow co-located entities.
    #[must_use]
    pub fn entity_kind_at(world: &World, position: GridPos) -> EntityKind {
        world
            .entity_at(position)
            .map_or(EntityKind::Empty, |entity| entity.kind())
    }

    /// Whether placement rules admit an entity of `kind` at `position`.
    #[must_use]
    pub fn placement_allowed(world: &World, kind: EntityKind, position: GridPos) -> bool {
        world.can_place(kind, position)
    }

    /// Views of every active player, in spawn order.
    #[must_use]
    pub fn players(world: &World) -> Vec<PlayerView> {
        world
            .players
            .iter()
            .filter_map(|&id| player(world, id))
            .collect()
    }

    /// View of the identified player, including one marked destroyed but not
    /// yet flushed.
    #[must_use]
    pub fn player(world: &World, id: EntityId) -> Option<PlayerView> {
        let entity = world.entity(id)?;
        let Payload::Player(state) = &entity.payload else {
            return None;
        };
        Some(PlayerView {
            id,
            position: entity.position,
            health: state.health,
            shoot_cooldown: state.shoot_cooldown,
            mine_cooldown: state.mine_cooldown,
            facing: state.facing,
        })
    }

    /// Views of every live projectile, in arena order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileView> {
        world
            .entities
            .iter()
            .filter(|entity| !entity.destroyed)
            .filter_map(|entity| match &entity.payload {
                Payload::Projectile(state) => Some(ProjectileView {
                    id: entity.id,
                    position: entity.position,
                    direction: state.direction,
                    owner: state.owner,
                }),
                _ => None,
            })
            .collect()
    }

    /// Identifiers of every live entity, in arena order. Captured by the
    /// orchestrator before agents act so that entities spawned mid-round
    /// first update on the following round.
    #[must_use]
    pub fn live_roster(world: &World) -> Vec<EntityId> {
        world
            .entities
            .iter()
            .filter(|entity| !entity.destroyed)
            .map(|entity| entity.id)
            .collect()
    }

    /// Whether the identified player is still in active play.
    #[must_use]
    pub fn is_active(world: &World, player: EntityId) -> bool {
        world.players.contains(&player)
    }

    /// Whether the cell admits pathfinding: in bounds and free of walls and
    /// storm cells.
    #[must_use]
    pub fn is_walkable(world: &World, position: GridPos) -> bool {
        world.in_bounds(position)
            && !matches!(
                entity_kind_at(world, position),
                EntityKind::Wall | EntityKind::Storm
            )
    }

    /// Whether the cell lies within the current storm ring.
    #[must_use]
    pub fn is_within_storm(world: &World, position: GridPos) -> bool {
        world.in_storm(position)
    }
}
