#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only match intelligence handed to player agents.
//!
//! Agents never touch the world directly. Each round they receive an
//! [`ArenaSnapshot`] — an immutable capture of the arena taken before the
//! agent acts — together with a [`Toolkit`] layering pathfinding, line of
//! sight, search, and directional helpers over that snapshot. Out-of-bounds
//! queries are recoverable [`OutOfBounds`] errors, never panics.

use rand::{Rng, RngCore};
use storm_arena_core::{
    Action, Direction, EntityId, EntityKind, GridPos, OutOfBounds, RoundClock,
};
use storm_arena_pathfinding::WalkabilityGrid;
use storm_arena_world::query::{self, PlayerView, ProjectileView};
use storm_arena_world::World;

/// Decision-making contract for a player combatant.
///
/// Implementations hold whatever private state they like between rounds but
/// observe the match exclusively through the snapshot and toolkit they are
/// handed. Returning an action that cannot be performed is harmless: the
/// world reports it as not performed and the round continues.
pub trait Agent {
    /// Display name used in logs and match reports.
    fn name(&self) -> &str;

    /// Chooses the action to perform this round.
    fn next_action(&mut self, snapshot: &ArenaSnapshot, toolkit: &mut Toolkit<'_>) -> Action;
}

/// Immutable capture of the arena from one player's point of view.
#[derive(Clone, Debug)]
pub struct ArenaSnapshot {
    width: i32,
    height: i32,
    kinds: Vec<EntityKind>,
    me: PlayerView,
    opponent: PlayerView,
    projectiles: Vec<ProjectileView>,
    storm_size: u32,
    storm_max_size: u32,
    clock: RoundClock,
}

impl ArenaSnapshot {
    /// Captures the current world state for the identified player.
    ///
    /// Returns `None` when either player is unknown to the world. A player
    /// marked destroyed but not yet flushed still captures, so an agent can
    /// observe the opponent it just eliminated.
    #[must_use]
    pub fn capture(
        world: &World,
        me: EntityId,
        opponent: EntityId,
        clock: RoundClock,
    ) -> Option<Self> {
        let me = query::player(world, me)?;
        let opponent = query::player(world, opponent)?;
        let width = query::width(world);
        let height = query::height(world);
        let mut kinds = Vec::with_capacity((width * height).max(0) as usize);
        for y in 0..height {
            for x in 0..width {
                kinds.push(query::entity_kind_at(world, GridPos::new(x, y)));
            }
        }
        Some(Self {
            width,
            height,
            kinds,
            me,
            opponent,
            projectiles: query::projectiles(world),
            storm_size: query::storm_size(world),
            storm_max_size: query::storm_max_size(world),
            clock,
        })
    }

    fn index(&self, position: GridPos) -> Result<usize, OutOfBounds> {
        if (0..self.width).contains(&position.x()) && (0..self.height).contains(&position.y()) {
            Ok((position.y() as usize) * (self.width as usize) + position.x() as usize)
        } else {
            Err(OutOfBounds::new(position, self.width, self.height))
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// View of the player this snapshot was captured for.
    #[must_use]
    pub fn me(&self) -> PlayerView {
        self.me
    }

    /// View of the opposing player.
    #[must_use]
    pub fn opponent(&self) -> PlayerView {
        self.opponent
    }

    /// Kind of the entity occupying the cell. Players shadow co-located
    /// entities.
    pub fn entity_kind_at(&self, position: GridPos) -> Result<EntityKind, OutOfBounds> {
        Ok(self.kinds[self.index(position)?])
    }

    /// Whether the coordinate lies outside the grid.
    #[must_use]
    pub fn is_out_of_bounds(&self, position: GridPos) -> bool {
        self.index(position).is_err()
    }

    /// Whether the cell holds no entity.
    pub fn is_empty(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self.entity_kind_at(position)? == EntityKind::Empty)
    }

    /// Whether the cell holds a wall.
    pub fn is_wall(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self.entity_kind_at(position)? == EntityKind::Wall)
    }

    /// Whether the cell holds a mine.
    pub fn is_mine(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self.entity_kind_at(position)? == EntityKind::Mine)
    }

    /// Whether the cell holds a health pack.
    pub fn is_health_pack(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self.entity_kind_at(position)? == EntityKind::HealthPack)
    }

    /// Whether the cell holds a storm cell.
    pub fn is_storm(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self.entity_kind_at(position)? == EntityKind::Storm)
    }

    /// Whether the cell holds a player.
    pub fn is_player(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self.entity_kind_at(position)? == EntityKind::Player)
    }

    /// Whether the cell holds a projectile.
    pub fn is_projectile(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self.entity_kind_at(position)? == EntityKind::Projectile)
    }

    /// Whether the opposing player stands on the cell.
    pub fn is_hostile_player(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self.is_player(position)? && position == self.opponent.position)
    }

    /// Whether this snapshot's own player stands on the cell.
    pub fn is_friendly_player(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self.is_player(position)? && position == self.me.position)
    }

    /// View of the projectile occupying the cell, if any.
    pub fn projectile_at(&self, position: GridPos) -> Result<Option<ProjectileView>, OutOfBounds> {
        let _ = self.index(position)?;
        Ok(self
            .projectiles
            .iter()
            .find(|projectile| projectile.position == position)
            .copied())
    }

    /// Whether the cell holds a projectile fired by the opponent.
    pub fn is_hostile_projectile(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self
            .projectile_at(position)?
            .is_some_and(|projectile| projectile.owner != self.me.id))
    }

    /// Whether the cell holds a projectile fired by this snapshot's player.
    pub fn is_friendly_projectile(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        Ok(self
            .projectile_at(position)?
            .is_some_and(|projectile| projectile.owner == self.me.id))
    }

    /// Every projectile fired by the opponent, in arena order.
    #[must_use]
    pub fn hostile_projectiles(&self) -> Vec<ProjectileView> {
        self.projectiles
            .iter()
            .filter(|projectile| projectile.owner != self.me.id)
            .copied()
            .collect()
    }

    /// Every projectile fired by this snapshot's player, in arena order.
    #[must_use]
    pub fn friendly_projectiles(&self) -> Vec<ProjectileView> {
        self.projectiles
            .iter()
            .filter(|projectile| projectile.owner == self.me.id)
            .copied()
            .collect()
    }

    /// Current storm ring size.
    #[must_use]
    pub fn storm_size(&self) -> u32 {
        self.storm_size
    }

    /// Largest ring size the storm may reach.
    #[must_use]
    pub fn storm_max_size(&self) -> u32 {
        self.storm_max_size
    }

    /// Whether the cell lies within the current storm ring.
    pub fn is_within_storm(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        self.is_within_ring(position, self.storm_size)
    }

    /// Whether the cell would lie within a storm ring of the given size.
    /// Useful for anticipating the next advance.
    pub fn is_within_ring(
        &self,
        position: GridPos,
        ring_size: u32,
    ) -> Result<bool, OutOfBounds> {
        let _ = self.index(position)?;
        Ok(ring_size > 0
            && position.ring_distance(self.width, self.height) <= ring_size as i32)
    }

    /// Number of completed rounds.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.clock.round()
    }

    /// Round count after which the match ends in a draw.
    #[must_use]
    pub fn max_rounds(&self) -> u32 {
        self.clock.max_rounds()
    }

    /// Rounds remaining before the next storm advance.
    #[must_use]
    pub fn rounds_till_storm_advance(&self) -> u32 {
        self.clock.rounds_till_storm_advance()
    }

    /// Whether this snapshot's player may shoot this round.
    #[must_use]
    pub fn can_shoot(&self) -> bool {
        self.me.shoot_cooldown == 0
    }

    /// Whether this snapshot's player may place a mine this round.
    #[must_use]
    pub fn can_place_mine(&self) -> bool {
        self.me.mine_cooldown == 0
    }
}

/// Per-round helper bundle layered over an [`ArenaSnapshot`].
///
/// Holds the walkability grid derived from the snapshot and borrows the
/// session's random number generator so that agent randomness stays under
/// the match seed.
pub struct Toolkit<'a> {
    snapshot: &'a ArenaSnapshot,
    grid: WalkabilityGrid,
    rng: &'a mut dyn RngCore,
}

impl<'a> Toolkit<'a> {
    /// Builds a toolkit for the provided snapshot. Walls and storm cells are
    /// unwalkable; every other cell, occupied or not, admits movement.
    pub fn new(snapshot: &'a ArenaSnapshot, rng: &'a mut dyn RngCore) -> Self {
        let grid = WalkabilityGrid::from_fn(snapshot.width, snapshot.height, |position| {
            !matches!(
                snapshot.entity_kind_at(position),
                Ok(EntityKind::Wall | EntityKind::Storm)
            )
        });
        Self {
            snapshot,
            grid,
            rng,
        }
    }

    /// Whether the cell admits movement: free of walls and storm cells.
    pub fn is_walkable(&self, position: GridPos) -> Result<bool, OutOfBounds> {
        let _ = self.snapshot.index(position)?;
        Ok(self.grid.is_walkable(position))
    }

    /// Shortest path between two cells, excluding `from` and including `to`.
    /// Empty when no path exists or `from == to`.
    pub fn shortest_path(
        &self,
        from: GridPos,
        to: GridPos,
    ) -> Result<Vec<GridPos>, OutOfBounds> {
        let _ = self.snapshot.index(from)?;
        let _ = self.snapshot.index(to)?;
        Ok(storm_arena_pathfinding::shortest_path(&self.grid, from, to))
    }

    /// Whether a path exists between two distinct cells.
    pub fn is_reachable(&self, from: GridPos, to: GridPos) -> Result<bool, OutOfBounds> {
        Ok(!self.shortest_path(from, to)?.is_empty())
    }

    /// Whether an uninterrupted straight line of cells free of walls and
    /// storm connects two cells. Requires the cells to share exactly one
    /// axis; diagonals and identical cells never have line of sight.
    pub fn line_of_sight(&self, from: GridPos, to: GridPos) -> Result<bool, OutOfBounds> {
        let _ = self.snapshot.index(from)?;
        let _ = self.snapshot.index(to)?;
        let Some(direction) = axis_direction(from, to) else {
            return Ok(false);
        };
        let mut cursor = from;
        while cursor != to {
            if matches!(
                self.snapshot.entity_kind_at(cursor)?,
                EntityKind::Wall | EntityKind::Storm
            ) {
                return Ok(false);
            }
            cursor = cursor.step(direction);
        }
        Ok(true)
    }

    /// First step of the shortest path from the player's own cell toward the
    /// target, as a movement action. [`Action::NoAction`] when no path
    /// exists.
    pub fn move_towards(&self, to: GridPos) -> Result<Action, OutOfBounds> {
        let from = self.snapshot.me.position;
        let path = self.shortest_path(from, to)?;
        let Some(&next) = path.first() else {
            return Ok(Action::NoAction);
        };
        Ok(Direction::between(from, next).map_or(Action::NoAction, Action::move_in))
    }

    /// Shoot action aimed along the single axis shared with the target.
    /// [`Action::NoAction`] when the target is diagonal or the player's own
    /// cell.
    pub fn shoot_towards(&self, to: GridPos) -> Result<Action, OutOfBounds> {
        let _ = self.snapshot.index(to)?;
        Ok(axis_direction(self.snapshot.me.position, to)
            .map_or(Action::NoAction, Action::shoot_in))
    }

    /// Mine-placement action aimed along the single axis shared with the
    /// target. [`Action::NoAction`] when the target is diagonal, the
    /// player's own cell, or the mine cooldown has not expired.
    pub fn place_mine_towards(&self, to: GridPos) -> Result<Action, OutOfBounds> {
        let _ = self.snapshot.index(to)?;
        if !self.snapshot.can_place_mine() {
            return Ok(Action::NoAction);
        }
        Ok(axis_direction(self.snapshot.me.position, to)
            .map_or(Action::NoAction, Action::place_mine_in))
    }

    /// Cell of the nearest entity of the kind, by Manhattan distance from
    /// `from`. Ties resolve to the first cell in row-major order.
    pub fn find_nearest(
        &self,
        kind: EntityKind,
        from: GridPos,
    ) -> Result<Option<GridPos>, OutOfBounds> {
        let _ = self.snapshot.index(from)?;
        let mut best: Option<(u32, GridPos)> = None;
        self.scan(kind, |position| {
            let distance = from.manhattan_distance(position);
            if best.map_or(true, |(shortest, _)| distance < shortest) {
                best = Some((distance, position));
            }
        });
        Ok(best.map(|(_, position)| position))
    }

    /// Cell of the furthest entity of the kind, by Manhattan distance from
    /// `from`. Ties resolve to the first cell in row-major order.
    pub fn find_furthest(
        &self,
        kind: EntityKind,
        from: GridPos,
    ) -> Result<Option<GridPos>, OutOfBounds> {
        let _ = self.snapshot.index(from)?;
        let mut best: Option<(u32, GridPos)> = None;
        self.scan(kind, |position| {
            let distance = from.manhattan_distance(position);
            if best.map_or(true, |(longest, _)| distance > longest) {
                best = Some((distance, position));
            }
        });
        Ok(best.map(|(_, position)| position))
    }

    fn scan<F>(&self, kind: EntityKind, mut visit: F)
    where
        F: FnMut(GridPos),
    {
        for y in 0..self.snapshot.height {
            for x in 0..self.snapshot.width {
                let position = GridPos::new(x, y);
                if self.snapshot.entity_kind_at(position) == Ok(kind) {
                    visit(position);
                }
            }
        }
    }

    /// Uniformly random pick from the provided actions, drawn from the match
    /// seed. An empty slice yields [`Action::NoAction`].
    pub fn choose_randomly(&mut self, actions: &[Action]) -> Action {
        if actions.is_empty() {
            return Action::NoAction;
        }
        actions[self.rng.gen_range(0..actions.len())]
    }
}

/// Direction along the single axis shared by two distinct cells.
fn axis_direction(from: GridPos, to: GridPos) -> Option<Direction> {
    if from.x() == to.x() && from.y() != to.y() {
        Some(if to.y() < from.y() {
            Direction::Up
        } else {
            Direction::Down
        })
    } else if from.y() == to.y() && from.x() != to.x() {
        Some(if to.x() < from.x() {
            Direction::Left
        } else {
            Direction::Right
        })
    } else {
        None
    }
}
