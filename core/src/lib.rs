#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Storm Arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The session orchestrator submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point and broadcasts [`Event`] values
//! describing what actually happened. Agents never see commands or events;
//! they consume read-only snapshots and reply with an [`Action`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell, zero-based with the origin at the
/// top-left corner.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPos {
    x: i32,
    y: i32,
}

impl GridPos {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell, growing to the right.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the cell, growing downwards.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the Euclidean distance between two positions.
    #[must_use]
    pub fn euclidean_distance(self, other: GridPos) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns the position one cell away in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> GridPos {
        let (dx, dy) = direction.delta();
        GridPos::new(self.x + dx, self.y + dy)
    }

    /// Distance of the cell from the nearest edge of a `width` by `height`
    /// grid: `min(min(x+1, width-x), min(y+1, height-y))`.
    ///
    /// The storm occupies every cell whose ring distance does not exceed the
    /// current storm size.
    #[must_use]
    pub fn ring_distance(self, width: i32, height: i32) -> i32 {
        let horizontal = (self.x + 1).min(width - self.x);
        let vertical = (self.y + 1).min(height - self.y);
        horizontal.min(vertical)
    }
}

/// Cardinal movement directions used by actions and projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices, `(0, -1)`.
    Up,
    /// Movement toward increasing row indices, `(0, 1)`.
    Down,
    /// Movement toward decreasing column indices, `(-1, 0)`.
    Left,
    /// Movement toward increasing column indices, `(1, 0)`.
    Right,
}

impl Direction {
    /// Unit offset of the direction as `(dx, dy)`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Direction of the single step separating two positions, if they are
    /// orthogonally adjacent.
    #[must_use]
    pub fn between(from: GridPos, to: GridPos) -> Option<Direction> {
        let dx = to.x() - from.x();
        let dy = to.y() - from.y();
        match (dx, dy) {
            (0, -1) => Some(Self::Up),
            (0, 1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            _ => None,
        }
    }
}

/// Discrete action a player agent may perform in a round.
///
/// Agents must return exactly one action per round; when nothing useful is
/// available there is [`Action::NoAction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// The player performs no action this round. Always succeeds.
    NoAction,
    /// The player moves one cell up, unless blocked.
    MoveUp,
    /// The player moves one cell down, unless blocked.
    MoveDown,
    /// The player moves one cell left, unless blocked.
    MoveLeft,
    /// The player moves one cell right, unless blocked.
    MoveRight,
    /// The player fires a projectile upwards.
    ShootUp,
    /// The player fires a projectile downwards.
    ShootDown,
    /// The player fires a projectile to the left.
    ShootLeft,
    /// The player fires a projectile to the right.
    ShootRight,
    /// The player places a mine on the cell above itself.
    PlaceMineUp,
    /// The player places a mine on the cell below itself.
    PlaceMineDown,
    /// The player places a mine on the cell to its left.
    PlaceMineLeft,
    /// The player places a mine on the cell to its right.
    PlaceMineRight,
}

impl Action {
    /// Every defined action, in declaration order.
    pub const ALL: [Action; 13] = [
        Action::NoAction,
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::ShootUp,
        Action::ShootDown,
        Action::ShootLeft,
        Action::ShootRight,
        Action::PlaceMineUp,
        Action::PlaceMineDown,
        Action::PlaceMineLeft,
        Action::PlaceMineRight,
    ];

    /// Movement action along the provided direction.
    #[must_use]
    pub const fn move_in(direction: Direction) -> Action {
        match direction {
            Direction::Up => Action::MoveUp,
            Direction::Down => Action::MoveDown,
            Direction::Left => Action::MoveLeft,
            Direction::Right => Action::MoveRight,
        }
    }

    /// Shoot action along the provided direction.
    #[must_use]
    pub const fn shoot_in(direction: Direction) -> Action {
        match direction {
            Direction::Up => Action::ShootUp,
            Direction::Down => Action::ShootDown,
            Direction::Left => Action::ShootLeft,
            Direction::Right => Action::ShootRight,
        }
    }

    /// Mine-placement action along the provided direction.
    #[must_use]
    pub const fn place_mine_in(direction: Direction) -> Action {
        match direction {
            Direction::Up => Action::PlaceMineUp,
            Direction::Down => Action::PlaceMineDown,
            Direction::Left => Action::PlaceMineLeft,
            Direction::Right => Action::PlaceMineRight,
        }
    }

    /// Direction associated with the action, if any.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            Action::NoAction => None,
            Action::MoveUp | Action::ShootUp | Action::PlaceMineUp => Some(Direction::Up),
            Action::MoveDown | Action::ShootDown | Action::PlaceMineDown => Some(Direction::Down),
            Action::MoveLeft | Action::ShootLeft | Action::PlaceMineLeft => Some(Direction::Left),
            Action::MoveRight | Action::ShootRight | Action::PlaceMineRight => {
                Some(Direction::Right)
            }
        }
    }
}

/// Kinds of entity a grid cell may resolve to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The cell holds no entity.
    Empty,
    /// Impassable wall. Blocks movement, pathfinding and line of sight.
    Wall,
    /// An agent-controlled combatant.
    Player,
    /// A placed mine: damages a player on contact, detonated by projectiles
    /// and the storm.
    Mine,
    /// A projectile in flight along one axis.
    Projectile,
    /// A health pack restoring one health point on pickup.
    HealthPack,
    /// A storm cell. Kills players and destroys everything else it touches.
    Storm,
}

/// Unique identifier assigned to an entity by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Player health, clamped into `[0, Health::MAX]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u8);

impl Health {
    /// Upper bound on health.
    pub const MAX: u8 = 5;
    /// Health assigned to a freshly spawned player.
    pub const STARTING: u8 = 3;

    /// Creates a health value, clamping into `[0, Health::MAX]`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    /// Health assigned to a freshly spawned player.
    #[must_use]
    pub const fn starting() -> Self {
        Self(Self::STARTING)
    }

    /// Retrieves the numeric health value.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether the health has reached zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds health points, saturating at [`Health::MAX`].
    #[must_use]
    pub const fn gain(self, amount: u8) -> Self {
        Self::new(self.0.saturating_add(amount))
    }

    /// Removes health points, saturating at zero.
    #[must_use]
    pub const fn lose(self, amount: u8) -> Self {
        Self(self.0.saturating_sub(amount))
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests placement of a wall during arena generation.
    SpawnWall {
        /// Cell the wall should occupy.
        position: GridPos,
    },
    /// Requests placement of a health pack during arena generation.
    SpawnHealthPack {
        /// Cell the health pack should occupy.
        position: GridPos,
    },
    /// Requests placement of a player combatant.
    SpawnPlayer {
        /// Cell the player should occupy.
        position: GridPos,
    },
    /// Requests that a player perform its chosen action for the round.
    Perform {
        /// Identifier of the acting player.
        player: EntityId,
        /// Action the player's agent selected.
        action: Action,
    },
    /// Advances the simulation by one tick: flushes pending removals,
    /// updates every roster entity, resolves collisions, and flushes again.
    Tick {
        /// Entities that were alive when the round began. Entities spawned
        /// mid-round are excluded and first update on the following tick.
        roster: Vec<EntityId>,
    },
    /// Grows the storm ring by one and materializes storm cells.
    AdvanceStorm,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a non-player entity entered the arena.
    EntitySpawned {
        /// Identifier assigned by the world.
        id: EntityId,
        /// Kind of entity spawned.
        kind: EntityKind,
        /// Cell the entity occupies.
        position: GridPos,
    },
    /// Confirms that a player combatant entered the arena.
    PlayerSpawned {
        /// Identifier assigned by the world.
        player: EntityId,
        /// Cell the player occupies.
        position: GridPos,
    },
    /// Reports that a spawn request was rejected by placement rules.
    SpawnRejected {
        /// Kind of entity requested.
        kind: EntityKind,
        /// Destination cell provided in the request.
        position: GridPos,
    },
    /// Reports the outcome of a player's action for the round.
    ActionResolved {
        /// Identifier of the acting player.
        player: EntityId,
        /// Action that was attempted.
        action: Action,
        /// Whether the action took effect. Blocked moves and unexpired
        /// cooldowns report `false`; this is not an error.
        performed: bool,
    },
    /// Reports that a player's health changed.
    PlayerHealthChanged {
        /// Identifier of the affected player.
        player: EntityId,
        /// Health after the change, clamped into `[0, Health::MAX]`.
        health: Health,
    },
    /// Confirms that an entity was marked destroyed. The entity remains
    /// queryable until the next removal barrier.
    EntityDestroyed {
        /// Identifier of the destroyed entity.
        id: EntityId,
        /// Kind of the destroyed entity.
        kind: EntityKind,
        /// Cell the entity occupied when destroyed.
        position: GridPos,
    },
    /// Announces that a player left active play.
    PlayerDied {
        /// Identifier of the dead player.
        player: EntityId,
    },
    /// Announces that the storm ring grew.
    StormAdvanced {
        /// Ring size after the advance.
        size: u32,
    },
}

/// Tunable parameters of a match.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Grid width in cells. Must be at least [`MatchConfig::MIN_DIMENSION`].
    pub width: i32,
    /// Grid height in cells. Must be at least [`MatchConfig::MIN_DIMENSION`].
    pub height: i32,
    /// Probability in `[0, 1]` that a generated cell carries a wall.
    pub wall_density: f64,
    /// Probability in `[0, 1]` that a generated cell carries a health pack.
    pub health_pack_density: f64,
    /// Number of rounds between storm advances.
    pub storm_interval: u32,
    /// Round count after which the match ends in a draw.
    pub max_rounds: u32,
    /// Rounds a player must wait between mine placements.
    pub mine_cooldown: u32,
    /// Rounds a player must wait between shots.
    pub shoot_cooldown: u32,
    /// Fraction of the arena the storm may ultimately cover, in `(0, 1]`.
    pub storm_coverage: f64,
}

impl MatchConfig {
    /// Smallest supported grid edge length.
    pub const MIN_DIMENSION: i32 = 8;

    /// Validates the configuration against the documented ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < Self::MIN_DIMENSION || self.height < Self::MIN_DIMENSION {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if !(0.0..=1.0).contains(&self.wall_density) {
            return Err(ConfigError::DensityOutOfRange {
                name: "wall_density",
                value: self.wall_density,
            });
        }
        if !(0.0..=1.0).contains(&self.health_pack_density) {
            return Err(ConfigError::DensityOutOfRange {
                name: "health_pack_density",
                value: self.health_pack_density,
            });
        }
        if !(0.0..=1.0).contains(&self.storm_coverage) || self.storm_coverage == 0.0 {
            return Err(ConfigError::DensityOutOfRange {
                name: "storm_coverage",
                value: self.storm_coverage,
            });
        }
        if self.storm_interval == 0 || self.max_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        Ok(())
    }

    /// Largest ring size the storm may reach on this grid:
    /// `max(1, floor(sqrt(width * height / 2) * storm_coverage))`.
    #[must_use]
    pub fn storm_max_size(&self) -> u32 {
        let half_area = f64::from(self.width) * f64::from(self.height) / 2.0;
        let scaled = (half_area.sqrt() * self.storm_coverage).floor();
        (scaled as u32).max(1)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            wall_density: 0.3,
            health_pack_density: 0.02,
            storm_interval: 20,
            max_rounds: 200,
            mine_cooldown: 10,
            shoot_cooldown: 3,
            storm_coverage: 0.65,
        }
    }
}

/// Reasons a [`MatchConfig`] may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Grid dimensions fall below the supported minimum.
    #[error("grid {width}x{height} is smaller than the {min}x{min} minimum", min = MatchConfig::MIN_DIMENSION)]
    GridTooSmall {
        /// Requested grid width.
        width: i32,
        /// Requested grid height.
        height: i32,
    },
    /// A density or coverage ratio lies outside its documented range.
    #[error("{name} = {value} lies outside its valid range")]
    DensityOutOfRange {
        /// Name of the offending field.
        name: &'static str,
        /// Provided value.
        value: f64,
    },
    /// The storm interval or the round limit is zero.
    #[error("storm interval and max rounds must be positive")]
    ZeroRounds,
}

/// Round bookkeeping shared between the orchestrator and agent snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundClock {
    round: u32,
    max_rounds: u32,
    storm_interval: u32,
}

impl RoundClock {
    /// Creates a clock at round zero.
    #[must_use]
    pub const fn new(max_rounds: u32, storm_interval: u32) -> Self {
        Self {
            round: 0,
            max_rounds,
            storm_interval,
        }
    }

    /// Number of completed rounds.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Round count after which the match ends in a draw.
    #[must_use]
    pub const fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Rounds remaining before the next storm advance.
    #[must_use]
    pub const fn rounds_till_storm_advance(&self) -> u32 {
        self.storm_interval - self.round % self.storm_interval
    }

    /// Marks one more round as completed.
    pub fn advance(&mut self) {
        self.round = self.round.saturating_add(1);
    }

    /// Reports whether the storm is due to advance after the round that
    /// just completed.
    #[must_use]
    pub const fn storm_due(&self) -> bool {
        self.round > 0 && self.round % self.storm_interval == 0
    }

    /// Reports whether the round limit has been reached.
    #[must_use]
    pub const fn expired(&self) -> bool {
        self.round >= self.max_rounds
    }
}

/// Signaled when a query receives a coordinate outside the grid.
///
/// This condition is recoverable: callers treat it as "no such cell" and
/// fall back, it never terminates a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("position ({x}, {y}) lies outside the {width}x{height} grid")]
pub struct OutOfBounds {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl OutOfBounds {
    /// Captures the offending position together with the grid bounds.
    #[must_use]
    pub const fn new(position: GridPos, width: i32, height: i32) -> Self {
        Self {
            x: position.x(),
            y: position.y(),
            width,
            height,
        }
    }

    /// Offending position.
    #[must_use]
    pub const fn position(&self) -> GridPos {
        GridPos::new(self.x, self.y)
    }
}
