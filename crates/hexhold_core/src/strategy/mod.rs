//! Per-unit task state machines.
//!
//! Every task kind shares the same shape: IDLE looks for work and requests
//! a move, TRAVELING waits for the arrival event, WORKING runs a recurring
//! timer until the job is exhausted and falls back to IDLE. Each kind is a
//! variant of [`TaskStrategy`]; the [`Strategy`] trait is the contract the
//! unit layer drives:
//!
//! - [`Strategy::apply`] once per tick
//! - [`Strategy::on_arrival`] when navigation reaches a tile
//! - [`Strategy::dispose`] when the unit is removed or retasked
//!
//! Strategies reach the outside world only through [`TaskContext`]: the
//! settlement, an injected [`ResourceSink`], and the event queue.

mod construct;
mod gather;

pub use construct::ConstructStrategy;
pub use gather::GatherStrategy;

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::economy::ResourceSink;
use crate::events::{EventQueue, SettlementEvent};
use crate::settlement::Settlement;
use crate::tile::{ResourceKind, TileId};
use crate::unit::UnitId;

/// Lifecycle state shared by all task kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskState {
    /// Looking for work.
    #[default]
    Idle,
    /// Moving to the work tile; waits for the arrival event.
    Traveling,
    /// On the work tile with the timer running.
    Working,
}

/// What a unit has been told to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Gather the given resource.
    Gather(ResourceKind),
    /// Build unfinished structures.
    Construct,
}

/// Everything a strategy may touch during one call.
pub struct TaskContext<'a> {
    /// Unit driving the strategy.
    pub unit: UnitId,
    /// Tile the unit currently stands on.
    pub position: TileId,
    /// Simulation time at this tick.
    pub now_ms: u64,
    /// Time covered by this tick.
    pub dt_ms: u64,
    /// The settlement (graph, tiles, slots).
    pub settlement: &'a mut Settlement,
    /// Player resource pool.
    pub sink: &'a mut dyn ResourceSink,
    /// Notification queue.
    pub events: &'a mut EventQueue,
    move_request: Option<TileId>,
}

impl<'a> TaskContext<'a> {
    /// Build a context for one strategy call.
    pub fn new(
        unit: UnitId,
        position: TileId,
        now_ms: u64,
        dt_ms: u64,
        settlement: &'a mut Settlement,
        sink: &'a mut dyn ResourceSink,
        events: &'a mut EventQueue,
    ) -> Self {
        Self {
            unit,
            position,
            now_ms,
            dt_ms,
            settlement,
            sink,
            events,
            move_request: None,
        }
    }

    /// Ask navigation to take the unit to `tile` (`moveUnitTo`).
    pub fn request_move(&mut self, tile: TileId) {
        self.move_request = Some(tile);
    }

    /// Consume the pending move request, if any.
    pub fn take_move_request(&mut self) -> Option<TileId> {
        self.move_request.take()
    }

    fn transition(&mut self, state: &mut TaskState, to: TaskState) {
        let from = *state;
        if from == to {
            return;
        }
        *state = to;
        tracing::debug!(unit = %self.unit, ?from, ?to, "Task state changed");
        self.events.push(SettlementEvent::UnitStateChanged {
            unit: self.unit,
            from,
            to,
        });
    }
}

/// Capability set every task kind implements.
pub trait Strategy {
    /// Current lifecycle state.
    fn state(&self) -> TaskState;

    /// Tile the strategy is heading to or working on.
    fn target(&self) -> Option<TileId>;

    /// One scheduling step.
    fn apply(&mut self, ctx: &mut TaskContext<'_>);

    /// Navigation reached `tile`. Returns `false` if the event was stale
    /// (not traveling, or not traveling there) and has been ignored.
    fn on_arrival(&mut self, tile: TileId, ctx: &mut TaskContext<'_>) -> bool;

    /// Release every claim and stop the timer for good.
    fn dispose(&mut self, ctx: &mut TaskContext<'_>);

    /// True once disposed.
    fn is_disposed(&self) -> bool;
}

/// One variant per task kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStrategy {
    /// Resource gathering.
    Gather(GatherStrategy),
    /// Construction.
    Construct(ConstructStrategy),
}

impl TaskStrategy {
    /// Fresh IDLE strategy for `kind`.
    #[must_use]
    pub fn for_task(kind: TaskKind, config: &SimConfig) -> Self {
        match kind {
            TaskKind::Gather(resource) => Self::Gather(GatherStrategy::new(resource, config)),
            TaskKind::Construct => Self::Construct(ConstructStrategy::new(config)),
        }
    }

    /// The task kind this strategy runs.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Gather(g) => TaskKind::Gather(g.resource()),
            Self::Construct(_) => TaskKind::Construct,
        }
    }
}

impl Strategy for TaskStrategy {
    fn state(&self) -> TaskState {
        match self {
            Self::Gather(s) => s.state(),
            Self::Construct(s) => s.state(),
        }
    }

    fn target(&self) -> Option<TileId> {
        match self {
            Self::Gather(s) => s.target(),
            Self::Construct(s) => s.target(),
        }
    }

    fn apply(&mut self, ctx: &mut TaskContext<'_>) {
        match self {
            Self::Gather(s) => s.apply(ctx),
            Self::Construct(s) => s.apply(ctx),
        }
    }

    fn on_arrival(&mut self, tile: TileId, ctx: &mut TaskContext<'_>) -> bool {
        match self {
            Self::Gather(s) => s.on_arrival(tile, ctx),
            Self::Construct(s) => s.on_arrival(tile, ctx),
        }
    }

    fn dispose(&mut self, ctx: &mut TaskContext<'_>) {
        match self {
            Self::Gather(s) => s.dispose(ctx),
            Self::Construct(s) => s.dispose(ctx),
        }
    }

    fn is_disposed(&self) -> bool {
        match self {
            Self::Gather(s) => s.is_disposed(),
            Self::Construct(s) => s.is_disposed(),
        }
    }
}

/// Search throttle for the IDLE state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IdleBackoff {
    retry_ms: u64,
    next_search_ms: u64,
}

impl IdleBackoff {
    fn new(retry_ms: u64) -> Self {
        Self {
            retry_ms,
            next_search_ms: 0,
        }
    }

    fn ready(&self, now_ms: u64) -> bool {
        now_ms >= self.next_search_ms
    }

    fn failed(&mut self, now_ms: u64) {
        self.next_search_ms = now_ms + self.retry_ms;
    }

    fn clear(&mut self) {
        self.next_search_ms = 0;
    }
}
