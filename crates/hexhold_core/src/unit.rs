//! Units: a position on the tile graph, a route, and one task strategy.
//!
//! The unit owns navigation. A strategy asks to move through
//! [`TaskContext::request_move`]; the unit routes the request over the
//! connectivity graph and, in walk mode, steps along the route until the
//! destination is reached and the arrival is handed back to the strategy.

use serde::{Deserialize, Serialize};

use crate::events::SettlementEvent;
use crate::strategy::{Strategy, TaskContext, TaskKind, TaskState, TaskStrategy};
use crate::tile::TileId;

/// Unit identifier, unique within a simulation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Create from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// A worker on the settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    position: TileId,
    /// Current route, `route[0]` being where the move started.
    route: Vec<TileId>,
    cursor: usize,
    step_ticks: u32,
    destination: Option<TileId>,
    strategy: Option<TaskStrategy>,
}

impl Unit {
    /// A unit standing on `position` with no task.
    #[must_use]
    pub fn new(id: UnitId, position: TileId) -> Self {
        Self {
            id,
            position,
            route: Vec::new(),
            cursor: 0,
            step_ticks: 0,
            destination: None,
            strategy: None,
        }
    }

    /// Unit identifier.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Tile the unit stands on.
    #[must_use]
    pub const fn position(&self) -> TileId {
        self.position
    }

    /// Where the unit is heading, if moving.
    #[must_use]
    pub const fn destination(&self) -> Option<TileId> {
        self.destination
    }

    /// Tiles still ahead on the route, destination last.
    #[must_use]
    pub fn remaining_route(&self) -> &[TileId] {
        if self.destination.is_none() {
            return &[];
        }
        &self.route[(self.cursor + 1).min(self.route.len())..]
    }

    /// Task state, IDLE when no task is assigned.
    #[must_use]
    pub fn state(&self) -> TaskState {
        self.strategy.as_ref().map_or(TaskState::Idle, Strategy::state)
    }

    /// Assigned task kind.
    #[must_use]
    pub fn task(&self) -> Option<TaskKind> {
        self.strategy.as_ref().map(TaskStrategy::kind)
    }

    /// Assigned strategy.
    #[must_use]
    pub const fn strategy(&self) -> Option<&TaskStrategy> {
        self.strategy.as_ref()
    }

    /// Replace the current task. The old strategy is disposed first so its
    /// claims are released before the new one searches.
    pub fn assign(&mut self, strategy: TaskStrategy, ctx: &mut TaskContext<'_>) {
        self.dispose_task(ctx);
        tracing::debug!(unit = %self.id, task = ?strategy.kind(), "Task assigned");
        self.strategy = Some(strategy);
    }

    /// Dispose the current task, if any, and stop moving.
    pub fn dispose_task(&mut self, ctx: &mut TaskContext<'_>) {
        if let Some(mut strategy) = self.strategy.take() {
            strategy.dispose(ctx);
        }
        self.clear_route();
    }

    /// One scheduling step: run the strategy and route any move it asked for.
    pub fn apply(&mut self, ctx: &mut TaskContext<'_>) {
        let Some(strategy) = self.strategy.as_mut() else {
            return;
        };
        strategy.apply(ctx);
        if let Some(destination) = ctx.take_move_request() {
            self.begin_move(destination, ctx);
        }
    }

    /// Route to `destination` (`moveUnitTo`).
    ///
    /// A failed route leaves the unit stalled where it stands; a
    /// [`SettlementEvent::MoveFailed`] is raised.
    pub fn begin_move(&mut self, destination: TileId, ctx: &mut TaskContext<'_>) {
        match ctx.settlement.route(self.position, destination) {
            Ok(route) => {
                tracing::debug!(
                    unit = %self.id,
                    from = %self.position,
                    to = %destination,
                    steps = route.len() - 1,
                    "Move started"
                );
                self.route = route;
                self.cursor = 0;
                self.step_ticks = 0;
                self.destination = Some(destination);
            }
            Err(err) => {
                tracing::warn!(unit = %self.id, to = %destination, %err, "Move failed");
                ctx.events.push(SettlementEvent::MoveFailed {
                    unit: self.id,
                    tile: destination,
                });
                self.clear_route();
            }
        }
    }

    /// Advance one tick along the route; one tile per `ticks_per_tile`.
    pub fn walk(&mut self, ticks_per_tile: u32) {
        if self.destination.is_none() || self.cursor + 1 >= self.route.len() {
            return;
        }
        self.step_ticks += 1;
        if self.step_ticks >= ticks_per_tile {
            self.step_ticks = 0;
            self.cursor += 1;
            self.position = self.route[self.cursor];
        }
    }

    /// Destination reached and not yet reported.
    #[must_use]
    pub fn pending_arrival(&self) -> Option<TileId> {
        self.destination.filter(|&d| d == self.position)
    }

    /// Report arrival at `tile` to the strategy.
    ///
    /// An accepted arrival puts the unit on `tile`. Returns `false` when the
    /// strategy ignored it as stale; a stale report for some other tile
    /// leaves position and route untouched.
    pub fn deliver_arrival(&mut self, tile: TileId, ctx: &mut TaskContext<'_>) -> bool {
        let accepted = self
            .strategy
            .as_mut()
            .is_some_and(|s| s.on_arrival(tile, ctx));
        if accepted {
            self.position = tile;
        }
        // Reaching the route's end finishes the move either way.
        if self.position == tile && self.destination == Some(tile) {
            self.clear_route();
        }

        if accepted {
            ctx.events.push(SettlementEvent::UnitArrived {
                unit: self.id,
                tile,
            });
        } else {
            tracing::warn!(unit = %self.id, tile = %tile, "Stale arrival ignored");
            ctx.events.push(SettlementEvent::StaleArrivalIgnored {
                unit: self.id,
                tile,
            });
        }
        accepted
    }

    fn clear_route(&mut self) {
        self.route.clear();
        self.cursor = 0;
        self.step_ticks = 0;
        self.destination = None;
    }
}
