//! Construction work on unfinished structures.
//!
//! Builders share sites; nothing is claimed. Each timer firing applies a
//! fixed amount of work and the last firing completes the structure.

use crate::config::SimConfig;
use crate::events::SettlementEvent;
use crate::tile::TileId;
use crate::timer::RecurringTimer;

use super::{IdleBackoff, Strategy, TaskContext, TaskState};

/// Build state machine for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructStrategy {
    state: TaskState,
    site: Option<TileId>,
    timer: RecurringTimer,
    work_per_firing: u32,
    backoff: IdleBackoff,
    disposed: bool,
}

impl ConstructStrategy {
    /// New IDLE builder.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        Self {
            state: TaskState::Idle,
            site: None,
            timer: RecurringTimer::new(config.generate_period_ms),
            work_per_firing: config.build_work_per_firing,
            backoff: IdleBackoff::new(config.idle_retry_ms),
            disposed: false,
        }
    }

    /// The work timer.
    #[must_use]
    pub const fn timer(&self) -> &RecurringTimer {
        &self.timer
    }

    fn find_site(&mut self, ctx: &mut TaskContext<'_>) {
        if !self.backoff.ready(ctx.now_ms) {
            return;
        }

        match ctx.settlement.find_nearest_construction_site(ctx.position) {
            Ok(Some(tile)) => {
                tracing::debug!(unit = %ctx.unit, tile = %tile, "Construction site chosen");
                self.site = Some(tile);
                self.backoff.clear();
                ctx.request_move(tile);
                ctx.transition(&mut self.state, TaskState::Traveling);
            }
            Ok(None) => {
                tracing::debug!(unit = %ctx.unit, "No construction site");
                self.backoff.failed(ctx.now_ms);
            }
            Err(err) => {
                tracing::warn!(unit = %ctx.unit, %err, "Construction search failed");
                self.backoff.failed(ctx.now_ms);
            }
        }
    }

    fn build(&mut self, ctx: &mut TaskContext<'_>) {
        let Some(tile) = self.site else {
            unreachable!("builder {} is working without a site", ctx.unit);
        };

        // Someone else may have finished it while this unit walked over.
        if !ctx.settlement.is_under_construction(tile).unwrap_or(false) {
            self.finish(ctx);
            return;
        }

        self.timer.start();
        for _ in 0..self.timer.advance(ctx.dt_ms) {
            match ctx.settlement.apply_work(tile, self.work_per_firing) {
                Ok(Some(structure)) => {
                    ctx.events
                        .push(SettlementEvent::StructureCompleted { structure });
                    self.finish(ctx);
                    return;
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(unit = %ctx.unit, tile = %tile, %err, "Work not applied");
                    self.finish(ctx);
                    return;
                }
            }
        }
    }

    fn finish(&mut self, ctx: &mut TaskContext<'_>) {
        self.timer.reset();
        self.site = None;
        ctx.transition(&mut self.state, TaskState::Idle);
    }
}

impl Strategy for ConstructStrategy {
    fn state(&self) -> TaskState {
        self.state
    }

    fn target(&self) -> Option<TileId> {
        self.site
    }

    fn apply(&mut self, ctx: &mut TaskContext<'_>) {
        if self.disposed {
            return;
        }
        match self.state {
            TaskState::Idle => self.find_site(ctx),
            TaskState::Traveling => {}
            TaskState::Working => self.build(ctx),
        }
    }

    fn on_arrival(&mut self, tile: TileId, ctx: &mut TaskContext<'_>) -> bool {
        if self.disposed || self.state != TaskState::Traveling || self.site != Some(tile) {
            return false;
        }
        ctx.transition(&mut self.state, TaskState::Working);
        true
    }

    fn dispose(&mut self, ctx: &mut TaskContext<'_>) {
        if self.disposed {
            return;
        }
        self.timer.stop();
        self.site = None;
        self.state = TaskState::Idle;
        self.disposed = true;
        tracing::debug!(unit = %ctx.unit, "Construct strategy disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
