//! Resource gathering.
//!
//! The unit walks to the nearest free slot of its resource, drains it one
//! timer firing at a time, and moves on when the slot is empty. The slot is
//! claimed the moment it is chosen, so no other idle unit can pick it while
//! this one is still on the way.

use crate::config::SimConfig;
use crate::events::SettlementEvent;
use crate::tile::{ResourceKind, TileId};
use crate::timer::RecurringTimer;

use super::{IdleBackoff, Strategy, TaskContext, TaskState};

/// Gather state machine for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatherStrategy {
    resource: ResourceKind,
    state: TaskState,
    /// Tile whose slot this unit holds; set from IDLE until release.
    claimed: Option<TileId>,
    timer: RecurringTimer,
    extraction_amount: u32,
    backoff: IdleBackoff,
    disposed: bool,
}

impl GatherStrategy {
    /// New IDLE gatherer for `resource`.
    #[must_use]
    pub fn new(resource: ResourceKind, config: &SimConfig) -> Self {
        Self {
            resource,
            state: TaskState::Idle,
            claimed: None,
            timer: RecurringTimer::new(config.generate_period_ms),
            extraction_amount: config.extraction_amount,
            backoff: IdleBackoff::new(config.idle_retry_ms),
            disposed: false,
        }
    }

    /// Resource this unit gathers.
    #[must_use]
    pub const fn resource(&self) -> ResourceKind {
        self.resource
    }

    /// Tile of the claimed slot, if any.
    #[must_use]
    pub const fn claimed_slot(&self) -> Option<TileId> {
        self.claimed
    }

    /// The work timer.
    #[must_use]
    pub const fn timer(&self) -> &RecurringTimer {
        &self.timer
    }

    fn find_and_go_to_nearest_resource(&mut self, ctx: &mut TaskContext<'_>) {
        if !self.backoff.ready(ctx.now_ms) {
            return;
        }

        let found = match ctx.settlement.find_nearest_resource(self.resource, ctx.position) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(unit = %ctx.unit, %err, "Resource search failed");
                None
            }
        };

        let Some(tile) = found else {
            tracing::warn!(unit = %ctx.unit, kind = ?self.resource, "No resource available");
            ctx.events.push(SettlementEvent::NoResourceAvailable {
                unit: ctx.unit,
                kind: self.resource,
            });
            self.backoff.failed(ctx.now_ms);
            return;
        };

        // Searches skip occupied slots and units run one at a time, so
        // this claim cannot lose a race.
        if let Err(err) = ctx.settlement.claim_slot(tile) {
            tracing::warn!(unit = %ctx.unit, tile = %tile, %err, "Slot claim refused");
            self.backoff.failed(ctx.now_ms);
            return;
        }

        tracing::debug!(unit = %ctx.unit, tile = %tile, kind = ?self.resource, "Slot claimed");
        ctx.events.push(SettlementEvent::SlotClaimed {
            unit: ctx.unit,
            tile,
        });
        self.claimed = Some(tile);
        self.backoff.clear();
        ctx.request_move(tile);
        ctx.transition(&mut self.state, TaskState::Traveling);
    }

    fn generate(&mut self, ctx: &mut TaskContext<'_>) {
        let Some(tile) = self.claimed else {
            unreachable!("gatherer {} is working without a claimed slot", ctx.unit);
        };

        self.timer.start();
        let firings = self.timer.advance(ctx.dt_ms);

        for _ in 0..firings {
            if self.slot_depleted(tile, ctx) {
                break;
            }
            let extracted = match ctx.settlement.extract(tile, self.extraction_amount) {
                Ok(amount) => amount,
                Err(err) => unreachable!("gatherer {} lost its claimed slot: {err}", ctx.unit),
            };
            ctx.sink.credit(self.resource, extracted);
            tracing::debug!(unit = %ctx.unit, tile = %tile, extracted, "Resource generated");
            ctx.events.push(SettlementEvent::ResourceCredited {
                unit: ctx.unit,
                kind: self.resource,
                amount: extracted,
            });
        }

        if self.slot_depleted(tile, ctx) {
            tracing::info!(unit = %ctx.unit, tile = %tile, "Resource slot depleted");
            ctx.events.push(SettlementEvent::ResourceDepleted {
                unit: ctx.unit,
                tile,
            });
            self.timer.reset();
            self.release(ctx);
            ctx.transition(&mut self.state, TaskState::Idle);
        }
    }

    fn slot_depleted(&self, tile: TileId, ctx: &TaskContext<'_>) -> bool {
        match ctx.settlement.slot(tile) {
            Some(slot) => slot.is_depleted(),
            None => unreachable!("gatherer {} claimed {tile}, which has no slot", ctx.unit),
        }
    }

    fn release(&mut self, ctx: &mut TaskContext<'_>) {
        if let Some(tile) = self.claimed.take() {
            if let Err(err) = ctx.settlement.release_slot(tile) {
                tracing::warn!(unit = %ctx.unit, tile = %tile, %err, "Slot release failed");
            }
            tracing::debug!(unit = %ctx.unit, tile = %tile, "Slot released");
            ctx.events.push(SettlementEvent::SlotReleased {
                unit: ctx.unit,
                tile,
            });
        }
    }
}

impl Strategy for GatherStrategy {
    fn state(&self) -> TaskState {
        self.state
    }

    fn target(&self) -> Option<TileId> {
        self.claimed
    }

    fn apply(&mut self, ctx: &mut TaskContext<'_>) {
        if self.disposed {
            return;
        }
        match self.state {
            TaskState::Idle => self.find_and_go_to_nearest_resource(ctx),
            // Navigation reports arrival.
            TaskState::Traveling => {}
            TaskState::Working => self.generate(ctx),
        }
    }

    fn on_arrival(&mut self, tile: TileId, ctx: &mut TaskContext<'_>) -> bool {
        if self.disposed || self.state != TaskState::Traveling || self.claimed != Some(tile) {
            return false;
        }
        ctx.transition(&mut self.state, TaskState::Working);
        true
    }

    fn dispose(&mut self, ctx: &mut TaskContext<'_>) {
        if self.disposed {
            return;
        }
        self.release(ctx);
        self.timer.stop();
        self.state = TaskState::Idle;
        self.disposed = true;
        tracing::debug!(unit = %ctx.unit, "Gather strategy disposed");
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::Harness;

    fn gatherer() -> GatherStrategy {
        GatherStrategy::new(ResourceKind::Wood, &SimConfig::default())
    }

    /// Drive `strategy` from IDLE through arrival.
    fn arrive(strategy: &mut GatherStrategy, h: &mut Harness) {
        let mut ctx = h.ctx(1);
        strategy.apply(&mut ctx);
        let target = ctx.take_move_request().unwrap();
        assert!(strategy.on_arrival(target, &mut ctx));
        h.position = target;
    }

    #[test]
    fn test_idle_claims_and_requests_move() {
        let mut h = Harness::with_wood(20);
        let wood = h.wood_tile();
        let mut g = gatherer();

        let mut ctx = h.ctx(1);
        g.apply(&mut ctx);

        assert_eq!(ctx.take_move_request(), Some(wood));
        assert_eq!(g.state(), TaskState::Traveling);
        assert_eq!(g.claimed_slot(), Some(wood));
        assert!(h.settlement.slot(wood).unwrap().is_occupied());
    }

    #[test]
    fn test_idle_without_resource_stays_idle_and_backs_off() {
        let mut h = Harness::with_wood(20);
        let mut g = GatherStrategy::new(ResourceKind::Rock, &SimConfig::default());

        g.apply(&mut h.ctx(1));
        assert_eq!(g.state(), TaskState::Idle);
        assert_eq!(h.events.len(), 1);

        // Within the 500 ms backoff window no new search happens.
        for _ in 0..9 {
            g.apply(&mut h.ctx(1));
        }
        assert_eq!(h.events.len(), 1);

        g.apply(&mut h.ctx(1));
        assert_eq!(h.events.len(), 2);
    }

    #[test]
    fn test_arrival_elsewhere_is_ignored() {
        let mut h = Harness::with_wood(20);
        let mut g = gatherer();

        let mut ctx = h.ctx(1);
        g.apply(&mut ctx);
        assert!(!g.on_arrival(TileId::new(0), &mut ctx));
        assert_eq!(g.state(), TaskState::Traveling);
    }

    #[test]
    fn test_arrival_while_idle_is_ignored() {
        let mut h = Harness::with_wood(20);
        let wood = h.wood_tile();
        let mut g = gatherer();

        assert!(!g.on_arrival(wood, &mut h.ctx(1)));
        assert_eq!(g.state(), TaskState::Idle);
    }

    #[test]
    fn test_depletes_after_one_firing() {
        let mut h = Harness::with_wood(10);
        let wood = h.wood_tile();
        let mut g = gatherer();
        arrive(&mut g, &mut h);
        assert_eq!(g.state(), TaskState::Working);

        // 2000 ms at 50 ms per tick.
        for _ in 0..39 {
            g.apply(&mut h.ctx(1));
            assert_eq!(g.state(), TaskState::Working);
        }
        g.apply(&mut h.ctx(1));

        assert_eq!(g.state(), TaskState::Idle);
        let slot = h.settlement.slot(wood).unwrap();
        assert_eq!(slot.amount(), 0);
        assert!(!slot.is_occupied());
        assert_eq!(h.pool.get(ResourceKind::Wood), 10);
        assert!(!g.timer().is_running());
        assert_eq!(g.timer().elapsed_ms(), 0);
    }

    #[test]
    #[should_panic(expected = "has no slot")]
    fn test_working_on_a_tile_without_slot_is_fatal() {
        let mut h = Harness::with_wood(10);
        let mut g = gatherer();
        arrive(&mut g, &mut h);
        // The origin tile of the starter carries no resource.
        g.claimed = Some(TileId::new(0));

        for _ in 0..40 {
            g.apply(&mut h.ctx(1));
        }
    }

    #[test]
    fn test_partial_final_extraction_credits_actual_amount() {
        let mut h = Harness::with_wood(15);
        let mut g = gatherer();
        arrive(&mut g, &mut h);

        for _ in 0..80 {
            g.apply(&mut h.ctx(1));
        }
        assert_eq!(h.pool.get(ResourceKind::Wood), 15);
        assert_eq!(g.state(), TaskState::Idle);
    }

    #[test]
    fn test_dispose_while_working_releases_and_stops() {
        let mut h = Harness::with_wood(100);
        let wood = h.wood_tile();
        let mut g = gatherer();
        arrive(&mut g, &mut h);
        g.apply(&mut h.ctx(1));
        assert!(g.timer().is_running());

        g.dispose(&mut h.ctx(1));
        assert!(!h.settlement.slot(wood).unwrap().is_occupied());
        assert!(g.timer().is_stopped());

        for _ in 0..200 {
            g.apply(&mut h.ctx(1));
        }
        assert_eq!(h.pool.get(ResourceKind::Wood), 0);
        assert_eq!(h.settlement.slot(wood).unwrap().amount(), 100);
    }

    #[test]
    fn test_dispose_while_traveling_releases_claim() {
        let mut h = Harness::with_wood(20);
        let wood = h.wood_tile();
        let mut g = gatherer();
        g.apply(&mut h.ctx(1));
        assert!(h.settlement.slot(wood).unwrap().is_occupied());

        g.dispose(&mut h.ctx(1));
        assert!(!h.settlement.slot(wood).unwrap().is_occupied());
        assert!(!g.on_arrival(wood, &mut h.ctx(1)));
    }
}
