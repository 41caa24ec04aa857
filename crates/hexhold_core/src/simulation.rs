//! Core simulation loop.
//!
//! The simulation owns the settlement, the units and the resource pool and
//! advances them at a fixed tick rate. Each tick visits units in id order:
//!
//! 1. The unit's strategy runs one step; any move it requests is routed.
//! 2. In [`NavigationMode::Walk`] the unit steps along its route.
//! 3. A unit standing on its destination gets the arrival delivered.
//!
//! # Determinism
//!
//! - No floating-point math (tile centers use [`Fixed`](crate::math::Fixed))
//! - No randomness and no wall clock; time is `tick * tick_duration`
//! - Units in a `BTreeMap`, graph adjacency sorted, ties broken by
//!   registration order
//!
//! # Example
//!
//! ```
//! use hexhold_core::prelude::*;
//!
//! let mut sim = Simulation::with_starter(SimConfig::default()).unwrap();
//! let unit = sim.spawn_unit(None).unwrap();
//! sim.assign_task(unit, TaskKind::Gather(ResourceKind::Wood)).unwrap();
//! sim.tick();
//! assert_eq!(sim.current_tick(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::config::{NavigationMode, SimConfig};
use crate::economy::ResourcePool;
use crate::error::{Result, SettlementError};
use crate::events::{EventQueue, SettlementEvent};
use crate::hex::HexCoord;
use crate::settlement::Settlement;
use crate::snapshot::{SettlementSnapshot, SlotView, StructureView, UnitView};
use crate::strategy::{TaskContext, TaskKind, TaskStrategy};
use crate::structure::{Structure, StructureId, StructureTemplate};
use crate::tile::TileId;
use crate::unit::{Unit, UnitId};

/// The settlement simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    settlement: Settlement,
    units: BTreeMap<UnitId, Unit>,
    pool: ResourcePool,
    events: EventQueue,
    tick: u64,
    next_unit_id: u32,
}

impl Simulation {
    /// Empty simulation.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let settlement = Settlement::new(config.layout(), config.neighbor_threshold());
        Ok(Self {
            config,
            settlement,
            units: BTreeMap::new(),
            pool: ResourcePool::new(),
            events: EventQueue::new(),
            tick: 0,
            next_unit_id: 1,
        })
    }

    /// Simulation with the 4x4 starter platform at the origin.
    ///
    /// # Errors
    ///
    /// Returns [`SettlementError::InvalidConfig`] if `config` fails validation.
    pub fn with_starter(config: SimConfig) -> Result<Self> {
        let mut sim = Self::new(config)?;
        sim.place_structure(Structure::new(
            StructureTemplate::starter(),
            HexCoord::default(),
        ))?;
        Ok(sim)
    }

    /// Place a finished structure.
    ///
    /// # Errors
    ///
    /// [`SettlementError::PlacementRejected`] if it overlaps or floats free.
    pub fn place_structure(&mut self, structure: Structure) -> Result<StructureId> {
        let id = self.settlement.add_structure(structure)?;
        self.events.push(SettlementEvent::StructurePlaced { structure: id });
        Ok(id)
    }

    /// Place a construction site needing `work` before it is complete.
    ///
    /// # Errors
    ///
    /// [`SettlementError::PlacementRejected`] if it overlaps or floats free.
    pub fn place_construction_site(
        &mut self,
        structure: Structure,
        work: u32,
    ) -> Result<StructureId> {
        let id = self.settlement.add_construction_site(structure, work)?;
        self.events.push(SettlementEvent::StructurePlaced { structure: id });
        Ok(id)
    }

    /// Spawn a task-less unit on `position`, or on the starter tile.
    ///
    /// # Errors
    ///
    /// [`SettlementError::UnknownTile`] if the tile does not exist or the
    /// settlement is still empty.
    pub fn spawn_unit(&mut self, position: Option<TileId>) -> Result<UnitId> {
        let position = position
            .or_else(|| self.settlement.starter_tile())
            .unwrap_or(TileId::new(0));
        if self.settlement.tile(position).is_none() {
            return Err(SettlementError::UnknownTile(position));
        }

        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, Unit::new(id, position));
        tracing::info!(unit = %id, position = %position, "Unit spawned");
        Ok(id)
    }

    /// Give `unit` a fresh strategy for `kind`, disposing the old one.
    ///
    /// # Errors
    ///
    /// [`SettlementError::UnknownUnit`] if the unit does not exist.
    pub fn assign_task(&mut self, unit: UnitId, kind: TaskKind) -> Result<()> {
        let strategy = TaskStrategy::for_task(kind, &self.config);
        self.with_unit_context(unit, |u, ctx| u.assign(strategy, ctx))
    }

    /// Dispose the unit's task and remove it.
    ///
    /// # Errors
    ///
    /// [`SettlementError::UnknownUnit`] if the unit does not exist.
    pub fn remove_unit(&mut self, unit: UnitId) -> Result<()> {
        self.with_unit_context(unit, Unit::dispose_task)?;
        self.units.remove(&unit);
        tracing::info!(unit = %unit, "Unit removed");
        Ok(())
    }

    /// Report that an outside navigation layer brought `unit` to `tile`.
    ///
    /// Returns `false` when the strategy ignored the arrival as stale.
    ///
    /// # Errors
    ///
    /// [`SettlementError::UnknownUnit`] or [`SettlementError::UnknownTile`].
    pub fn notify_arrival(&mut self, unit: UnitId, tile: TileId) -> Result<bool> {
        if self.settlement.tile(tile).is_none() {
            return Err(SettlementError::UnknownTile(tile));
        }
        self.with_unit_context(unit, |u, ctx| u.deliver_arrival(tile, ctx))
    }

    /// Advance one tick; returns the events raised since the last drain.
    pub fn tick(&mut self) -> Vec<SettlementEvent> {
        let dt = self.config.tick_duration_ms();
        let now = (self.tick + 1) * dt;

        let Self {
            config,
            settlement,
            units,
            pool,
            events,
            ..
        } = self;

        for unit in units.values_mut() {
            let mut ctx = TaskContext::new(
                unit.id(),
                unit.position(),
                now,
                dt,
                &mut *settlement,
                &mut *pool,
                &mut *events,
            );
            unit.apply(&mut ctx);

            if config.navigation == NavigationMode::Walk {
                unit.walk(config.walk_ticks_per_tile);
            }

            if let Some(tile) = unit.pending_arrival() {
                let mut ctx = TaskContext::new(
                    unit.id(),
                    unit.position(),
                    now,
                    dt,
                    &mut *settlement,
                    &mut *pool,
                    &mut *events,
                );
                unit.deliver_arrival(tile, &mut ctx);
            }
        }

        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        self.events.drain()
    }

    /// Run `ticks` ticks and return every event raised, in order.
    pub fn run(&mut self, ticks: u64) -> Vec<SettlementEvent> {
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(self.tick());
        }
        all
    }

    /// Events raised outside a tick and not yet drained.
    #[must_use]
    pub fn pending_events(&self) -> &[SettlementEvent] {
        self.events.pending()
    }

    /// Ticks elapsed.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Simulation time in milliseconds.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.tick * self.config.tick_duration_ms()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The settlement.
    #[must_use]
    pub const fn settlement(&self) -> &Settlement {
        &self.settlement
    }

    /// Unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// All units in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Player stockpile.
    #[must_use]
    pub const fn resources(&self) -> &ResourcePool {
        &self.pool
    }

    /// Read-only view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SettlementSnapshot {
        let structures = self
            .settlement
            .structures()
            .iter()
            .map(|placed| StructureView {
                id: placed.id,
                name: placed.structure.template.name.clone(),
                origin: placed.structure.origin,
                tiles: placed.tiles.len(),
                progress: placed.status.percentage(),
            })
            .collect();

        let slots = self
            .settlement
            .tiles()
            .iter()
            .filter_map(|tile| {
                tile.slot.map(|slot| SlotView {
                    tile: tile.id(),
                    coord: tile.coord(),
                    kind: slot.kind,
                    amount: slot.amount(),
                    occupied: slot.is_occupied(),
                })
            })
            .collect();

        SettlementSnapshot {
            tick: self.tick,
            structures,
            slots,
            units: self.units.values().map(UnitView::from).collect(),
            resources: self.pool.totals(),
        }
    }

    /// Hash of the observable state.
    ///
    /// Two simulations fed the same inputs produce the same hash at every
    /// tick.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.snapshot().hash(&mut hasher);
        hasher.finish()
    }

    fn with_unit_context<R>(
        &mut self,
        id: UnitId,
        f: impl FnOnce(&mut Unit, &mut TaskContext<'_>) -> R,
    ) -> Result<R> {
        let dt = self.config.tick_duration_ms();
        let now = self.tick * dt;
        let unit = self
            .units
            .get_mut(&id)
            .ok_or(SettlementError::UnknownUnit(id))?;
        let mut ctx = TaskContext::new(
            id,
            unit.position(),
            now,
            dt,
            &mut self.settlement,
            &mut self.pool,
            &mut self.events,
        );
        Ok(f(unit, &mut ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::TaskState;
    use crate::tile::ResourceKind;

    const WOOD: HexCoord = HexCoord::new(3, 3);

    fn sim_with_wood(amount: u32, navigation: NavigationMode) -> Simulation {
        let config = SimConfig {
            navigation,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(config).unwrap();
        sim.place_structure(Structure::new(
            StructureTemplate::starter().with_resource(WOOD, ResourceKind::Wood, amount),
            HexCoord::default(),
        ))
        .unwrap();
        sim
    }

    fn wood_tile(sim: &Simulation) -> TileId {
        sim.settlement().tile_at(WOOD).unwrap()
    }

    fn gatherer(sim: &mut Simulation) -> UnitId {
        let unit = sim.spawn_unit(None).unwrap();
        sim.assign_task(unit, TaskKind::Gather(ResourceKind::Wood))
            .unwrap();
        unit
    }

    #[test]
    fn test_external_arrival_end_to_end() {
        let mut sim = sim_with_wood(20, NavigationMode::External);
        let wood = wood_tile(&sim);
        let unit = gatherer(&mut sim);

        sim.tick();
        assert_eq!(sim.unit(unit).unwrap().state(), TaskState::Traveling);
        assert!(sim.notify_arrival(unit, wood).unwrap());
        assert_eq!(sim.unit(unit).unwrap().state(), TaskState::Working);

        sim.run(80);

        assert_eq!(sim.resources().get(ResourceKind::Wood), 20);
        let slot = sim.settlement().slot(wood).unwrap();
        assert!(slot.is_depleted());
        assert!(!slot.is_occupied());
        assert_eq!(sim.unit(unit).unwrap().state(), TaskState::Idle);
    }

    #[test]
    fn test_stale_notify_arrival_keeps_unit_on_its_route() {
        let mut sim = sim_with_wood(20, NavigationMode::Walk);
        let unit = gatherer(&mut sim);
        sim.tick();

        let before = sim.unit(unit).unwrap().clone();
        let elsewhere = sim.settlement().tile_at(HexCoord::new(0, 3)).unwrap();
        assert!(!sim.notify_arrival(unit, elsewhere).unwrap());

        let after = sim.unit(unit).unwrap();
        assert_eq!(after.position(), before.position());
        assert_eq!(after.remaining_route(), before.remaining_route());
        assert_eq!(after.state(), TaskState::Traveling);

        // Walking resumes from the original tile, one step at a time.
        sim.run(29);
        assert_eq!(sim.unit(unit).unwrap().position(), wood_tile(&sim));
        assert_eq!(sim.unit(unit).unwrap().state(), TaskState::Working);
    }

    #[test]
    fn test_walk_mode_arrives_and_gathers() {
        let mut sim = sim_with_wood(10, NavigationMode::Walk);
        let unit = gatherer(&mut sim);

        // Six steps at five ticks each.
        sim.run(29);
        assert_eq!(sim.unit(unit).unwrap().state(), TaskState::Traveling);
        sim.tick();
        assert_eq!(sim.unit(unit).unwrap().state(), TaskState::Working);
        assert_eq!(sim.unit(unit).unwrap().position(), wood_tile(&sim));

        sim.run(39);
        assert_eq!(sim.resources().get(ResourceKind::Wood), 0);
        sim.tick();
        assert_eq!(sim.resources().get(ResourceKind::Wood), 10);
    }

    #[test]
    fn test_two_units_never_share_a_slot() {
        let mut sim = sim_with_wood(20, NavigationMode::External);
        let first = gatherer(&mut sim);
        let second = gatherer(&mut sim);

        let events = sim.tick();

        assert_eq!(sim.unit(first).unwrap().state(), TaskState::Traveling);
        assert_eq!(sim.unit(second).unwrap().state(), TaskState::Idle);
        assert!(events.contains(&SettlementEvent::NoResourceAvailable {
            unit: second,
            kind: ResourceKind::Wood,
        }));
    }

    #[test]
    fn test_removed_unit_stops_crediting() {
        let mut sim = sim_with_wood(100, NavigationMode::External);
        let wood = wood_tile(&sim);
        let unit = gatherer(&mut sim);
        sim.tick();
        sim.notify_arrival(unit, wood).unwrap();

        sim.run(50);
        assert_eq!(sim.resources().get(ResourceKind::Wood), 10);

        sim.remove_unit(unit).unwrap();
        sim.run(200);

        assert_eq!(sim.resources().get(ResourceKind::Wood), 10);
        let slot = sim.settlement().slot(wood).unwrap();
        assert_eq!(slot.amount(), 90);
        assert!(!slot.is_occupied());
    }

    #[test]
    fn test_retask_while_traveling_frees_slot_for_others() {
        let mut sim = sim_with_wood(20, NavigationMode::External);
        let wood = wood_tile(&sim);
        let first = gatherer(&mut sim);
        sim.tick();
        assert!(sim.settlement().slot(wood).unwrap().is_occupied());

        sim.assign_task(first, TaskKind::Construct).unwrap();
        assert!(!sim.settlement().slot(wood).unwrap().is_occupied());

        let second = gatherer(&mut sim);
        sim.tick();
        assert_eq!(sim.unit(second).unwrap().state(), TaskState::Traveling);
        // The old arrival is stale for the retasked unit.
        assert!(!sim.notify_arrival(first, wood).unwrap());
    }

    #[test]
    fn test_builders_complete_site() {
        let mut sim = Simulation::with_starter(SimConfig::default()).unwrap();
        let site = sim
            .place_construction_site(
                Structure::new(StructureTemplate::hut(), HexCoord::new(4, 0)),
                20,
            )
            .unwrap();
        let unit = sim.spawn_unit(None).unwrap();
        sim.assign_task(unit, TaskKind::Construct).unwrap();

        let events = sim.run(300);

        assert!(events.contains(&SettlementEvent::StructureCompleted { structure: site }));
        assert!(sim.settlement().structure(site).unwrap().status.is_complete());
    }

    #[test]
    fn test_unknown_ids() {
        let mut sim = Simulation::with_starter(SimConfig::default()).unwrap();
        assert_eq!(
            sim.assign_task(UnitId::new(9), TaskKind::Construct),
            Err(SettlementError::UnknownUnit(UnitId::new(9)))
        );
        assert_eq!(
            sim.spawn_unit(Some(TileId::new(99))),
            Err(SettlementError::UnknownTile(TileId::new(99)))
        );
    }

    #[test]
    fn test_large_hexes_place_without_overflow() {
        let oversized = SimConfig {
            hex_size: 30_000,
            ..SimConfig::default()
        };
        assert!(matches!(
            Simulation::new(oversized),
            Err(SettlementError::InvalidConfig(_))
        ));

        let config = SimConfig {
            hex_size: crate::config::MAX_HEX_SIZE,
            ..SimConfig::default()
        };
        let mut sim = Simulation::with_starter(config).unwrap();
        assert!(sim
            .place_structure(Structure::new(StructureTemplate::hut(), HexCoord::new(4, 0)))
            .is_ok());
        assert_eq!(
            sim.place_structure(Structure::new(
                StructureTemplate::hut(),
                HexCoord::new(30_000, 0)
            )),
            Err(SettlementError::PlacementRejected(
                crate::error::PlacementRejection::NotAdjacent
            ))
        );
    }

    #[test]
    fn test_snapshot_and_hash() {
        let mut a = sim_with_wood(20, NavigationMode::Walk);
        let mut b = sim_with_wood(20, NavigationMode::Walk);
        gatherer(&mut a);
        gatherer(&mut b);

        for _ in 0..50 {
            a.tick();
            b.tick();
            assert_eq!(a.state_hash(), b.state_hash());
        }

        let snapshot = a.snapshot();
        assert_eq!(snapshot.tick, 50);
        assert_eq!(snapshot.structures.len(), 1);
        assert_eq!(snapshot.slots.len(), 1);
        assert_eq!(snapshot.units.len(), 1);
    }
}
