//! Test fixtures and helpers.
//!
//! Pre-built settlements and simulations for consistent testing.

use hexhold_core::prelude::*;

/// Empty settlement with the default layout and threshold.
#[must_use]
pub fn empty_settlement() -> Settlement {
    let config = SimConfig::default();
    Settlement::new(config.layout(), config.neighbor_threshold())
}

/// Settlement holding only the starter platform at the origin.
///
/// # Panics
///
/// Never in practice; the first structure is always accepted.
#[must_use]
pub fn starter_settlement() -> Settlement {
    let mut settlement = empty_settlement();
    settlement
        .add_structure(Structure::new(StructureTemplate::starter(), HexCoord::default()))
        .expect("starter placement");
    settlement
}

/// Settlement holding a single straight walkway of `len` tiles.
///
/// # Panics
///
/// Panics if `len` is zero.
#[must_use]
pub fn walkway_settlement(len: u32) -> Settlement {
    let mut settlement = empty_settlement();
    settlement
        .add_structure(Structure::new(StructureTemplate::walkway(len), HexCoord::default()))
        .expect("walkway placement");
    settlement
}

/// Place every structure that validation accepts, skipping the rest.
///
/// Returns the settlement and how many placements were accepted.
#[must_use]
pub fn settlement_from(placements: &[(StructureTemplate, HexCoord)]) -> (Settlement, usize) {
    let mut settlement = empty_settlement();
    let mut accepted = 0;
    for (template, origin) in placements {
        match settlement.add_structure(Structure::new(template.clone(), *origin)) {
            Ok(_) => accepted += 1,
            Err(err) => tracing::trace!(%err, origin = %origin, "Fixture placement skipped"),
        }
    }
    (settlement, accepted)
}

/// Starter platform with the given resource slots.
#[must_use]
pub fn starter_with_resources(resources: &[(HexCoord, ResourceKind, u32)]) -> StructureTemplate {
    resources
        .iter()
        .fold(StructureTemplate::starter(), |template, &(offset, kind, amount)| {
            template.with_resource(offset, kind, amount)
        })
}

/// Simulation on a starter platform carrying `resources`, with one unit
/// per entry of `tasks` spawned on the starter tile and tasked.
///
/// # Panics
///
/// Panics if `config` is invalid.
#[must_use]
pub fn gathering_simulation(
    config: SimConfig,
    resources: &[(HexCoord, ResourceKind, u32)],
    tasks: &[TaskKind],
) -> Simulation {
    let mut sim = Simulation::new(config).expect("valid config");
    sim.place_structure(Structure::new(
        starter_with_resources(resources),
        HexCoord::default(),
    ))
    .expect("starter placement");
    for &task in tasks {
        let unit = sim.spawn_unit(None).expect("starter tile exists");
        sim.assign_task(unit, task).expect("unit exists");
    }
    sim
}

/// The standard mixed scenario: two wood slots, one rock slot, an
/// attached quarry and a hut under construction, with three gatherers and
/// a builder.
///
/// # Panics
///
/// Panics if `config` is invalid.
#[must_use]
pub fn mixed_simulation(config: SimConfig) -> Simulation {
    let mut sim = gathering_simulation(
        config,
        &[
            (HexCoord::new(3, 3), ResourceKind::Wood, 30),
            (HexCoord::new(0, 3), ResourceKind::Wood, 20),
            (HexCoord::new(3, 0), ResourceKind::Rock, 10),
        ],
        &[
            TaskKind::Gather(ResourceKind::Wood),
            TaskKind::Gather(ResourceKind::Wood),
            TaskKind::Gather(ResourceKind::Rock),
            TaskKind::Construct,
        ],
    );
    sim.place_structure(Structure::new(
        StructureTemplate::quarry(20),
        HexCoord::new(-1, 2),
    ))
    .expect("quarry placement");
    sim.place_construction_site(
        Structure::new(StructureTemplate::hut(), HexCoord::new(4, 1)),
        30,
    )
    .expect("hut placement");
    sim
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_fixture() {
        let settlement = starter_settlement();
        assert_eq!(settlement.tiles().len(), 16);
    }

    #[test]
    fn test_settlement_from_skips_rejected() {
        let (settlement, accepted) = settlement_from(&[
            (StructureTemplate::hut(), HexCoord::default()),
            (StructureTemplate::hut(), HexCoord::default()),
            (StructureTemplate::hut(), HexCoord::new(20, 20)),
            (StructureTemplate::walkway(2), HexCoord::new(2, 0)),
        ]);
        assert_eq!(accepted, 2);
        assert_eq!(settlement.tiles().len(), 5);
    }

    #[test]
    fn test_mixed_simulation_builds() {
        let sim = mixed_simulation(SimConfig::default());
        assert_eq!(sim.units().count(), 4);
        assert_eq!(sim.settlement().structures().len(), 3);
    }
}
