//! Simulation configuration.
//!
//! All values have defaults matching the reference behavior; a RON document
//! only needs to name the fields it overrides. The core does no IO, so
//! reading files is left to the caller.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SettlementError};
use crate::hex::HexLayout;
use crate::math::Fixed;

/// Largest accepted hex radius, in world units.
pub const MAX_HEX_SIZE: u32 = 1000;

/// Who moves units between tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavigationMode {
    /// Units walk their route one tile every `walk_ticks_per_tile` ticks and
    /// the simulation raises the arrival event itself.
    #[default]
    Walk,
    /// An outside navigation layer moves units and reports arrivals through
    /// `Simulation::notify_arrival`.
    External,
}

/// Tunable simulation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Hex radius in world units.
    pub hex_size: u32,
    /// Extra room above the exact neighbor spacing, in percent.
    pub neighbor_slack_percent: u32,
    /// Period of the recurring work timer.
    pub generate_period_ms: u64,
    /// Units extracted from a slot per timer firing.
    pub extraction_amount: u32,
    /// Work applied to a construction site per timer firing.
    pub build_work_per_firing: u32,
    /// Delay before an idle unit searches again after finding nothing.
    pub idle_retry_ms: u64,
    /// Ticks a walking unit spends per tile step.
    pub walk_ticks_per_tile: u32,
    /// Navigation mode.
    pub navigation: NavigationMode,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20,
            hex_size: 1,
            neighbor_slack_percent: 10,
            generate_period_ms: 2000,
            extraction_amount: 10,
            build_work_per_firing: 10,
            idle_retry_ms: 500,
            walk_ticks_per_tile: 5,
            navigation: NavigationMode::Walk,
        }
    }
}

impl SimConfig {
    /// Parse from RON and validate.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self =
            ron::from_str(ron).map_err(|e| SettlementError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(SettlementError::InvalidConfig(msg.to_string()));

        if self.tick_rate == 0 || 1000 % self.tick_rate != 0 {
            return invalid("tick_rate must divide 1000 so ticks last whole milliseconds");
        }
        if self.hex_size == 0 || self.hex_size > MAX_HEX_SIZE {
            return invalid("hex_size must be between 1 and 1000");
        }
        // Beyond ~73% the threshold reaches the second ring of hexes.
        if self.neighbor_slack_percent >= 70 {
            return invalid("neighbor_slack_percent must be below 70");
        }
        if self.generate_period_ms == 0 {
            return invalid("generate_period_ms must be positive");
        }
        if self.walk_ticks_per_tile == 0 {
            return invalid("walk_ticks_per_tile must be positive");
        }
        Ok(())
    }

    /// Duration of one tick in milliseconds.
    #[must_use]
    pub const fn tick_duration_ms(&self) -> u64 {
        1000 / self.tick_rate as u64
    }

    /// Hex layout for this configuration.
    #[must_use]
    pub fn layout(&self) -> HexLayout {
        HexLayout::new(Fixed::from_num(self.hex_size))
    }

    /// Maximum center distance (exclusive) for two tiles to be neighbors.
    #[must_use]
    pub fn neighbor_threshold(&self) -> Fixed {
        self.layout().neighbor_threshold(self.neighbor_slack_percent)
    }
}
