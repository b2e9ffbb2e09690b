//! Execution context handed to behaviour code for one tick.
//!
//! [`StepContext`] bundles the collaborators an animal needs while it
//! acts: the landscape (mutable, since animals eat), the field geometry,
//! the immutable configuration, the random source and the diagnostic
//! counters. Collaborators are trait objects so tests can substitute
//! mocks from `pelagic-test-utils`.

use crate::diagnostics::Diagnostics;
use pelagic_core::{Cell, Landscape, RandomSource, SimulationConfig, TickId, Vec2};
use pelagic_space::SpatialField;

/// Everything one behaviour step may read or mutate.
pub struct StepContext<'a> {
    landscape: &'a mut dyn Landscape,
    field: &'a SpatialField,
    config: &'a SimulationConfig,
    rng: &'a mut dyn RandomSource,
    diagnostics: &'a mut Diagnostics,
    tick: TickId,
}

impl<'a> StepContext<'a> {
    /// Construct a context.
    ///
    /// Typically called by the engine once per task; tests build one
    /// around mock collaborators.
    pub fn new(
        landscape: &'a mut dyn Landscape,
        field: &'a SpatialField,
        config: &'a SimulationConfig,
        rng: &'a mut dyn RandomSource,
        diagnostics: &'a mut Diagnostics,
        tick: TickId,
    ) -> Self {
        Self {
            landscape,
            field,
            config,
            rng,
            diagnostics,
            tick,
        }
    }

    /// Read access to the landscape.
    pub fn landscape(&self) -> &dyn Landscape {
        &*self.landscape
    }

    /// Write access to the landscape (food levels).
    pub fn landscape_mut(&mut self) -> &mut dyn Landscape {
        self.landscape
    }

    /// Field geometry.
    pub fn field(&self) -> &'a SpatialField {
        self.field
    }

    /// Simulation configuration.
    pub fn config(&self) -> &'a SimulationConfig {
        self.config
    }

    /// Random source.
    pub fn rng(&mut self) -> &mut dyn RandomSource {
        self.rng
    }

    /// Diagnostic counters.
    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        self.diagnostics
    }

    /// Tick being executed.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Advance the tick (used when one context drives several ticks).
    pub fn set_tick(&mut self, tick: TickId) {
        self.tick = tick;
    }

    /// Cell under a position, honouring the field's border policy.
    pub fn cell_at(&self, pos: Vec2) -> Option<Cell> {
        self.field.to_cell(pos)
    }

    /// Whether the position is inside the field and over water.
    pub fn is_water_at(&self, pos: Vec2) -> bool {
        self.cell_at(pos)
            .is_some_and(|c| self.landscape.is_water(c))
    }

    /// Depth at a position, or the no-data sentinel.
    pub fn depth_at(&self, pos: Vec2) -> f64 {
        self.cell_at(pos)
            .map_or(pelagic_core::NO_DATA, |c| self.landscape.depth(c))
    }

    /// Distance to coast (m) at a position, or the no-data sentinel.
    pub fn coast_distance_at(&self, pos: Vec2) -> f64 {
        self.cell_at(pos)
            .map_or(pelagic_core::NO_DATA, |c| self.landscape.distance_to_coast(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pelagic_core::SeededRandom;
    use pelagic_space::{EdgeBehavior, GridLandscape, LandscapeLayers};

    #[test]
    fn context_exposes_collaborators() {
        let mut layers = LandscapeLayers::filled(4, 4, 12.0);
        layers.depth[0] = 0.0;
        let mut land = GridLandscape::from_layers(layers).unwrap();
        let field = SpatialField::new(4, 4, EdgeBehavior::Bounce, EdgeBehavior::Bounce).unwrap();
        let config = SimulationConfig::default();
        let mut rng = SeededRandom::new(1);
        let mut diag = Diagnostics::default();
        let mut ctx = StepContext::new(&mut land, &field, &config, &mut rng, &mut diag, TickId(9));

        assert_eq!(ctx.tick(), TickId(9));
        assert!(!ctx.is_water_at(Vec2::new(0.5, 0.5)));
        assert!(ctx.is_water_at(Vec2::new(1.5, 0.5)));
        assert!(!ctx.is_water_at(Vec2::new(4.5, 0.5)));
        assert_eq!(ctx.depth_at(Vec2::new(2.0, 2.0)), 12.0);
        assert_eq!(ctx.depth_at(Vec2::new(-1.0, 2.0)), pelagic_core::NO_DATA);
        let u = ctx.rng().uniform();
        assert!((0.0..1.0).contains(&u));
        ctx.diagnostics().angle_fallbacks += 1;
        assert_eq!(ctx.config().cell_size_m, 400.0);
        drop(ctx);
        assert_eq!(diag.angle_fallbacks, 1);
    }
}
