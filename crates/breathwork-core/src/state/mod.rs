//! Per-mode simulation state.
//!
//! [`initialize`] builds a fresh [`VisualizationState`] for a visual mode at a
//! given complexity and logical surface size. Entity positions are stored
//! relative to the surface center. State is rebuilt from scratch whenever the
//! mode, complexity or surface size changes.

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::config::{VisualMode, MAX_COMPLEXITY, MIN_COMPLEXITY};

pub mod atmosphere;
pub mod bio;
pub mod crystal;
pub mod fluid;
pub mod rings;
pub mod stardust;
pub mod topography;

pub use atmosphere::{CoronaRay, FogLayer, Sky};
pub use bio::{Connection, Network, NetworkNode};
pub use crystal::{CrystalPoint, Lattice};
pub use fluid::{Blob, FluidPool};
pub use rings::{Ring, RingStack, RING_COUNT};
pub use stardust::{Mote, StarField};
pub use topography::{MeshVertex, SphereMesh};

/// Logical drawing area a state was built for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    pub size: Vec2,
}

impl SceneBounds {
    /// Degenerate sizes are clamped to one unit.
    pub fn new(size: Vec2) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.max(1.0) } else { 1.0 };
        Self {
            size: Vec2::new(clamp(size.x), clamp(size.y)),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn min_dim(&self) -> f32 {
        self.size.x.min(self.size.y)
    }
}

/// One variant per visual-mode family. The four ring modes share [`RingStack`].
#[derive(Debug, Clone, PartialEq)]
pub enum VisualizationState {
    Rings(RingStack),
    StarDust(StarField),
    Fluid(FluidPool),
    Crystal(Lattice),
    Topography(SphereMesh),
    Bio(Network),
    Atmosphere(Sky),
}

impl VisualizationState {
    pub fn kind(&self) -> &'static str {
        match self {
            VisualizationState::Rings(_) => "rings",
            VisualizationState::StarDust(_) => "starDust",
            VisualizationState::Fluid(_) => "fluid",
            VisualizationState::Crystal(_) => "crystal",
            VisualizationState::Topography(_) => "topography",
            VisualizationState::Bio(_) => "bio",
            VisualizationState::Atmosphere(_) => "atmosphere",
        }
    }

    /// Whether this state can be drawn by the renderer for `mode`.
    pub fn matches(&self, mode: VisualMode) -> bool {
        matches!(
            (self, mode),
            (
                VisualizationState::Rings(_),
                VisualMode::Rings
                    | VisualMode::RingsWave
                    | VisualMode::RingsExpand
                    | VisualMode::RingsSpiral
            ) | (VisualizationState::StarDust(_), VisualMode::StarDust)
                | (VisualizationState::Fluid(_), VisualMode::Fluid)
                | (VisualizationState::Crystal(_), VisualMode::Crystal)
                | (VisualizationState::Topography(_), VisualMode::Topography)
                | (VisualizationState::Bio(_), VisualMode::Bio)
                | (VisualizationState::Atmosphere(_), VisualMode::Atmosphere)
        )
    }

    /// Number of simulated entities (rings, particles, points, vertices, nodes, fog layers).
    pub fn entity_count(&self) -> usize {
        match self {
            VisualizationState::Rings(stack) => stack.rings.len(),
            VisualizationState::StarDust(field) => field.motes.len(),
            VisualizationState::Fluid(pool) => pool.blobs.len(),
            VisualizationState::Crystal(lattice) => lattice.points.len(),
            VisualizationState::Topography(mesh) => mesh.vertices.len(),
            VisualizationState::Bio(network) => network.nodes.len(),
            VisualizationState::Atmosphere(sky) => sky.fog.len() + sky.rays.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }
}

/// Builds state for `mode` using the thread-local RNG.
pub fn initialize(mode: VisualMode, complexity: u32, size: Vec2) -> VisualizationState {
    initialize_with_rng(mode, complexity, size, &mut rand::thread_rng())
}

/// Builds state for `mode` drawing scatter from `rng`.
pub fn initialize_with_rng<R: Rng + ?Sized>(
    mode: VisualMode,
    complexity: u32,
    size: Vec2,
    rng: &mut R,
) -> VisualizationState {
    let complexity = complexity.clamp(MIN_COMPLEXITY, MAX_COMPLEXITY);
    let bounds = SceneBounds::new(size);
    let state = match mode {
        VisualMode::Rings | VisualMode::RingsWave | VisualMode::RingsExpand | VisualMode::RingsSpiral => {
            VisualizationState::Rings(rings::build(&bounds))
        }
        VisualMode::StarDust => VisualizationState::StarDust(stardust::build(&bounds, complexity, rng)),
        VisualMode::Fluid => VisualizationState::Fluid(fluid::build(&bounds, complexity, rng)),
        VisualMode::Crystal => VisualizationState::Crystal(crystal::build(&bounds, complexity, rng)),
        VisualMode::Topography => {
            VisualizationState::Topography(topography::build(&bounds, complexity, rng))
        }
        VisualMode::Bio => VisualizationState::Bio(bio::build(&bounds, rng)),
        VisualMode::Atmosphere => {
            VisualizationState::Atmosphere(atmosphere::build(&bounds, complexity, rng))
        }
    };
    debug!(
        "initialized {} state for {mode}: {} entities at {}x{}",
        state.kind(),
        state.entity_count(),
        bounds.size.x,
        bounds.size.y
    );
    state
}
