use bevy::prelude::Resource;

pub mod bevy_fibers;
pub mod config;
pub mod demo;

pub use bevy_fibers::{polyline_mesh, BevyLines};
pub use config::{load_config, ConfigError, HairConfig, HairConfigLoader};
pub use demo::demo_sources;

#[derive(Copy, Clone, Debug, Resource)]
pub struct DebugFlags {
    /// Guide center lines and ribbon widths.
    pub guides: bool,
    /// Fiber line mesh.
    pub fibers: bool,
    /// Fibers drawn again as gizmos.
    pub fiber_gizmos: bool,
}

impl Default for DebugFlags {
    fn default() -> Self {
        Self {
            guides: false,
            fibers: true,
            fiber_gizmos: false,
        }
    }
}
