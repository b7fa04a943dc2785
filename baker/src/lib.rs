pub mod aggregate;
pub mod aggregate_textures;
pub mod bake_textures;
pub mod baking;
pub mod cull;
pub mod defs;
pub mod export;
pub mod host;
pub mod materials;
pub mod projection;
pub mod rig;
pub mod scene;
pub mod uv;

pub use base;
