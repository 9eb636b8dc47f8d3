mod component;
mod config;
mod render;
mod state;
mod surface;
mod types;

pub use component::ParticleFieldCanvas;
pub use types::{Palette, Rgb};
