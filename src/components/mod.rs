pub mod particle_field;
pub mod theme;
