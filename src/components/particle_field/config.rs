/// Reference frame rate the per-frame constants below are tuned against.
pub const REFERENCE_FPS: f64 = 60.0;

/// Lowest energy any node may hold.
pub const MIN_ENERGY: f64 = 0.1;
pub const MAX_ENERGY: f64 = 1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
	/// Square pixels of surface per node.
	pub density: f64,
	/// How far past an edge a node may drift before it wraps.
	pub margin: f64,
	pub damping: f64,
	pub repulsion: f64,
	pub energy_boost: f64,
	pub energy_floor: f64,
	pub energy_decay: f64,
	pub pulse_step: f64,
	/// Per-frame odds that a bright edge shows a data pulse.
	pub sparkle_chance: f64,
	/// Longest step in seconds a single tick integrates.
	pub max_dt: f64,
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self {
			density: 15_000.0,
			margin: 50.0,
			damping: 0.98,
			repulsion: 0.02,
			energy_boost: 0.01,
			energy_floor: MIN_ENERGY,
			energy_decay: 0.004,
			pulse_step: 0.05,
			sparkle_chance: 0.01,
			max_dt: 0.1,
		}
	}
}

impl FieldConfig {
	pub fn sanitized(mut self) -> Self {
		let defaults = Self::default();
		if !(self.density.is_finite() && self.density > 0.0) {
			self.density = defaults.density;
		}
		if !(self.margin.is_finite() && self.margin >= 0.0) {
			self.margin = defaults.margin;
		}
		if !(self.damping > 0.0 && self.damping < 1.0) {
			self.damping = defaults.damping;
		}
		if !self.repulsion.is_finite() {
			self.repulsion = defaults.repulsion;
		}
		if !self.energy_boost.is_finite() {
			self.energy_boost = defaults.energy_boost;
		}
		self.energy_floor = if self.energy_floor.is_nan() {
			defaults.energy_floor
		} else {
			self.energy_floor.clamp(MIN_ENERGY, MAX_ENERGY)
		};
		if !(self.energy_decay.is_finite() && self.energy_decay >= 0.0) {
			self.energy_decay = defaults.energy_decay;
		}
		if !self.pulse_step.is_finite() {
			self.pulse_step = defaults.pulse_step;
		}
		self.sparkle_chance = if self.sparkle_chance.is_nan() {
			defaults.sparkle_chance
		} else {
			self.sparkle_chance.clamp(0.0, 1.0)
		};
		if !(self.max_dt.is_finite() && self.max_dt > 0.0) {
			self.max_dt = defaults.max_dt;
		}
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_survive_sanitizing() {
		assert_eq!(FieldConfig::default().sanitized(), FieldConfig::default());
	}

	#[test]
	fn bad_values_fall_back() {
		let cfg = FieldConfig {
			density: 0.0,
			margin: -4.0,
			damping: 1.5,
			energy_floor: 0.0,
			energy_decay: f64::NAN,
			sparkle_chance: 3.0,
			max_dt: -1.0,
			..FieldConfig::default()
		}
		.sanitized();
		assert_eq!(cfg.density, 15_000.0);
		assert_eq!(cfg.margin, 50.0);
		assert_eq!(cfg.damping, 0.98);
		assert_eq!(cfg.energy_floor, MIN_ENERGY);
		assert_eq!(cfg.energy_decay, 0.004);
		assert_eq!(cfg.sparkle_chance, 1.0);
		assert_eq!(cfg.max_dt, 0.1);
	}
}
