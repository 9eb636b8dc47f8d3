use std::f64::consts::TAU;

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use super::config::{FieldConfig, MAX_ENERGY, MIN_ENERGY, REFERENCE_FPS};
use super::types::{Category, Node};

/// A connection between two nodes, valid for the current frame only.
#[derive(Clone, Copy, Debug)]
pub struct Edge {
	pub a: usize,
	pub b: usize,
	pub opacity: f64,
	/// Category whose color and alpha the edge is drawn with.
	pub category: Category,
	/// Where a data pulse travelling along the edge is drawn this frame, if any.
	pub sparkle: Option<(f64, f64)>,
}

/// Edges fainter than this never carry a data pulse.
pub const SPARKLE_MIN_OPACITY: f64 = 0.3;

/// Nodes for a `width` x `height` surface: one per `density` square pixels.
pub fn node_count(width: f64, height: f64, density: f64) -> usize {
	if !(width > 0.0 && height > 0.0 && density > 0.0) {
		return 0;
	}
	(width * height / density).floor() as usize
}

/// Strength of the pointer push on a node `distance` away: 1.0 on top of the
/// pointer, falling linearly to 0.0 at `radius`.
pub fn repulsion_factor(distance: f64, radius: f64) -> f64 {
	if !(radius > 0.0 && distance < radius) {
		return 0.0;
	}
	((radius - distance) / radius).clamp(0.0, 1.0)
}

fn shimmer(elapsed: f64, phase: f64) -> f64 {
	(elapsed + phase).sin() * 0.3 + 0.7
}

fn link_opacity(a: &Node, b: &Node, distance: f64, threshold: f64, elapsed: f64) -> f64 {
	if !(distance < threshold) {
		return 0.0;
	}
	(1.0 - distance / threshold) * a.energy * b.energy * shimmer(elapsed, a.phase)
}

/// Opacity of the edge between `a` and `b`, zero when they are too far apart.
pub fn edge_opacity(a: &Node, b: &Node, elapsed: f64) -> f64 {
	let threshold = Category::pair_threshold(a.category, b.category);
	link_opacity(a, b, a.distance_to(b.x, b.y), threshold, elapsed)
}

/// Fraction of the way from the source node to the target node at which
/// data pulses sit; sweeps back and forth along every edge in unison.
pub fn sparkle_progress(elapsed: f64) -> f64 {
	(elapsed * 2.0).sin() * 0.5 + 0.5
}

fn surface_dim(v: f64) -> f64 {
	if v.is_finite() { v.max(0.0) } else { 0.0 }
}

pub struct ParticleField {
	pub config: FieldConfig,
	pub width: f64,
	pub height: f64,
	/// Seconds simulated since creation; drives the edge shimmer.
	pub elapsed: f64,
	/// Ticks that advanced time; reseeds the pulse roll each frame.
	pub frame: u64,
	nodes: Vec<Node>,
	pointer: Option<(f64, f64)>,
	rng: SmallRng,
	sparkle_seed: u64,
}

impl ParticleField {
	pub fn new(config: FieldConfig, seed: u64) -> Self {
		let mut rng = SmallRng::seed_from_u64(seed);
		let sparkle_seed = rng.next_u64();
		Self {
			config: config.sanitized(),
			width: 0.0,
			height: 0.0,
			elapsed: 0.0,
			frame: 0,
			nodes: Vec::new(),
			pointer: None,
			rng,
			sparkle_seed,
		}
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	#[cfg(test)]
	pub fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	/// Discard every node and repopulate for the new surface size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = surface_dim(width);
		self.height = surface_dim(height);

		let total = node_count(self.width, self.height, self.config.density);
		let counts = Category::allocate(total);
		let mut nodes = Vec::with_capacity(total);
		for category in Category::ALL {
			for _ in 0..counts[category.index()] {
				nodes.push(self.spawn(category));
			}
		}
		self.nodes = nodes;
		debug!(
			"particle field sized {}x{}: {} nodes",
			self.width, self.height, total
		);
	}

	fn spawn(&mut self, category: Category) -> Node {
		let profile = category.profile();
		let (drift_x, drift_y) = (
			(self.rng.r#gen::<f64>() - 0.5) * 2.0 * profile.speed_cap,
			(self.rng.r#gen::<f64>() - 0.5) * 2.0 * profile.speed_cap,
		);
		Node {
			x: self.rng.r#gen::<f64>() * self.width,
			y: self.rng.r#gen::<f64>() * self.height,
			vx: drift_x,
			vy: drift_y,
			drift_x,
			drift_y,
			size: self.rng.gen_range(profile.size.clone()),
			energy: self
				.rng
				.gen_range(profile.initial_energy.clone())
				.clamp(MIN_ENERGY, MAX_ENERGY),
			phase: self.rng.r#gen::<f64>() * TAU,
			category,
		}
	}

	pub fn on_pointer_move(&mut self, x: f64, y: f64) {
		if x.is_finite() && y.is_finite() {
			self.pointer = Some((x, y));
		}
	}

	pub fn clear_pointer(&mut self) {
		self.pointer = None;
	}

	/// Advance the simulation by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		let dt = if dt.is_finite() {
			dt.clamp(0.0, self.config.max_dt)
		} else {
			0.0
		};
		if dt == 0.0 {
			return;
		}
		self.elapsed += dt;
		self.frame += 1;

		let cfg = &self.config;
		let steps = dt * REFERENCE_FPS;
		let damping = cfg.damping.powf(steps);
		let (max_x, max_y, margin) = (self.width + cfg.margin, self.height + cfg.margin, cfg.margin);

		for node in &mut self.nodes {
			node.x += node.vx * steps;
			node.y += node.vy * steps;

			// toroidal wrap
			if node.x < -margin {
				node.x = max_x;
			} else if node.x > max_x {
				node.x = -margin;
			}
			if node.y < -margin {
				node.y = max_y;
			} else if node.y > max_y {
				node.y = -margin;
			}

			let push = self.pointer.and_then(|(px, py)| {
				let radius = node.category.profile().interaction_radius;
				let force = repulsion_factor(node.distance_to(px, py), radius);
				(force > 0.0).then_some((px, py, force))
			});
			if let Some((px, py, force)) = push {
				let angle = (py - node.y).atan2(px - node.x);
				node.vx -= angle.cos() * force * cfg.repulsion * steps;
				node.vy -= angle.sin() * force * cfg.repulsion * steps;
				node.energy += force * cfg.energy_boost * steps;
			} else if node.energy > cfg.energy_floor {
				node.energy = (node.energy - cfg.energy_decay * steps).max(cfg.energy_floor);
			}
			node.energy = node.energy.clamp(MIN_ENERGY, MAX_ENERGY);

			node.vx = node.drift_x + (node.vx - node.drift_x) * damping;
			node.vy = node.drift_y + (node.vy - node.drift_y) * damping;

			node.phase = (node.phase + cfg.pulse_step * steps) % TAU;
		}
	}

	/// Call `f` for every unordered pair of nodes close enough to connect.
	///
	/// Pulses are rolled from a per-frame seed, so repeated visits within one
	/// frame agree on which edges carry one.
	pub fn visit_edges(&self, mut f: impl FnMut(Edge)) {
		let mut roll = SmallRng::seed_from_u64(self.sparkle_seed ^ self.frame);
		let progress = sparkle_progress(self.elapsed);
		for (i, a) in self.nodes.iter().enumerate() {
			for (j, b) in self.nodes.iter().enumerate().skip(i + 1) {
				let threshold = Category::pair_threshold(a.category, b.category);
				let opacity =
					link_opacity(a, b, a.distance_to(b.x, b.y), threshold, self.elapsed);
				if opacity <= 0.0 {
					continue;
				}
				let sparkle = (opacity > SPARKLE_MIN_OPACITY
					&& roll.r#gen::<f64>() < self.config.sparkle_chance)
					.then(|| (a.x + (b.x - a.x) * progress, a.y + (b.y - a.y) * progress));
				f(Edge {
					a: i,
					b: j,
					opacity,
					category: Category::dominant(a.category, b.category),
					sparkle,
				});
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const FRAME: f64 = 1.0 / 60.0;

	fn node(x: f64, y: f64, category: Category) -> Node {
		Node {
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			drift_x: 0.0,
			drift_y: 0.0,
			size: 3.0,
			energy: 0.5,
			phase: 0.0,
			category,
		}
	}

	fn field_with(nodes: Vec<Node>) -> ParticleField {
		let mut field = ParticleField::new(FieldConfig::default(), 7);
		field.width = 1000.0;
		field.height = 800.0;
		field.nodes = nodes;
		field
	}

	#[test]
	fn initial_population_matches_density() {
		let mut field = ParticleField::new(FieldConfig::default(), 1);
		field.resize(1000.0, 800.0);
		assert_eq!(field.nodes().len(), 53);
		let cores = field
			.nodes()
			.iter()
			.filter(|n| n.category == Category::Core)
			.count();
		assert_eq!(cores, 15);
		for n in field.nodes() {
			assert!((0.0..=1000.0).contains(&n.x));
			assert!((0.0..=800.0).contains(&n.y));
			assert!((MIN_ENERGY..=MAX_ENERGY).contains(&n.energy));
			assert!(n.category.profile().size.contains(&n.size));
		}
	}

	#[test]
	fn degenerate_sizes_produce_no_nodes() {
		let mut field = ParticleField::new(FieldConfig::default(), 1);
		field.resize(0.0, 800.0);
		assert!(field.nodes().is_empty());
		field.resize(f64::NAN, -3.0);
		assert!(field.nodes().is_empty());
		field.tick(FRAME);
		field.visit_edges(|_| panic!("no edges expected"));
	}

	#[test]
	fn resize_scales_with_area_and_replaces_nodes() {
		let mut field = ParticleField::new(FieldConfig::default(), 3);
		field.resize(1000.0, 800.0);
		let fingerprint = |n: &Node| (n.x, n.y, n.size, n.phase);
		let before: Vec<_> = field.nodes().iter().map(fingerprint).collect();
		let count_a = before.len() as f64;

		field.resize(2000.0, 1600.0);
		let count_b = field.nodes().len() as f64;
		let expected = count_a * 4.0;
		assert!((count_b - expected).abs() <= 4.0, "{count_b} vs {expected}");
		assert!(field.nodes().iter().all(|n| !before.contains(&fingerprint(n))));
	}

	#[test]
	fn repulsion_is_max_at_pointer_and_fades_to_radius() {
		assert_eq!(repulsion_factor(0.0, 200.0), 1.0);
		let mut last = 1.0;
		for d in 1..200 {
			let f = repulsion_factor(d as f64, 200.0);
			assert!(f < last);
			last = f;
		}
		assert_eq!(repulsion_factor(200.0, 200.0), 0.0);
		assert_eq!(repulsion_factor(350.0, 200.0), 0.0);
		assert_eq!(repulsion_factor(10.0, 0.0), 0.0);
	}

	#[test]
	fn energy_stays_in_bounds() {
		let mut field = ParticleField::new(FieldConfig::default(), 11);
		field.resize(640.0, 480.0);
		let targets: Vec<(f64, f64)> = field.nodes().iter().take(5).map(|n| (n.x, n.y)).collect();
		for step in 0..2000 {
			if step % 100 == 0 {
				let (x, y) = targets[(step / 100) % targets.len()];
				field.on_pointer_move(x, y);
			}
			if step % 700 == 0 {
				field.clear_pointer();
			}
			field.tick(FRAME);
			for n in field.nodes() {
				assert!((MIN_ENERGY..=MAX_ENERGY).contains(&n.energy), "{}", n.energy);
			}
		}
	}

	#[test]
	fn positions_stay_inside_wrap_band() {
		let mut nodes = vec![
			node(-49.0, 400.0, Category::Data),
			node(1049.0, 400.0, Category::Data),
			node(500.0, -49.0, Category::Core),
			node(500.0, 849.0, Category::Satellite),
		];
		nodes[0].vx = -30.0;
		nodes[0].drift_x = -30.0;
		nodes[1].vx = 30.0;
		nodes[1].drift_x = 30.0;
		nodes[2].vy = -30.0;
		nodes[2].drift_y = -30.0;
		nodes[3].vy = 30.0;
		nodes[3].drift_y = 30.0;
		let mut field = field_with(nodes);
		let m = field.config.margin;

		for _ in 0..500 {
			field.tick(FRAME);
			for n in field.nodes() {
				assert!(n.x >= -m && n.x <= field.width + m, "x = {}", n.x);
				assert!(n.y >= -m && n.y <= field.height + m, "y = {}", n.y);
			}
		}
	}

	#[test]
	fn wrap_moves_node_to_opposite_edge() {
		let mut n = node(-49.0, 400.0, Category::Core);
		n.vx = -2.0;
		n.drift_x = -2.0;
		let mut field = field_with(vec![n]);
		field.tick(FRAME);
		assert_eq!(field.nodes()[0].x, 1050.0);
	}

	#[test]
	fn pointer_pushes_node_away_and_raises_energy() {
		let mut field = field_with(vec![node(500.0, 400.0, Category::Satellite)]);
		field.on_pointer_move(520.0, 400.0);
		field.tick(FRAME);
		let n = &field.nodes()[0];
		assert!(n.vx < 0.0, "vx = {}", n.vx);
		assert!(n.vy.abs() < 1e-9);
		assert!(n.energy > 0.5);
	}

	#[test]
	fn pointer_on_top_of_node_is_safe() {
		let mut field = field_with(vec![node(500.0, 400.0, Category::Core)]);
		field.on_pointer_move(500.0, 400.0);
		field.tick(FRAME);
		let n = &field.nodes()[0];
		assert!(n.vx.is_finite() && n.vy.is_finite());
		assert!(n.energy > 0.5);
	}

	#[test]
	fn impulses_decay_back_to_drift() {
		let mut n = node(500.0, 400.0, Category::Core);
		n.drift_x = 0.1;
		n.vx = 5.0;
		let mut field = field_with(vec![n]);
		for _ in 0..600 {
			field.tick(FRAME);
		}
		assert!((field.nodes()[0].vx - 0.1).abs() < 0.01);
	}

	#[test]
	fn energy_decays_to_floor_without_pointer() {
		let mut field = ParticleField::new(FieldConfig::default(), 5);
		field.resize(1000.0, 800.0);
		for _ in 0..300 {
			field.tick(FRAME);
		}
		for n in field.nodes() {
			assert_eq!(n.energy, 0.1);
		}

		let cfg = FieldConfig {
			energy_floor: 0.2,
			..FieldConfig::default()
		};
		let mut field = ParticleField::new(cfg, 5);
		field.resize(1000.0, 800.0);
		for _ in 0..300 {
			field.tick(FRAME);
		}
		for n in field.nodes() {
			assert!(n.energy <= 0.2 && n.energy >= MIN_ENERGY);
		}
	}

	#[test]
	fn tick_ignores_bad_dt_and_clamps_large_steps() {
		let mut n = node(500.0, 400.0, Category::Core);
		n.vx = 1.0;
		n.drift_x = 1.0;
		let mut field = field_with(vec![n]);
		field.tick(0.0);
		field.tick(f64::NAN);
		field.tick(-1.0);
		assert_eq!(field.nodes()[0].x, 500.0);
		assert_eq!(field.elapsed, 0.0);

		field.tick(10.0);
		let moved = field.nodes()[0].x - 500.0;
		assert!((moved - 6.0).abs() < 1e-9, "moved {moved}");
	}

	#[test]
	fn edge_opacity_respects_threshold() {
		let a = node(0.0, 0.0, Category::Core);
		let far = node(180.0, 0.0, Category::Core);
		let near = node(179.0, 0.0, Category::Core);
		let data = node(80.0, 0.0, Category::Data);
		assert_eq!(edge_opacity(&a, &far, 0.0), 0.0);
		assert!(edge_opacity(&a, &near, 0.0) > 0.0);
		assert_eq!(edge_opacity(&a, &data, 0.0), 0.0);
	}

	#[test]
	fn edge_opacity_scales_with_energy() {
		let a = node(0.0, 0.0, Category::Satellite);
		let mut b = node(60.0, 0.0, Category::Satellite);
		let base = edge_opacity(&a, &b, 1.0);
		b.energy = 1.0;
		let doubled = edge_opacity(&a, &b, 1.0);
		assert!((doubled - 2.0 * base).abs() < 1e-12);
		b.energy = 0.1;
		assert!(edge_opacity(&a, &b, 1.0) > 0.0);
	}

	#[test]
	fn pulses_ride_bright_edges_only() {
		let cfg = FieldConfig {
			sparkle_chance: 1.0,
			..FieldConfig::default()
		};
		let mut field = ParticleField::new(cfg, 21);
		field.resize(800.0, 600.0);
		// one tight core pair and one core pair near the reach limit
		field.nodes[0].x = 400.0;
		field.nodes[0].y = 300.0;
		field.nodes[1].x = 405.0;
		field.nodes[1].y = 300.0;
		field.nodes[2].x = 570.0;
		field.nodes[2].y = 300.0;
		let (mut bright, mut faint) = (0, 0);
		for _ in 0..10 {
			field.tick(FRAME);
			for n in &mut field.nodes {
				n.energy = 1.0;
			}
			let nodes = field.nodes();
			field.visit_edges(|e| {
				let (a, b) = (&nodes[e.a], &nodes[e.b]);
				match e.sparkle {
					Some((x, y)) => {
						assert!(e.opacity > SPARKLE_MIN_OPACITY);
						bright += 1;
						// on the segment a-b
						let cross = (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
						assert!(cross.abs() < 1e-6, "off the line by {cross}");
						assert!(x >= a.x.min(b.x) - 1e-9 && x <= a.x.max(b.x) + 1e-9);
						assert!(y >= a.y.min(b.y) - 1e-9 && y <= a.y.max(b.y) + 1e-9);
					}
					None => {
						assert!(e.opacity <= SPARKLE_MIN_OPACITY);
						faint += 1;
					}
				}
			});
		}
		assert!(bright > 0 && faint > 0, "{bright} bright, {faint} faint");
	}

	#[test]
	fn pulses_are_rare_and_stable_within_a_frame() {
		let mut field = ParticleField::new(FieldConfig::default(), 8);
		field.resize(1200.0, 900.0);
		let (mut pulses, mut bright) = (0, 0);
		for _ in 0..200 {
			field.tick(FRAME);
			for n in &mut field.nodes {
				n.energy = 1.0;
			}
			let collect = |field: &ParticleField| {
				let mut out = Vec::new();
				field.visit_edges(|e| out.push(e.sparkle.is_some()));
				out
			};
			let first = collect(&field);
			assert_eq!(first, collect(&field));
			pulses += first.iter().filter(|s| **s).count();
			field.visit_edges(|e| {
				if e.opacity > SPARKLE_MIN_OPACITY {
					bright += 1;
				}
			});
		}
		assert!(bright > 0);
		assert!(pulses < bright / 10, "{pulses} pulses over {bright} bright edges");
	}

	#[test]
	fn visit_edges_reports_each_close_pair_once() {
		let field = field_with(vec![
			node(100.0, 100.0, Category::Core),
			node(250.0, 100.0, Category::Core),
			node(100.0, 150.0, Category::Data),
			node(900.0, 700.0, Category::Satellite),
		]);
		let mut seen = Vec::new();
		field.visit_edges(|e| {
			assert!(e.a < e.b);
			assert!(e.opacity > 0.0);
			seen.push((e.a, e.b, e.category));
		});
		assert_eq!(
			seen,
			vec![(0, 1, Category::Core), (0, 2, Category::Data)]
		);
	}
}
