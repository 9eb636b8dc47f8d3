use std::ops::Range;

/// Node class. Each row of [`PROFILES`] describes one variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
	Core,
	Satellite,
	Data,
}

#[derive(Clone, Debug)]
pub struct CategoryProfile {
	/// Fraction of the population spawned in this category.
	pub share: f64,
	/// Max drift speed per axis, px per reference frame.
	pub speed_cap: f64,
	pub size: Range<f64>,
	pub initial_energy: Range<f64>,
	pub interaction_radius: f64,
	/// Edge threshold contribution; a pair uses the smaller reach of the two.
	pub link_reach: f64,
	pub edge_alpha: f64,
}

const PROFILES: [CategoryProfile; Category::COUNT] = [
	CategoryProfile {
		share: 0.3,
		speed_cap: 0.15,
		size: 3.0..7.0,
		initial_energy: 0.5..1.0,
		interaction_radius: 180.0,
		link_reach: 180.0,
		edge_alpha: 0.6,
	},
	CategoryProfile {
		share: 0.5,
		speed_cap: 0.3,
		size: 2.0..4.0,
		initial_energy: 0.3..0.6,
		interaction_radius: 200.0,
		link_reach: 120.0,
		edge_alpha: 0.4,
	},
	CategoryProfile {
		share: 0.2,
		speed_cap: 0.6,
		size: 1.0..2.0,
		initial_energy: 0.2..1.0,
		interaction_radius: 240.0,
		link_reach: 80.0,
		edge_alpha: 0.3,
	},
];

impl Category {
	pub const COUNT: usize = 3;
	pub const ALL: [Category; Category::COUNT] =
		[Category::Core, Category::Satellite, Category::Data];

	pub fn index(self) -> usize {
		match self {
			Category::Core => 0,
			Category::Satellite => 1,
			Category::Data => 2,
		}
	}

	pub fn profile(self) -> &'static CategoryProfile {
		&PROFILES[self.index()]
	}

	/// The category that governs an edge between `a` and `b`: whichever has
	/// the shorter link reach.
	pub fn dominant(a: Category, b: Category) -> Category {
		if b.profile().link_reach < a.profile().link_reach {
			b
		} else {
			a
		}
	}

	pub fn pair_threshold(a: Category, b: Category) -> f64 {
		Category::dominant(a, b).profile().link_reach
	}

	/// Split `total` nodes across categories by share. The rounding remainder
	/// goes to the largest share so the counts always sum to `total`.
	pub fn allocate(total: usize) -> [usize; Category::COUNT] {
		let mut counts = [0; Category::COUNT];
		for cat in Category::ALL {
			counts[cat.index()] = (total as f64 * cat.profile().share).floor() as usize;
		}
		let assigned: usize = counts.iter().sum();
		let largest = Category::ALL
			.into_iter()
			.max_by(|a, b| a.profile().share.total_cmp(&b.profile().share))
			.unwrap_or(Category::Satellite);
		counts[largest.index()] += total.saturating_sub(assigned);
		counts
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
	pub const WHITE: Rgb = Rgb(255, 255, 255);

	pub fn rgba(self, alpha: f64) -> String {
		format!(
			"rgba({}, {}, {}, {})",
			self.0,
			self.1,
			self.2,
			alpha.clamp(0.0, 1.0)
		)
	}
}

/// Colors the renderer draws with, swapped by the active theme.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
	pub nodes: [Rgb; Category::COUNT],
	pub background: Rgb,
	pub light: bool,
}

impl Palette {
	pub fn color(&self, category: Category) -> Rgb {
		self.nodes[category.index()]
	}

	pub fn fade_alpha(&self) -> f64 {
		if self.light { 0.1 } else { 0.05 }
	}
}

#[derive(Clone, Debug)]
pub struct Node {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Spawn velocity; damping pulls the current velocity back toward it.
	pub drift_x: f64,
	pub drift_y: f64,
	pub size: f64,
	pub energy: f64,
	pub phase: f64,
	pub category: Category,
}

impl Node {
	pub fn pulse(&self) -> f64 {
		self.phase.sin() * 0.3 + 0.7
	}

	pub fn drawn_size(&self) -> f64 {
		self.size * self.pulse() * self.energy
	}

	pub fn distance_to(&self, x: f64, y: f64) -> f64 {
		let (dx, dy) = (self.x - x, self.y - y);
		(dx * dx + dy * dy).sqrt()
	}
}
