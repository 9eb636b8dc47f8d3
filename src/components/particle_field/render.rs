use super::state::ParticleField;
use super::surface::Surface;
use super::types::{Palette, Rgb};

const GLOW_SCALE: f64 = 3.0;
const HIGHLIGHT_OFFSET: f64 = 0.3;
const SPARKLE_COLOR: Rgb = Rgb(251, 191, 36);
const SPARKLE_RADIUS: f64 = 2.0;

pub fn render(field: &ParticleField, palette: &Palette, surface: &impl Surface) {
	surface.fade(
		palette.background,
		palette.fade_alpha(),
		field.width,
		field.height,
	);
	draw_edges(field, palette, surface);
	draw_nodes(field, palette, surface);
}

fn draw_edges(field: &ParticleField, palette: &Palette, surface: &impl Surface) {
	let nodes = field.nodes();
	field.visit_edges(|edge| {
		let (a, b) = (&nodes[edge.a], &nodes[edge.b]);
		surface.line(
			(a.x, a.y),
			(b.x, b.y),
			palette.color(edge.category),
			edge.opacity * edge.category.profile().edge_alpha,
			(edge.opacity * 2.0).max(0.5),
		);
		if let Some(at) = edge.sparkle {
			surface.disc(at, SPARKLE_RADIUS, SPARKLE_COLOR, edge.opacity);
		}
	});
}

fn draw_nodes(field: &ParticleField, palette: &Palette, surface: &impl Surface) {
	for node in field.nodes() {
		let size = node.drawn_size();
		if !(size > 0.0) {
			continue;
		}
		let color = palette.color(node.category);
		let center = (node.x, node.y);

		surface.glow(
			center,
			size * GLOW_SCALE,
			color,
			node.energy * 0.8,
			node.energy * 0.3,
		);
		surface.disc(center, size, color, node.energy);
		surface.disc(
			(
				node.x - size * HIGHLIGHT_OFFSET,
				node.y - size * HIGHLIGHT_OFFSET,
			),
			size * HIGHLIGHT_OFFSET,
			Rgb::WHITE,
			node.energy * 0.3,
		);
	}
}
