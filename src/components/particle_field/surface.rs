use std::f64::consts::PI;

use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::types::Rgb;

#[derive(Debug, Error)]
pub enum SurfaceError {
	#[error("no browser window")]
	NoWindow,
	#[error("canvas refused to create a 2d context")]
	ContextRejected,
	#[error("2d context unavailable")]
	ContextUnavailable,
	#[error("context is not a CanvasRenderingContext2d")]
	WrongContextType,
	#[error("viewport size unavailable")]
	ViewportUnavailable,
}

/// Drawing primitives the renderer needs.
pub trait Surface {
	/// Cover the whole surface with a translucent fill, leaving trails.
	fn fade(&self, color: Rgb, alpha: f64, width: f64, height: f64);
	fn line(&self, from: (f64, f64), to: (f64, f64), color: Rgb, alpha: f64, width: f64);
	/// Radial glow at `center`, `inner_alpha` at the middle, `mid_alpha` halfway, clear at `radius`.
	fn glow(&self, center: (f64, f64), radius: f64, color: Rgb, inner_alpha: f64, mid_alpha: f64);
	fn disc(&self, center: (f64, f64), radius: f64, color: Rgb, alpha: f64);
}

impl Surface for CanvasRenderingContext2d {
	fn fade(&self, color: Rgb, alpha: f64, width: f64, height: f64) {
		self.set_fill_style_str(&color.rgba(alpha));
		self.fill_rect(0.0, 0.0, width, height);
	}

	fn line(&self, from: (f64, f64), to: (f64, f64), color: Rgb, alpha: f64, width: f64) {
		self.set_stroke_style_str(&color.rgba(alpha));
		self.set_line_width(width);
		self.begin_path();
		self.move_to(from.0, from.1);
		self.line_to(to.0, to.1);
		self.stroke();
	}

	fn glow(&self, center: (f64, f64), radius: f64, color: Rgb, inner_alpha: f64, mid_alpha: f64) {
		let (x, y) = center;
		let Ok(gradient) = self.create_radial_gradient(x, y, 0.0, x, y, radius) else {
			return;
		};
		let _ = gradient.add_color_stop(0.0, &color.rgba(inner_alpha));
		let _ = gradient.add_color_stop(0.5, &color.rgba(mid_alpha));
		let _ = gradient.add_color_stop(1.0, &color.rgba(0.0));
		self.begin_path();
		let _ = self.arc(x, y, radius, 0.0, 2.0 * PI);
		#[allow(deprecated)]
		self.set_fill_style(&gradient);
		self.fill();
	}

	fn disc(&self, center: (f64, f64), radius: f64, color: Rgb, alpha: f64) {
		self.begin_path();
		let _ = self.arc(center.0, center.1, radius, 0.0, 2.0 * PI);
		self.set_fill_style_str(&color.rgba(alpha));
		self.fill();
	}
}

pub fn window() -> Result<Window, SurfaceError> {
	web_sys::window().ok_or(SurfaceError::NoWindow)
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, SurfaceError> {
	canvas
		.get_context("2d")
		.map_err(|_| SurfaceError::ContextRejected)?
		.ok_or(SurfaceError::ContextUnavailable)?
		.dyn_into()
		.map_err(|_| SurfaceError::WrongContextType)
}

pub fn viewport_size(window: &Window) -> Result<(f64, f64), SurfaceError> {
	let width = window
		.inner_width()
		.ok()
		.and_then(|v| v.as_f64())
		.ok_or(SurfaceError::ViewportUnavailable)?;
	let height = window
		.inner_height()
		.ok()
		.and_then(|v| v.as_f64())
		.ok_or(SurfaceError::ViewportUnavailable)?;
	Ok((width, height))
}
