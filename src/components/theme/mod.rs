//! Site themes, the palette each hands the particle field, and persistence.

mod switcher;

use std::fmt;
use std::str::FromStr;

use leptos::prelude::*;
use log::{debug, warn};
use thiserror::Error;
use web_sys::Storage;

use super::particle_field::{Palette, Rgb};

pub use switcher::ThemeSwitcher;

const STORAGE_KEY: &str = "portfolio-theme";

const LIGHT_BACKGROUND: Rgb = Rgb(248, 250, 252);
const DARK_BACKGROUND: Rgb = Rgb(15, 23, 42);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
	#[default]
	Dark,
	Light,
	Fire,
	Funky,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown theme {0:?}")]
pub struct UnknownTheme(String);

impl Theme {
	pub const ALL: [Theme; 4] = [Theme::Dark, Theme::Light, Theme::Fire, Theme::Funky];

	pub fn key(self) -> &'static str {
		match self {
			Theme::Dark => "dark",
			Theme::Light => "light",
			Theme::Fire => "fire",
			Theme::Funky => "funky",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Theme::Dark => "Dark",
			Theme::Light => "Light",
			Theme::Fire => "Fire",
			Theme::Funky => "Funky",
		}
	}

	pub fn is_light(self) -> bool {
		self == Theme::Light
	}

	/// Node colors in core, satellite, data order.
	pub fn palette(self) -> Palette {
		let nodes = match self {
			Theme::Dark => [Rgb(168, 85, 247), Rgb(34, 211, 238), Rgb(34, 197, 94)],
			Theme::Light => [Rgb(99, 102, 241), Rgb(59, 130, 246), Rgb(16, 185, 129)],
			Theme::Fire => [Rgb(255, 72, 33), Rgb(251, 146, 60), Rgb(239, 68, 68)],
			Theme::Funky => [Rgb(92, 44, 255), Rgb(140, 255, 87), Rgb(255, 80, 9)],
		};
		Palette {
			nodes,
			background: if self.is_light() {
				LIGHT_BACKGROUND
			} else {
				DARK_BACKGROUND
			},
			light: self.is_light(),
		}
	}

	/// CSS background painted behind the particle canvas.
	pub fn backdrop(self) -> &'static str {
		match self {
			Theme::Light => "linear-gradient(135deg, #f9fafb 0%, #ffffff 50%, #f3f4f6 100%)",
			Theme::Fire => "radial-gradient(ellipse at center, #1a1a1a 0%, #2d1b1b 50%, #000000 100%)",
			Theme::Funky => "radial-gradient(ellipse at center, #2d1b69 0%, #1a0d3d 50%, #0f0624 100%)",
			Theme::Dark => "radial-gradient(ellipse at center, #1e293b 0%, #0f172a 50%, #020617 100%)",
		}
	}

	pub fn swatch(self) -> &'static str {
		match self {
			Theme::Dark => "#22d3ee",
			Theme::Light => "#60a5fa",
			Theme::Fire => "#fb923c",
			Theme::Funky => "#8cff57",
		}
	}
}

impl fmt::Display for Theme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

impl FromStr for Theme {
	type Err = UnknownTheme;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		Theme::ALL
			.into_iter()
			.find(|t| t.key().eq_ignore_ascii_case(s))
			.ok_or_else(|| UnknownTheme(s.to_string()))
	}
}

#[derive(Clone, Copy)]
struct ThemeContext(RwSignal<Theme>);

fn storage() -> Option<Storage> {
	web_sys::window()?.local_storage().ok().flatten()
}

fn load_saved() -> Option<Theme> {
	let raw = storage()?.get_item(STORAGE_KEY).ok().flatten()?;
	match raw.parse() {
		Ok(theme) => Some(theme),
		Err(err) => {
			warn!("ignoring saved theme: {err}");
			None
		}
	}
}

fn save(theme: Theme) {
	let Some(storage) = storage() else {
		warn!("local storage unavailable, theme not saved");
		return;
	};
	if storage.set_item(STORAGE_KEY, theme.key()).is_err() {
		warn!("failed to save theme {theme}");
	}
}

/// Create the app-wide theme signal, restored from local storage and saved
/// back on every change.
pub fn provide_theme() -> RwSignal<Theme> {
	let theme = RwSignal::new(load_saved().unwrap_or_default());
	Effect::new(move |_| {
		let current = theme.get();
		save(current);
		debug!("theme set to {current}");
	});
	provide_context(ThemeContext(theme));
	theme
}

pub fn use_theme() -> RwSignal<Theme> {
	expect_context::<ThemeContext>().0
}
