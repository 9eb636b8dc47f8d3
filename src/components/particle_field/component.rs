use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::config::FieldConfig;
use super::render;
use super::state::ParticleField;
use super::surface::{self, SurfaceError};
use super::types::Palette;

/// Full-viewport particle network drawn behind the page.
///
/// Purely decorative: if the canvas or viewport cannot be acquired it logs a
/// warning and renders nothing.
#[component]
pub fn ParticleFieldCanvas(
	#[prop(into)] palette: Signal<Palette>,
	#[prop(default = FieldConfig::default())] config: FieldConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let control = LoopControl::default();
	let running = StoredValue::new_local(None::<Running>);
	let mut started = false;
	let control_init = control.clone();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if std::mem::replace(&mut started, true) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		match start(canvas, config.clone(), palette, control_init.clone()) {
			Ok(run) => {
				info!("particle field mounted with {} nodes", run.nodes);
				running.set_value(Some(run));
			}
			Err(err) => warn!("particle field disabled: {err}"),
		}
	});

	on_cleanup(move || {
		if let (Some(id), Some(win)) = (control.stop(), web_sys::window()) {
			let _ = win.cancel_animation_frame(id);
		}
		// Dropping the loop detaches its listeners and frees the frame closure.
		let _ = running.try_update_value(Option::take);
		debug!("particle field stopped");
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="particle-field"
			style="position: fixed; inset: 0; display: block; pointer-events: none; z-index: 0;"
		/>
	}
}

/// Cancellation shared between the frame loop and component cleanup.
///
/// Animation-frame ids are nonzero, so 0 marks "nothing pending".
#[derive(Clone, Default)]
struct LoopControl {
	stopped: Arc<AtomicBool>,
	pending: Arc<AtomicI32>,
}

impl LoopControl {
	fn scheduled(&self, id: i32) {
		self.pending.store(id, Ordering::Relaxed);
	}

	/// Called at the top of each frame callback; false once stopped.
	fn begin_frame(&self) -> bool {
		self.pending.store(0, Ordering::Relaxed);
		!self.stopped.load(Ordering::Relaxed)
	}

	/// Mark the loop stopped and hand back the frame request to cancel, once.
	fn stop(&self) -> Option<i32> {
		self.stopped.store(true, Ordering::Relaxed);
		match self.pending.swap(0, Ordering::Relaxed) {
			0 => None,
			id => Some(id),
		}
	}
}

/// A live frame loop; dropping it ends the loop.
struct Running {
	nodes: usize,
	_listeners: Listeners,
	animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl Drop for Running {
	fn drop(&mut self) {
		// breaks the closure's reference to itself
		let _ = self.animate.borrow_mut().take();
	}
}

/// Window listeners feeding the field; removed when dropped.
struct Listeners {
	window: Window,
	resize: Closure<dyn FnMut()>,
	pointer_move: Closure<dyn FnMut(MouseEvent)>,
	pointer_out: Closure<dyn FnMut(MouseEvent)>,
}

impl Listeners {
	fn attach(
		window: Window,
		canvas: HtmlCanvasElement,
		field: Rc<RefCell<ParticleField>>,
	) -> Self {
		let field_resize = field.clone();
		let resize: Closure<dyn FnMut()> = Closure::new(move || {
			match surface::window().and_then(|win| surface::viewport_size(&win)) {
				Ok((w, h)) => {
					canvas.set_width(w as u32);
					canvas.set_height(h as u32);
					field_resize.borrow_mut().resize(w, h);
				}
				Err(err) => warn!("particle field resize skipped: {err}"),
			}
		});

		let field_move = field.clone();
		let pointer_move: Closure<dyn FnMut(MouseEvent)> = Closure::new(move |ev: MouseEvent| {
			field_move
				.borrow_mut()
				.on_pointer_move(ev.client_x() as f64, ev.client_y() as f64);
		});

		let pointer_out: Closure<dyn FnMut(MouseEvent)> = Closure::new(move |ev: MouseEvent| {
			// Leaving the document entirely.
			if ev.related_target().is_none() {
				field.borrow_mut().clear_pointer();
			}
		});

		let listeners = Self {
			window,
			resize,
			pointer_move,
			pointer_out,
		};
		listeners.each(|win, event, cb| {
			let _ = win.add_event_listener_with_callback(event, cb);
		});
		listeners
	}

	fn each(&self, mut f: impl FnMut(&Window, &str, &js_sys::Function)) {
		f(&self.window, "resize", self.resize.as_ref().unchecked_ref());
		f(
			&self.window,
			"mousemove",
			self.pointer_move.as_ref().unchecked_ref(),
		);
		f(
			&self.window,
			"mouseout",
			self.pointer_out.as_ref().unchecked_ref(),
		);
	}
}

impl Drop for Listeners {
	fn drop(&mut self) {
		self.each(|win, event, cb| {
			let _ = win.remove_event_listener_with_callback(event, cb);
		});
	}
}

fn start(
	canvas: HtmlCanvasElement,
	config: FieldConfig,
	palette: Signal<Palette>,
	control: LoopControl,
) -> Result<Running, SurfaceError> {
	let window = surface::window()?;
	let ctx: CanvasRenderingContext2d = surface::context_2d(&canvas)?;
	let (w, h) = surface::viewport_size(&window)?;
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);

	let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
	let mut field = ParticleField::new(config, seed);
	field.resize(w, h);
	let nodes = field.nodes().len();
	let field = Rc::new(RefCell::new(field));

	let listeners = Listeners::attach(window.clone(), canvas, field.clone());

	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let animate_inner = animate.clone();
	let control_first = control.clone();
	let mut last_frame: Option<f64> = None;
	*animate.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
		if !control.begin_frame() {
			return;
		}

		let dt = last_frame.map_or(0.0, |prev| (timestamp - prev) / 1000.0);
		last_frame = Some(timestamp);
		{
			let mut s = field.borrow_mut();
			s.tick(dt);
			palette.with_untracked(|p| render::render(&s, p, &ctx));
		}

		if let (Some(cb), Ok(win)) = (&*animate_inner.borrow(), surface::window()) {
			if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
				control.scheduled(id);
			}
		}
	}));
	if let Some(ref cb) = *animate.borrow() {
		if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			control_first.scheduled(id);
		}
	}
	Ok(Running {
		nodes,
		_listeners: listeners,
		animate,
	})
}
