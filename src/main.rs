use leptos::prelude::*;
use particle_field_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App);
}
