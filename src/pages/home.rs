use leptos::prelude::*;

use crate::components::particle_field::ParticleFieldCanvas;
use crate::components::theme::{ThemeSwitcher, use_theme};

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let theme = use_theme();
	let palette = Signal::derive(move || theme.get().palette());

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="portfolio" style:background=move || theme.get().backdrop()>
				<ParticleFieldCanvas palette=palette />
				<ThemeSwitcher />
				<section id="hero" class="hero">
					<h1>"Hi, I'm Alex"</h1>
					<p class="subtitle">"Developer, tinkerer, occasional musician."</p>
				</section>
			</div>
		</ErrorBoundary>
	}
}
