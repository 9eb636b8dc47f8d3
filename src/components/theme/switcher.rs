use leptos::prelude::*;

use super::{Theme, use_theme};

/// Floating button that opens a panel of theme choices.
#[component]
pub fn ThemeSwitcher() -> impl IntoView {
	let theme = use_theme();
	let (open, set_open) = signal(false);

	view! {
		<div class="theme-switcher">
			<button
				class="theme-toggle"
				title="Theme settings"
				on:click=move |_| set_open.update(|o| *o = !*o)
			>
				"◐"
			</button>
			<Show when=move || open.get()>
				<div class="theme-panel">
					<h3>"Theme"</h3>
					{Theme::ALL
						.into_iter()
						.map(|option| {
							view! {
								<button
									class="theme-option"
									class:active=move || theme.get() == option
									style:border-color=option.swatch()
									on:click=move |_| theme.set(option)
								>
									{option.label()}
								</button>
							}
						})
						.collect_view()}
				</div>
			</Show>
		</div>
	}
}
