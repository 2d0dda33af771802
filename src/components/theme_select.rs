use leptos::prelude::*;
use tracing::{info, warn};

use themesync::{ThemeSwitcher, THEME_NAMES};

/// A `<select>` bound to the [`ThemeSwitcher`] in context.
#[component]
pub fn ThemeSelect() -> impl IntoView {
    let switcher = expect_context::<ThemeSwitcher>();

    let on_change = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        info!("Selected theme: {}", value);
        if let Err(e) = switcher.set(&value) {
            warn!("Failed to save theme: {}", e);
        }
    };

    view! {
        <select
            class="theme-select rounded-lg p-4 font-semibold capitalize shadow"
            prop:value=move || switcher.theme.get().to_string()
            on:change=on_change
        >
            {THEME_NAMES
                .iter()
                .map(|name| {
                    view! {
                        <option class="capitalize" value=name.as_str()>
                            {name.as_str()}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
}
