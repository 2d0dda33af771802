use leptos::prelude::*;
use tracing::error;

use themesync::web::theme_manager_from_config;
use themesync::{use_theme_switcher, ThemeConfig, ThemeError, ThemeSwitcher, UseThemeSwitcherOptions};

use crate::components::theme_select::ThemeSelect;

fn mount_switcher(config: ThemeConfig) -> Result<ThemeSwitcher, ThemeError> {
    let manager = theme_manager_from_config(&config)?;
    use_theme_switcher(UseThemeSwitcherOptions::from_config(manager, config))
}

#[component]
pub fn App() -> impl IntoView {
    let switcher = match mount_switcher(ThemeConfig::default()) {
        Ok(switcher) => switcher,
        Err(e) => {
            error!("Theme switcher unavailable: {}", e);
            return view! { <p class="status-text">"Theme storage is unavailable"</p> }.into_any();
        }
    };
    provide_context(switcher);

    view! {
        <main class="grid min-h-[100dvh] place-items-center">
            <ThemeSelect />
        </main>
    }
    .into_any()
}
