mod app;
mod components;

use app::App;
use themesync::ThemeConfig;

fn main() {
    themesync::logging::init(&ThemeConfig::default().log_filter);
    leptos::mount::mount_to_body(App);
}
