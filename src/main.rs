mod app_core;
mod app_router;
mod persisted_store;
mod puzzle_image;
mod yew_app;

use yew_app::App;

fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
