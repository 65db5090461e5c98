mod app;
mod map;
mod services;

use app::App;

fn main() {
    yew::Renderer::<App>::new().render();
}
