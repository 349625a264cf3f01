mod components;
mod geo;
mod map;
mod model;
mod snapshot;
mod state;
mod util;

use components::app::App;

fn main() {
    yew::Renderer::<App>::new().render();
}
