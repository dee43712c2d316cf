mod app;
mod app_state;
mod board;
mod config;
mod drawing;
mod event_handler;
mod font;
mod geometry;
mod history;
mod laser;
mod renderer;
mod scene;
mod selection;
mod state;
mod tessellate;
mod text_renderer;
mod ui;
mod update_logic;
mod vertex;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub(crate) use web_time::Instant;
    } else {
        pub(crate) use std::time::Instant;
    }
}

// Re-export the main public interface
pub use app::run;
pub use config::Config;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    if let Err(err) = run(Config::default()) {
        log::error!("{err:#}");
    }
}
