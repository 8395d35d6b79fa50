mod app;
mod dom;
mod images;
mod render;
mod sidebar;
mod state;

pub use app::run;
