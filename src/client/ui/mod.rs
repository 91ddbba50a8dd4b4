mod form;
mod leaderboard;
mod modal;
mod quiz;
mod render;
mod welcome;

pub use render::render;
