pub mod camera;
pub mod config;
pub mod filter;
pub mod ids;
pub mod markup;
pub mod models;
pub mod popup;
pub mod public;
pub mod session;
pub mod surface;
pub mod sync;
pub mod view;
