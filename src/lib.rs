pub mod api;
pub mod app;
pub mod braille;
pub mod canvas;
pub mod config;
pub mod data;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod map;
pub mod model;
pub mod ui;
pub mod wkt;
