//! Backend and geocoder access, run off the UI thread.

mod client;
mod geocoder;
mod worker;

pub use client::{parse_list, ApiClient};
pub use geocoder::{parse_places, Geocoder, Located};
pub use worker::{Job, Outcome, Worker};
