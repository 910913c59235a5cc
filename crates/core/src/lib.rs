#![forbid(unsafe_code)]

pub mod model;
pub mod scoring;
pub mod time;
pub mod video;

pub use time::Clock;
