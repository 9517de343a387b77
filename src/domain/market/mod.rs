pub mod bar;

pub use bar::{Bar, aggregate_daily};
