//! Simple to use cli for logging what you eat. Take a photo of your food, give it a name, and see
//! which foods you eat the most and how that changes by day, by weekday and by month.
//!

pub mod cli;
pub mod session;
pub mod storage;
pub mod utils;
pub mod views;
