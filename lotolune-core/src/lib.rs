pub mod bias;
pub mod calendar;
pub mod error;
pub mod frequency;
pub mod lunar;
pub mod monthly;
pub mod store;
pub mod strategy;
pub mod tercile;
