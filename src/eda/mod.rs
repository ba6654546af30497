// src/eda/mod.rs

pub mod frame;
pub mod stats;

#[cfg(test)]
mod tests;

pub use frame::{ColumnClasses, DataFrame, FrameError};
