//! Provides certificate classification and certification path building

pub mod classifier;
pub mod path_builder;

pub use crate::{builder::classifier::*, builder::path_builder::*};
