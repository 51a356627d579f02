//! Recipe entities.

pub mod model;

pub use model::{Ingredient, Recipe};
