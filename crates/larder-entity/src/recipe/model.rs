//! Recipe entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use larder_core::error::AppError;
use larder_core::types::RecipeId;

/// A single ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient identifier, unique within the recipe.
    pub id: Uuid,
    /// Ingredient name.
    pub name: String,
    /// Quantity as entered, e.g. `"200"` or `"1/2"`.
    pub quantity: String,
    /// Unit of measure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Resolved category, if the categorizer placed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Ingredient {
    /// Create a new ingredient line.
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, unit: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity: quantity.into(),
            unit,
            category: None,
        }
    }
}

/// A recipe owned by the household.
///
/// Recipes are created, edited, and deleted by direct user command only;
/// they have no list memberships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier.
    pub id: RecipeId,
    /// Recipe name.
    pub name: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Number of servings the quantities are scaled for. Always positive.
    pub servings: u32,
    /// Ordered ingredient lines.
    pub ingredients: Vec<Ingredient>,
    /// Instruction lines, in order. May be empty.
    #[serde(default)]
    pub instructions: Vec<String>,
    /// When the recipe was created.
    pub created_at: DateTime<Utc>,
    /// When the recipe was last edited.
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Create a new recipe.
    pub fn new(name: impl Into<String>, servings: u32, ingredients: Vec<Ingredient>) -> Self {
        let now = Utc::now();
        Self {
            id: RecipeId::new(),
            name: name.into(),
            description: None,
            servings,
            ingredients,
            instructions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate entity-level invariants.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Recipe name must not be empty"));
        }
        if self.servings == 0 {
            return Err(AppError::validation("Recipe servings must be positive"));
        }
        Ok(())
    }

    /// Mark the recipe as edited now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
