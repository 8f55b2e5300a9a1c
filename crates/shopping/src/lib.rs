pub mod aggregation;

// Re-export commonly used types
pub use aggregation::{AggregationKey, IngredientLine, ShoppingList, aggregate};
