//! User model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// User entity
///
/// The `id` is assigned by the caller and is the table's primary key. Values
/// are immutable once built; reads always return fresh instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    #[validate(range(min = 0, max = 150))]
    pub age: i32,
}

impl User {
    pub fn new(id: i64, first_name: impl Into<String>, last_name: impl Into<String>, age: i32) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            age,
        }
    }

    /// Copy of this user with every non-key field replaced
    pub fn with_details(&self, first_name: impl Into<String>, last_name: impl Into<String>, age: i32) -> Self {
        Self::new(self.id, first_name, last_name, age)
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.id, self.first_name, self.last_name, self.age
        )
    }
}
