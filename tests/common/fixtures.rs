//! Test fixtures for common test data
//!
//! Fixtures provide pre-defined test data that can be used across multiple tests.

use user_repository::User;

/// Test user fixtures
pub struct UserFixtures;

impl UserFixtures {
    pub fn ana() -> User {
        User::new(1, "Ana", "Valdes", 26)
    }

    pub fn yuni() -> User {
        User::new(2, "Yuni", "Garcia", 32)
    }

    pub fn gumersindo() -> User {
        User::new(3, "Gumersindo", "Perez", 52)
    }

    /// Every fixture user, ordered by id
    pub fn all() -> Vec<User> {
        vec![Self::ana(), Self::yuni(), Self::gumersindo()]
    }
}
