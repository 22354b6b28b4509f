//! Test factories for generating test data
//!
//! Factories create unique test data for each call, useful when a test needs
//! many distinct users.

use std::sync::atomic::{AtomicI64, Ordering};

use user_repository::User;

/// Factory for creating test users with unique ids
pub struct UserFactory {
    counter: AtomicI64,
}

impl Default for UserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserFactory {
    pub fn new() -> Self {
        Self::starting_at(100)
    }

    pub fn starting_at(first_id: i64) -> Self {
        Self {
            counter: AtomicI64::new(first_id),
        }
    }

    /// Create a unique test user
    pub fn create(&self) -> User {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        User::new(
            n,
            format!("first_{}", n),
            format!("last_{}", n),
            (n % 90) as i32 + 10,
        )
    }

    /// Create `count` unique test users
    pub fn create_many(&self, count: usize) -> Vec<User> {
        (0..count).map(|_| self.create()).collect()
    }
}
