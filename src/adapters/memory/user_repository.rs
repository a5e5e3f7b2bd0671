use crate::domain::{User, UserId};
use crate::ports::user_repository::{Result, UserRepository as UserRepositoryTrait};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// In-memory implementation of UserRepository
#[derive(Default)]
pub struct UserRepository {
    users: Mutex<Vec<User>>,
}

impl UserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn insert(&self, user: &User) -> Result<bool> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if users.contains(user) {
            return Ok(false);
        }
        users.push(user.clone());
        Ok(true)
    }

    async fn find(&self, user_id: &UserId) -> Result<Option<User>> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.iter().find(|u| &u.user_id == user_id).cloned())
    }

    async fn remove(&self, user_id: &UserId) -> Result<bool> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        let before = users.len();
        users.retain(|u| &u.user_id != user_id);
        Ok(users.len() != before)
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.users.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}
