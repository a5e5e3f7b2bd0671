use crate::domain::Admin;
use crate::ports::admin_repository::{AdminRepository as AdminRepositoryTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// In-memory implementation of AdminRepository
#[derive(Default)]
pub struct AdminRepository {
    admins: Mutex<HashMap<String, Admin>>,
}

impl AdminRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminRepositoryTrait for AdminRepository {
    async fn save(&self, admin: &Admin) -> Result<()> {
        self.admins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(admin.username.clone(), admin.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let admins = self.admins.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(admins.get(username).cloned())
    }
}
