use crate::domain::{Fine, UserId};
use crate::ports::fine_repository::{FineRepository as FineRepositoryTrait, Result};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// In-memory implementation of FineRepository
///
/// The backing vector preserves creation order for payment allocation.
#[derive(Default)]
pub struct FineRepository {
    fines: Mutex<Vec<Fine>>,
}

impl FineRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FineRepositoryTrait for FineRepository {
    async fn save(&self, fine: &Fine) -> Result<()> {
        let mut fines = self.fines.lock().unwrap_or_else(PoisonError::into_inner);
        match fines.iter_mut().find(|f| f.fine_id == fine.fine_id) {
            Some(existing) => *existing = fine.clone(),
            None => fines.push(fine.clone()),
        }
        Ok(())
    }

    async fn save_all(&self, updated: &[Fine]) -> Result<()> {
        let mut fines = self.fines.lock().unwrap_or_else(PoisonError::into_inner);
        for fine in updated {
            match fines.iter_mut().find(|f| f.fine_id == fine.fine_id) {
                Some(existing) => *existing = fine.clone(),
                None => fines.push(fine.clone()),
            }
        }
        Ok(())
    }

    async fn find_unpaid_for_user(&self, user_id: &UserId) -> Result<Vec<Fine>> {
        let fines = self.fines.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(fines
            .iter()
            .filter(|f| &f.user_id == user_id && !f.paid)
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Fine>> {
        let fines = self.fines.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(fines
            .iter()
            .filter(|f| &f.user_id == user_id)
            .cloned()
            .collect())
    }
}
