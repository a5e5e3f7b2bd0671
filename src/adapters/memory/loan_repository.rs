use crate::domain::{Loan, LoanId, UserId};
use crate::ports::loan_repository::{LoanRepository as LoanRepositoryTrait, Result};
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// In-memory implementation of LoanRepository
///
/// Loans are kept in insertion order, which is also borrow order.
#[derive(Default)]
pub struct LoanRepository {
    loans: Mutex<Vec<Loan>>,
}

impl LoanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored loans (active and returned)
    pub fn len(&self) -> usize {
        self.loans.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    /// Replace the loan in place if it exists, otherwise append it
    async fn save(&self, loan: &Loan) -> Result<()> {
        let mut loans = self.loans.lock().unwrap_or_else(PoisonError::into_inner);
        match loans.iter_mut().find(|l| l.loan_id() == loan.loan_id()) {
            Some(existing) => *existing = loan.clone(),
            None => loans.push(loan.clone()),
        }
        Ok(())
    }

    async fn get_by_id(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let loans = self.loans.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(loans.iter().find(|l| l.loan_id() == loan_id).cloned())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Loan>> {
        let loans = self.loans.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(loans
            .iter()
            .filter(|l| l.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Loan>> {
        Ok(self.loans.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}
