mod borrowing_service;
mod errors;
mod overdue_detection;

pub use borrowing_service::{
    PaymentReceipt, active_loans, borrow_item, can_borrow, has_overdue_items, has_unpaid_fines,
    list_items, loan_history, pay_fine, record_fine, register_item, return_item, unpaid_fines,
};
pub use errors::{BorrowingError, Result};
pub use overdue_detection::{
    MixedMediaReport, TypeOverdueSummary, fine_for, mixed_media_report, overdue_loans,
    overdue_loans_for_user,
};
