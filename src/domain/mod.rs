pub mod commands;
pub mod errors;
pub mod fine;
pub mod item;
pub mod loan;
pub mod policy;
pub mod user;
pub mod value_objects;

pub use errors::*;
pub use fine::{Fine, PaymentAllocation};
pub use item::{ItemKind, ItemRef, ItemType, LibraryItem};
pub use loan::{ActiveLoan, Loan, LoanCore, ReturnedLoan};
pub use policy::{FineRate, ItemRules, LibraryPolicy};
pub use user::{Admin, User};
pub use value_objects::*;
