//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the finance tracking application here.

pub mod category;
pub mod debt_transfer;
pub mod lender;
pub mod loan;
pub mod loan_payment;
pub mod pending_payment;
pub mod planned_occurrence;
pub mod planned_transaction;
pub mod recurrence_rule;
pub mod transaction;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::category::Entity as Category;
    pub use super::debt_transfer::Entity as DebtTransfer;
    pub use super::lender::Entity as Lender;
    pub use super::loan::Entity as Loan;
    pub use super::loan_payment::Entity as LoanPayment;
    pub use super::pending_payment::Entity as PendingPayment;
    pub use super::planned_occurrence::Entity as PlannedOccurrence;
    pub use super::planned_transaction::Entity as PlannedTransaction;
    pub use super::recurrence_rule::Entity as RecurrenceRule;
    pub use super::transaction::Entity as Transaction;
}
