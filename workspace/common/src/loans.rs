use chrono::NaiveDate;
use model::entities::lender::{self, LenderType};
use model::entities::loan::{self, LoanStatus, LoanType, PaymentScheme};
use model::entities::loan_payment::{self, PaymentKind, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::validators::{non_negative_rate, positive_amount};

// ===================== Lenders =====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateLenderRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub lender_type: LenderType,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq, Default)]
pub struct UpdateLenderRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub lender_type: Option<LenderType>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LenderDto {
    pub id: i32,
    pub name: String,
    pub lender_type: LenderType,
    pub description: Option<String>,
    pub contact_info: Option<String>,
}

impl From<lender::Model> for LenderDto {
    fn from(model: lender::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            lender_type: model.lender_type,
            description: model.description,
            contact_info: model.contact_info,
        }
    }
}

// ===================== Loans =====================

/// Request body for registering a loan. The schedule is generated on creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateLoanRequest {
    pub lender_id: i32,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub loan_type: LoanType,
    #[validate(custom(function = "positive_amount"))]
    pub principal: Decimal,
    /// Yearly interest rate in percent
    #[validate(custom(function = "non_negative_rate"))]
    pub annual_rate: Decimal,
    #[validate(range(min = 1, max = 600))]
    pub term_months: i32,
    pub issue_date: NaiveDate,
    pub payment_scheme: PaymentScheme,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Parameters of an amortization table computed without storing anything.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct SchedulePreviewRequest {
    #[validate(custom(function = "positive_amount"))]
    pub principal: Decimal,
    #[validate(custom(function = "non_negative_rate"))]
    pub annual_rate: Decimal,
    #[validate(range(min = 1, max = 600))]
    pub term_months: i32,
    pub issue_date: NaiveDate,
    pub payment_scheme: PaymentScheme,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams, Validate, Default)]
pub struct LoanQuery {
    /// Only loans currently held by this lender
    pub lender_id: Option<i32>,
    pub status: Option<LoanStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LoanDto {
    pub id: i32,
    pub original_lender_id: i32,
    pub lender_id: i32,
    pub name: String,
    pub loan_type: LoanType,
    pub principal: Decimal,
    pub annual_rate: Decimal,
    pub term_months: i32,
    pub issue_date: NaiveDate,
    pub payment_scheme: PaymentScheme,
    pub remaining_balance: Decimal,
    pub status: LoanStatus,
    pub description: Option<String>,
}

impl From<loan::Model> for LoanDto {
    fn from(model: loan::Model) -> Self {
        Self {
            id: model.id,
            original_lender_id: model.original_lender_id,
            lender_id: model.lender_id,
            name: model.name,
            loan_type: model.loan_type,
            principal: model.principal,
            annual_rate: model.annual_rate,
            term_months: model.term_months,
            issue_date: model.issue_date,
            payment_scheme: model.payment_scheme,
            remaining_balance: model.remaining_balance,
            status: model.status,
            description: model.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LoanPaymentDto {
    pub id: i32,
    pub loan_id: i32,
    pub lender_id: i32,
    pub sequence: i32,
    pub scheduled_date: NaiveDate,
    pub principal_amount: Decimal,
    pub interest_amount: Decimal,
    pub total_amount: Decimal,
    pub status: PaymentStatus,
    pub kind: PaymentKind,
    pub executed_date: Option<NaiveDate>,
    pub transaction_id: Option<i32>,
}

impl From<loan_payment::Model> for LoanPaymentDto {
    fn from(model: loan_payment::Model) -> Self {
        Self {
            id: model.id,
            loan_id: model.loan_id,
            lender_id: model.lender_id,
            sequence: model.sequence,
            scheduled_date: model.scheduled_date,
            principal_amount: model.principal_amount,
            interest_amount: model.interest_amount,
            total_amount: model.total_amount,
            status: model.status,
            kind: model.kind,
            executed_date: model.executed_date,
            transaction_id: model.transaction_id,
        }
    }
}

/// One row of a computed amortization table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ScheduledPaymentDto {
    pub sequence: u32,
    pub date: NaiveDate,
    pub principal: Decimal,
    pub interest: Decimal,
    pub total: Decimal,
    pub balance_after: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LoanWithScheduleDto {
    pub loan: LoanDto,
    pub payments: Vec<LoanPaymentDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, Default, PartialEq)]
pub struct ExecutePaymentRequest {
    /// Payment date (default: today)
    pub executed_date: Option<NaiveDate>,
    /// Category of the generated expense transaction
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum RepaymentMode {
    /// Keep the number of payments, lower each payment
    ReducePayment,
    /// Keep the payment, drop trailing payments
    ReduceTerm,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct EarlyRepaymentRequest {
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    /// Repayment date (default: today)
    pub date: Option<NaiveDate>,
    pub mode: RepaymentMode,
    pub category_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct EarlyRepaymentResultDto {
    pub loan: LoanDto,
    /// The executed early repayment entry
    pub repayment: LoanPaymentDto,
    pub cancelled_payments: u64,
    /// Remaining open schedule
    pub payments: Vec<LoanPaymentDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LoanSummaryDto {
    pub loan_id: i32,
    pub total_paid: Decimal,
    pub principal_paid: Decimal,
    pub interest_paid: Decimal,
    pub remaining_balance: Decimal,
    pub open_payments: u64,
    pub overdue_payments: u64,
    pub next_payment_date: Option<NaiveDate>,
    pub next_payment_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RefreshResultDto {
    /// Payments whose status changed
    pub updated: u64,
}
