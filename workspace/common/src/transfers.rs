use chrono::NaiveDate;
use model::entities::debt_transfer;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::loans::{LoanDto, LoanPaymentDto};
use crate::validators::{non_negative_rate, positive_amount};

/// Request body for moving a loan to another lender.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct TransferLoanRequest {
    pub to_lender_id: i32,
    /// Balance owed to the new lender
    #[validate(custom(function = "positive_amount"))]
    pub transfer_amount: Decimal,
    /// Default: today
    pub transfer_date: Option<NaiveDate>,
    /// New yearly rate in percent (default: keep the current rate)
    #[validate(custom(function = "non_negative_rate"))]
    pub new_annual_rate: Option<Decimal>,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DebtTransferDto {
    pub id: i32,
    pub loan_id: i32,
    pub from_lender_id: i32,
    pub to_lender_id: i32,
    pub transfer_date: NaiveDate,
    pub previous_balance: Decimal,
    pub transfer_amount: Decimal,
    /// `transfer_amount - previous_balance`
    pub amount_difference: Decimal,
    pub reason: Option<String>,
}

impl From<debt_transfer::Model> for DebtTransferDto {
    fn from(model: debt_transfer::Model) -> Self {
        Self {
            id: model.id,
            loan_id: model.loan_id,
            from_lender_id: model.from_lender_id,
            to_lender_id: model.to_lender_id,
            transfer_date: model.transfer_date,
            previous_balance: model.previous_balance,
            transfer_amount: model.transfer_amount,
            amount_difference: model.amount_difference,
            reason: model.reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TransferResultDto {
    pub transfer: DebtTransferDto,
    pub loan: LoanDto,
    /// Open payments now owed to the new lender
    pub payments: Vec<LoanPaymentDto>,
}
