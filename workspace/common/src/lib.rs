//! Common transport-layer types.
//! Request and response payloads of the HTTP API, shared by the handlers,
//! the service layer and the CLI so every surface speaks the same shapes.

mod categories;
mod loans;
mod overview;
mod pending;
mod planned;
mod transactions;
mod transfers;
pub mod validators;

pub use categories::{CategoryDto, CategoryQuery, CreateCategoryRequest, UpdateCategoryRequest};
pub use loans::{
    CreateLenderRequest, CreateLoanRequest, EarlyRepaymentRequest, EarlyRepaymentResultDto,
    ExecutePaymentRequest, LenderDto, LoanDto, LoanPaymentDto, LoanQuery, LoanSummaryDto,
    LoanWithScheduleDto, RefreshResultDto, RepaymentMode, ScheduledPaymentDto,
    SchedulePreviewRequest, UpdateLenderRequest,
};
pub use overview::{LoanPaymentDueDto, OverviewDto, OverviewQuery};
pub use pending::{
    CreatePendingRequest, ExecutePendingRequest, PendingPaymentDto, PendingQuery,
    UpdatePendingRequest,
};
pub use planned::{
    CreatePlannedRequest, ExecuteOccurrenceRequest, MaterializeRequest, MaterializeResultDto,
    OccurrenceDto, OccurrencePreviewDto, PlannedQuery, PlannedTransactionDto, RecurrenceRuleDto,
    RecurrenceRuleRequest, UpcomingOccurrenceDto, UpdatePlannedRequest, WindowQuery,
};
pub use transactions::{
    CreateTransactionRequest, PeriodQuery, PeriodSummaryDto, TransactionDto, TransactionQuery,
    UpdateTransactionRequest,
};
pub use transfers::{DebtTransferDto, TransferLoanRequest, TransferResultDto};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use model::entities::transaction::TransactionType;
    use rust_decimal_macros::dec;
    use validator::Validate;

    #[test]
    fn test_api_response_shape() {
        let response = ApiResponse::ok(vec![1, 2, 3], "Listed");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Listed");
        assert_eq!(json["data"][2], 3);
    }

    #[test]
    fn test_decimal_amounts_serialize_as_strings() {
        let dto = TransactionDto {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            amount: dec!(12.50),
            transaction_type: TransactionType::Expense,
            category_id: None,
            description: None,
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["amount"], "12.50");
        assert_eq!(json["transaction_type"], "Expense");
        assert_eq!(json["date"], "2024-05-01");
    }

    #[test]
    fn test_request_validation() {
        let request: CreateTransactionRequest = serde_json::from_value(serde_json::json!({
            "date": "2024-05-01",
            "amount": "-5",
            "transaction_type": "Expense"
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: CreateCategoryRequest = serde_json::from_value(serde_json::json!({
            "name": "",
            "category_type": "Income"
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: CreateLoanRequest = serde_json::from_value(serde_json::json!({
            "lender_id": 1,
            "name": "Car",
            "loan_type": "Car",
            "principal": "12000",
            "annual_rate": "12",
            "term_months": 12,
            "issue_date": "2024-01-15",
            "payment_scheme": "Annuity"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_nested_recurrence_validation() {
        let request: CreatePlannedRequest = serde_json::from_value(serde_json::json!({
            "name": "Rent",
            "amount": "1200",
            "transaction_type": "Expense",
            "start_date": "2024-01-01",
            "recurrence": { "frequency": "Monthly", "interval": 0 }
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
