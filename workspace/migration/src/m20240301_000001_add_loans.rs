use crate::entity_iden::EntityIden;
use model::entities::prelude::{DebtTransfer, Lender, Loan, LoanPayment, Transaction};
use model::entities::{debt_transfer, lender, loan, loan_payment, transaction};
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create lenders table
        manager
            .create_table(
                Table::create()
                    .table(Lender::table())
                    .if_not_exists()
                    .col(pk_auto(Lender::column(lender::Column::Id)))
                    .col(string(Lender::column(lender::Column::Name)).unique_key())
                    .col(string_len(Lender::column(lender::Column::LenderType), 15))
                    .col(string_null(Lender::column(lender::Column::Description)))
                    .col(string_null(Lender::column(lender::Column::ContactInfo)))
                    .to_owned(),
            )
            .await?;

        // Create loans table
        manager
            .create_table(
                Table::create()
                    .table(Loan::table())
                    .if_not_exists()
                    .col(pk_auto(Loan::column(loan::Column::Id)))
                    .col(integer(Loan::column(loan::Column::OriginalLenderId)))
                    .col(integer(Loan::column(loan::Column::LenderId)))
                    .col(string(Loan::column(loan::Column::Name)))
                    .col(string_len(Loan::column(loan::Column::LoanType), 15))
                    .col(decimal(Loan::column(loan::Column::Principal)).decimal_len(16, 4))
                    .col(decimal(Loan::column(loan::Column::AnnualRate)).decimal_len(8, 4))
                    .col(integer(Loan::column(loan::Column::TermMonths)))
                    .col(date(Loan::column(loan::Column::IssueDate)))
                    .col(string_len(Loan::column(loan::Column::PaymentScheme), 15))
                    .col(decimal(Loan::column(loan::Column::RemainingBalance)).decimal_len(16, 4))
                    .col(string_len(Loan::column(loan::Column::Status), 10))
                    .col(string_null(Loan::column(loan::Column::Description)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loans_lender")
                            .from(Loan::table(), Loan::column(loan::Column::LenderId))
                            .to(Lender::table(), Lender::column(lender::Column::Id))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loans_original_lender")
                            .from(Loan::table(), Loan::column(loan::Column::OriginalLenderId))
                            .to(Lender::table(), Lender::column(lender::Column::Id))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create loan_payments table
        manager
            .create_table(
                Table::create()
                    .table(LoanPayment::table())
                    .if_not_exists()
                    .col(pk_auto(LoanPayment::column(loan_payment::Column::Id)))
                    .col(integer(LoanPayment::column(loan_payment::Column::LoanId)))
                    .col(integer(LoanPayment::column(loan_payment::Column::LenderId)))
                    .col(integer(LoanPayment::column(loan_payment::Column::Sequence)))
                    .col(date(LoanPayment::column(loan_payment::Column::ScheduledDate)))
                    .col(
                        decimal(LoanPayment::column(loan_payment::Column::PrincipalAmount))
                            .decimal_len(16, 4),
                    )
                    .col(
                        decimal(LoanPayment::column(loan_payment::Column::InterestAmount))
                            .decimal_len(16, 4),
                    )
                    .col(
                        decimal(LoanPayment::column(loan_payment::Column::TotalAmount))
                            .decimal_len(16, 4),
                    )
                    .col(string_len(LoanPayment::column(loan_payment::Column::Status), 15))
                    .col(string_len(LoanPayment::column(loan_payment::Column::Kind), 15))
                    .col(date_null(LoanPayment::column(loan_payment::Column::ExecutedDate)))
                    .col(integer_null(LoanPayment::column(loan_payment::Column::TransactionId)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loan_payments_loan")
                            .from(LoanPayment::table(), LoanPayment::column(loan_payment::Column::LoanId))
                            .to(Loan::table(), Loan::column(loan::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loan_payments_lender")
                            .from(
                                LoanPayment::table(),
                                LoanPayment::column(loan_payment::Column::LenderId),
                            )
                            .to(Lender::table(), Lender::column(lender::Column::Id))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loan_payments_transaction")
                            .from(
                                LoanPayment::table(),
                                LoanPayment::column(loan_payment::Column::TransactionId),
                            )
                            .to(Transaction::table(), Transaction::column(transaction::Column::Id))
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create debt_transfers table
        manager
            .create_table(
                Table::create()
                    .table(DebtTransfer::table())
                    .if_not_exists()
                    .col(pk_auto(DebtTransfer::column(debt_transfer::Column::Id)))
                    .col(integer(DebtTransfer::column(debt_transfer::Column::LoanId)))
                    .col(integer(DebtTransfer::column(debt_transfer::Column::FromLenderId)))
                    .col(integer(DebtTransfer::column(debt_transfer::Column::ToLenderId)))
                    .col(date(DebtTransfer::column(debt_transfer::Column::TransferDate)))
                    .col(
                        decimal(DebtTransfer::column(debt_transfer::Column::PreviousBalance))
                            .decimal_len(16, 4),
                    )
                    .col(
                        decimal(DebtTransfer::column(debt_transfer::Column::TransferAmount))
                            .decimal_len(16, 4),
                    )
                    .col(
                        decimal(DebtTransfer::column(debt_transfer::Column::AmountDifference))
                            .decimal_len(16, 4),
                    )
                    .col(string_null(DebtTransfer::column(debt_transfer::Column::Reason)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_debt_transfers_loan")
                            .from(
                                DebtTransfer::table(),
                                DebtTransfer::column(debt_transfer::Column::LoanId),
                            )
                            .to(Loan::table(), Loan::column(loan::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_debt_transfers_from_lender")
                            .from(
                                DebtTransfer::table(),
                                DebtTransfer::column(debt_transfer::Column::FromLenderId),
                            )
                            .to(Lender::table(), Lender::column(lender::Column::Id))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_debt_transfers_to_lender")
                            .from(
                                DebtTransfer::table(),
                                DebtTransfer::column(debt_transfer::Column::ToLenderId),
                            )
                            .to(Lender::table(), Lender::column(lender::Column::Id))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DebtTransfer::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoanPayment::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Loan::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lender::table()).to_owned())
            .await?;

        Ok(())
    }
}
