use crate::entity_iden::EntityIden;
use model::entities::prelude::{
    Category, PendingPayment, PlannedOccurrence, PlannedTransaction, RecurrenceRule, Transaction,
};
use model::entities::{
    category, pending_payment, planned_occurrence, planned_transaction, recurrence_rule,
    transaction,
};
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Category::table())
                    .if_not_exists()
                    .col(pk_auto(Category::column(category::Column::Id)))
                    .col(string(Category::column(category::Column::Name)).unique_key())
                    .col(string_len(Category::column(category::Column::CategoryType), 10))
                    .col(string_null(Category::column(category::Column::Description)))
                    .to_owned(),
            )
            .await?;

        // Create transactions table
        manager
            .create_table(
                Table::create()
                    .table(Transaction::table())
                    .if_not_exists()
                    .col(pk_auto(Transaction::column(transaction::Column::Id)))
                    .col(date(Transaction::column(transaction::Column::Date)))
                    .col(decimal(Transaction::column(transaction::Column::Amount)).decimal_len(16, 4))
                    .col(string_len(
                        Transaction::column(transaction::Column::TransactionType),
                        10,
                    ))
                    .col(integer_null(Transaction::column(transaction::Column::CategoryId)))
                    .col(string_null(Transaction::column(transaction::Column::Description)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_category")
                            .from(
                                Transaction::table(),
                                Transaction::column(transaction::Column::CategoryId),
                            )
                            .to(Category::table(), Category::column(category::Column::Id))
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create planned_transactions table
        manager
            .create_table(
                Table::create()
                    .table(PlannedTransaction::table())
                    .if_not_exists()
                    .col(pk_auto(PlannedTransaction::column(planned_transaction::Column::Id)))
                    .col(string(PlannedTransaction::column(planned_transaction::Column::Name)))
                    .col(
                        decimal(PlannedTransaction::column(planned_transaction::Column::Amount))
                            .decimal_len(16, 4),
                    )
                    .col(string_len(
                        PlannedTransaction::column(planned_transaction::Column::TransactionType),
                        10,
                    ))
                    .col(integer_null(PlannedTransaction::column(
                        planned_transaction::Column::CategoryId,
                    )))
                    .col(date(PlannedTransaction::column(planned_transaction::Column::StartDate)))
                    .col(
                        boolean(PlannedTransaction::column(planned_transaction::Column::IsActive))
                            .default(true),
                    )
                    .col(string_null(PlannedTransaction::column(
                        planned_transaction::Column::Description,
                    )))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_planned_transactions_category")
                            .from(
                                PlannedTransaction::table(),
                                PlannedTransaction::column(planned_transaction::Column::CategoryId),
                            )
                            .to(Category::table(), Category::column(category::Column::Id))
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create recurrence_rules table
        manager
            .create_table(
                Table::create()
                    .table(RecurrenceRule::table())
                    .if_not_exists()
                    .col(pk_auto(RecurrenceRule::column(recurrence_rule::Column::Id)))
                    .col(
                        integer(RecurrenceRule::column(
                            recurrence_rule::Column::PlannedTransactionId,
                        ))
                        .unique_key(),
                    )
                    .col(string_len(RecurrenceRule::column(recurrence_rule::Column::Frequency), 10))
                    .col(integer(RecurrenceRule::column(recurrence_rule::Column::Interval)).default(1))
                    .col(string_len(
                        RecurrenceRule::column(recurrence_rule::Column::IntervalUnit),
                        10,
                    ))
                    .col(string_null(RecurrenceRule::column(recurrence_rule::Column::Weekdays)))
                    .col(
                        boolean(RecurrenceRule::column(recurrence_rule::Column::OnlyWorkdays))
                            .default(false),
                    )
                    .col(string_len(
                        RecurrenceRule::column(recurrence_rule::Column::EndCondition),
                        10,
                    ))
                    .col(date_null(RecurrenceRule::column(recurrence_rule::Column::EndDate)))
                    .col(integer_null(RecurrenceRule::column(
                        recurrence_rule::Column::OccurrenceCount,
                    )))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recurrence_rules_planned_transaction")
                            .from(
                                RecurrenceRule::table(),
                                RecurrenceRule::column(recurrence_rule::Column::PlannedTransactionId),
                            )
                            .to(
                                PlannedTransaction::table(),
                                PlannedTransaction::column(planned_transaction::Column::Id),
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create planned_occurrences table
        manager
            .create_table(
                Table::create()
                    .table(PlannedOccurrence::table())
                    .if_not_exists()
                    .col(pk_auto(PlannedOccurrence::column(planned_occurrence::Column::Id)))
                    .col(integer(PlannedOccurrence::column(
                        planned_occurrence::Column::PlannedTransactionId,
                    )))
                    .col(date(PlannedOccurrence::column(
                        planned_occurrence::Column::OccurrenceDate,
                    )))
                    .col(
                        decimal(PlannedOccurrence::column(planned_occurrence::Column::Amount))
                            .decimal_len(16, 4),
                    )
                    .col(string_len(
                        PlannedOccurrence::column(planned_occurrence::Column::Status),
                        10,
                    ))
                    .col(date_null(PlannedOccurrence::column(
                        planned_occurrence::Column::ExecutedDate,
                    )))
                    .col(integer_null(PlannedOccurrence::column(
                        planned_occurrence::Column::TransactionId,
                    )))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_planned_occurrences_planned_transaction")
                            .from(
                                PlannedOccurrence::table(),
                                PlannedOccurrence::column(
                                    planned_occurrence::Column::PlannedTransactionId,
                                ),
                            )
                            .to(
                                PlannedTransaction::table(),
                                PlannedTransaction::column(planned_transaction::Column::Id),
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_planned_occurrences_transaction")
                            .from(
                                PlannedOccurrence::table(),
                                PlannedOccurrence::column(planned_occurrence::Column::TransactionId),
                            )
                            .to(Transaction::table(), Transaction::column(transaction::Column::Id))
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One occurrence per plan and date
        manager
            .create_index(
                Index::create()
                    .name("idx_planned_occurrences_plan_date")
                    .table(PlannedOccurrence::table())
                    .col(PlannedOccurrence::column(
                        planned_occurrence::Column::PlannedTransactionId,
                    ))
                    .col(PlannedOccurrence::column(
                        planned_occurrence::Column::OccurrenceDate,
                    ))
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Create pending_payments table
        manager
            .create_table(
                Table::create()
                    .table(PendingPayment::table())
                    .if_not_exists()
                    .col(pk_auto(PendingPayment::column(pending_payment::Column::Id)))
                    .col(string(PendingPayment::column(pending_payment::Column::Name)))
                    .col(
                        decimal(PendingPayment::column(pending_payment::Column::Amount))
                            .decimal_len(16, 4),
                    )
                    .col(integer_null(PendingPayment::column(
                        pending_payment::Column::CategoryId,
                    )))
                    .col(string_len(PendingPayment::column(pending_payment::Column::Priority), 10))
                    .col(date_null(PendingPayment::column(pending_payment::Column::TargetDate)))
                    .col(string_len(PendingPayment::column(pending_payment::Column::Status), 10))
                    .col(date_null(PendingPayment::column(
                        pending_payment::Column::ExecutedDate,
                    )))
                    .col(integer_null(PendingPayment::column(
                        pending_payment::Column::TransactionId,
                    )))
                    .col(string_null(PendingPayment::column(pending_payment::Column::Notes)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pending_payments_category")
                            .from(
                                PendingPayment::table(),
                                PendingPayment::column(pending_payment::Column::CategoryId),
                            )
                            .to(Category::table(), Category::column(category::Column::Id))
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pending_payments_transaction")
                            .from(
                                PendingPayment::table(),
                                PendingPayment::column(pending_payment::Column::TransactionId),
                            )
                            .to(Transaction::table(), Transaction::column(transaction::Column::Id))
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(PendingPayment::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlannedOccurrence::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurrenceRule::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlannedTransaction::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transaction::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Category::table()).to_owned())
            .await?;

        Ok(())
    }
}
