#[cfg(test)]
mod integration_tests {
    use crate::schemas::ApiResponse;
    use crate::test_utils::test_utils::setup_test_app;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{Days, Local, NaiveDate};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use std::str::FromStr;

    async fn server() -> TestServer {
        TestServer::new(setup_test_app().await).unwrap()
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn decimal(value: &Value) -> Decimal {
        match value {
            Value::String(s) => Decimal::from_str(s).unwrap(),
            Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
            other => panic!("expected a decimal, got {}", other),
        }
    }

    fn id_of(body: &Value) -> i64 {
        body["id"].as_i64().unwrap()
    }

    async fn post_created(server: &TestServer, path: &str, body: Value) -> Value {
        let response = server.post(path).json(&body).await;
        if response.status_code() != StatusCode::CREATED {
            panic!("POST {} returned {}: {}", path, response.status_code(), response.text());
        }
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        body.data
    }

    async fn get_data(server: &TestServer, path: &str) -> Value {
        let response = server.get(path).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        body.data
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = server().await;

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_category_crud() {
        let server = server().await;

        let created = post_created(
            &server,
            "/api/v1/categories",
            json!({ "name": "Groceries", "category_type": "Expense" }),
        )
        .await;
        let id = id_of(&created);
        assert_eq!(created["name"], "Groceries");

        let duplicate = server
            .post("/api/v1/categories")
            .json(&json!({ "name": "Groceries", "category_type": "Expense" }))
            .await;
        duplicate.assert_status(StatusCode::CONFLICT);
        let error: Value = duplicate.json();
        assert_eq!(error["code"], "CONFLICT");
        assert_eq!(error["success"], false);

        let response = server
            .put(&format!("/api/v1/categories/{}", id))
            .json(&json!({ "name": "Food" }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["name"], "Food");
        assert_eq!(body.data["category_type"], "Expense");

        let listed = get_data(&server, "/api/v1/categories?category_type=Expense").await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        server
            .delete(&format!("/api/v1/categories/{}", id))
            .await
            .assert_status(StatusCode::OK);
        server
            .get(&format!("/api/v1/categories/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_category_in_use_cannot_be_deleted() {
        let server = server().await;

        let category = post_created(
            &server,
            "/api/v1/categories",
            json!({ "name": "Salary", "category_type": "Income" }),
        )
        .await;
        post_created(
            &server,
            "/api/v1/transactions",
            json!({
                "date": "2024-05-10",
                "amount": "2500.00",
                "transaction_type": "Income",
                "category_id": id_of(&category)
            }),
        )
        .await;

        server
            .delete(&format!("/api/v1/categories/{}", id_of(&category)))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_transaction_validation_errors() {
        let server = server().await;

        server
            .post("/api/v1/transactions")
            .json(&json!({ "date": "2024-05-10", "amount": "-5", "transaction_type": "Expense" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let unknown_category = server
            .post("/api/v1/transactions")
            .json(&json!({
                "date": "2024-05-10",
                "amount": "5",
                "transaction_type": "Expense",
                "category_id": 4242
            }))
            .await;
        unknown_category.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = unknown_category.json();
        assert_eq!(error["code"], "VALIDATION_ERROR");

        server
            .get("/api/v1/transactions/summary?from=2024-06-01&to=2024-05-01")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_period_summary() {
        let server = server().await;

        for (date, amount, kind) in [
            ("2024-05-01", "3000", "Income"),
            ("2024-05-03", "120.50", "Expense"),
            ("2024-05-20", "79.50", "Expense"),
            ("2024-06-02", "999", "Expense"),
        ] {
            post_created(
                &server,
                "/api/v1/transactions",
                json!({ "date": date, "amount": amount, "transaction_type": kind }),
            )
            .await;
        }

        let summary = get_data(&server, "/api/v1/transactions/summary?from=2024-05-01&to=2024-05-31").await;
        assert_eq!(decimal(&summary["income"]), Decimal::from(3000));
        assert_eq!(decimal(&summary["expense"]), Decimal::from(200));
        assert_eq!(decimal(&summary["net"]), Decimal::from(2800));
        assert_eq!(summary["transaction_count"], 3);

        let listed = get_data(&server, "/api/v1/transactions?from=2024-05-01&to=2024-05-31").await;
        let dates: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-05-20", "2024-05-03", "2024-05-01"]);
    }

    #[tokio::test]
    async fn test_planned_monthly_lifecycle() {
        let server = server().await;
        let start = today();

        let plan = post_created(
            &server,
            "/api/v1/planned",
            json!({
                "name": "Rent",
                "amount": "800",
                "transaction_type": "Expense",
                "start_date": start,
                "recurrence": { "frequency": "Monthly" }
            }),
        )
        .await;
        let plan_id = id_of(&plan);
        assert_eq!(plan["recurrence"]["frequency"], "Monthly");
        assert_eq!(plan["recurrence"]["end_condition"], "Never");

        // 90 day horizon holds three or four monthly dates
        let occurrences = get_data(&server, &format!("/api/v1/planned/{}/occurrences", plan_id)).await;
        let occurrences = occurrences.as_array().unwrap().clone();
        assert!((3..=4).contains(&occurrences.len()), "got {}", occurrences.len());
        assert_eq!(occurrences[0]["occurrence_date"], json!(start));
        assert!(occurrences.iter().all(|o| o["status"] == "Pending"));

        let upcoming = get_data(
            &server,
            &format!("/api/v1/occurrences/upcoming?from={}&to={}", start, start),
        )
        .await;
        assert_eq!(upcoming.as_array().unwrap().len(), 1);
        assert_eq!(upcoming[0]["name"], "Rent");

        let first = id_of(&occurrences[0]);
        let response = server
            .post(&format!("/api/v1/occurrences/{}/execute", first))
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::OK);
        let executed: ApiResponse<Value> = response.json();
        assert_eq!(executed.data["status"], "Executed");
        let transaction_id = executed.data["transaction_id"].as_i64().unwrap();

        let transaction = get_data(&server, &format!("/api/v1/transactions/{}", transaction_id)).await;
        assert_eq!(decimal(&transaction["amount"]), Decimal::from(800));
        assert_eq!(transaction["transaction_type"], "Expense");

        server
            .post(&format!("/api/v1/occurrences/{}/execute", first))
            .json(&json!({}))
            .await
            .assert_status(StatusCode::CONFLICT);

        let second = id_of(&occurrences[1]);
        let response = server.post(&format!("/api/v1/occurrences/{}/skip", second)).await;
        response.assert_status(StatusCode::OK);
        let skipped: ApiResponse<Value> = response.json();
        assert_eq!(skipped.data["status"], "Skipped");

        // Deleting the generated transaction reopens the occurrence
        server
            .delete(&format!("/api/v1/transactions/{}", transaction_id))
            .await
            .assert_status(StatusCode::OK);
        let occurrences = get_data(&server, &format!("/api/v1/planned/{}/occurrences", plan_id)).await;
        assert_eq!(occurrences[0]["status"], "Pending");
        assert!(occurrences[0]["transaction_id"].is_null());
    }

    #[tokio::test]
    async fn test_planned_preview_and_validation() {
        let server = server().await;

        server
            .post("/api/v1/planned")
            .json(&json!({
                "name": "Broken",
                "amount": "10",
                "transaction_type": "Expense",
                "start_date": "2024-01-01",
                "recurrence": { "frequency": "Custom" }
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let plan = post_created(
            &server,
            "/api/v1/planned",
            json!({
                "name": "Gym",
                "amount": "15",
                "transaction_type": "Expense",
                "start_date": "2024-01-31",
                "recurrence": {
                    "frequency": "Monthly",
                    "end_condition": "AfterCount",
                    "occurrence_count": 4
                }
            }),
        )
        .await;

        let preview = get_data(
            &server,
            &format!("/api/v1/planned/{}/preview?from=2024-01-01&to=2024-12-31", id_of(&plan)),
        )
        .await;
        let dates: Vec<&str> = preview
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-01-31", "2024-02-29", "2024-03-31", "2024-04-30"]);
    }

    #[tokio::test]
    async fn test_deactivated_plan_leaves_upcoming() {
        let server = server().await;
        let start = today();
        let end = start.checked_add_days(Days::new(20)).unwrap();

        let plan = post_created(
            &server,
            "/api/v1/planned",
            json!({
                "name": "Coffee",
                "amount": "3.20",
                "transaction_type": "Expense",
                "start_date": start,
                "recurrence": { "frequency": "Weekly" }
            }),
        )
        .await;

        let upcoming = get_data(&server, &format!("/api/v1/occurrences/upcoming?from={}&to={}", start, end)).await;
        assert_eq!(upcoming.as_array().unwrap().len(), 3);

        server
            .post(&format!("/api/v1/planned/{}/deactivate", id_of(&plan)))
            .await
            .assert_status(StatusCode::OK);

        let upcoming = get_data(&server, &format!("/api/v1/occurrences/upcoming?from={}&to={}", start, end)).await;
        assert!(upcoming.as_array().unwrap().is_empty());

        let plans = get_data(&server, "/api/v1/planned?active=true").await;
        assert!(plans.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_loan_lifecycle_with_transfer() {
        let server = server().await;

        let bank = post_created(
            &server,
            "/api/v1/lenders",
            json!({ "name": "First Bank", "lender_type": "Bank" }),
        )
        .await;
        let collector = post_created(
            &server,
            "/api/v1/lenders",
            json!({ "name": "Debt Agency", "lender_type": "Collector" }),
        )
        .await;

        let created = post_created(
            &server,
            "/api/v1/loans",
            json!({
                "lender_id": id_of(&bank),
                "name": "Laptop",
                "loan_type": "Consumer",
                "principal": "1200",
                "annual_rate": "12",
                "term_months": 12,
                "issue_date": today(),
                "payment_scheme": "Annuity"
            }),
        )
        .await;
        let loan_id = id_of(&created["loan"]);
        let payments = created["payments"].as_array().unwrap().clone();
        assert_eq!(payments.len(), 12);
        assert!(payments.iter().all(|p| p["status"] == "Pending"));
        let principal_sum: Decimal = payments.iter().map(|p| decimal(&p["principal_amount"])).sum();
        assert_eq!(principal_sum, Decimal::from(1200));

        let response = server
            .post(&format!("/api/v1/loan-payments/{}/execute", id_of(&payments[0])))
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::OK);
        let executed: ApiResponse<Value> = response.json();
        assert!(executed.data["transaction_id"].as_i64().is_some());

        let loan = get_data(&server, &format!("/api/v1/loans/{}", loan_id)).await;
        let balance = decimal(&loan["remaining_balance"]);
        assert_eq!(balance, Decimal::from(1200) - decimal(&payments[0]["principal_amount"]));

        let response = server
            .post(&format!("/api/v1/loans/{}/transfer", loan_id))
            .json(&json!({
                "to_lender_id": id_of(&collector),
                "transfer_amount": "1300",
                "reason": "sold to collector"
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let transferred: ApiResponse<Value> = response.json();
        assert_eq!(transferred.data["loan"]["lender_id"], id_of(&collector));
        assert_eq!(transferred.data["loan"]["original_lender_id"], id_of(&bank));
        assert_eq!(decimal(&transferred.data["transfer"]["amount_difference"]), Decimal::from(1300) - balance);
        let open = transferred.data["payments"].as_array().unwrap();
        assert_eq!(open.len(), 11);
        assert!(open.iter().all(|p| p["lender_id"] == id_of(&collector)));

        let history = get_data(&server, &format!("/api/v1/loans/{}/transfers", loan_id)).await;
        assert_eq!(history.as_array().unwrap().len(), 1);

        // The bank is still referenced as the original lender
        server
            .delete(&format!("/api/v1/lenders/{}", id_of(&bank)))
            .await
            .assert_status(StatusCode::CONFLICT);

        let summary = get_data(&server, &format!("/api/v1/loans/{}/summary", loan_id)).await;
        assert_eq!(summary["open_payments"], 11);
    }

    #[tokio::test]
    async fn test_schedule_preview() {
        let server = server().await;

        let response = server
            .post("/api/v1/loans/schedule-preview")
            .json(&json!({
                "principal": "600",
                "annual_rate": "0",
                "term_months": 6,
                "issue_date": "2024-01-15",
                "payment_scheme": "Differentiated"
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 6);
        assert_eq!(body.data[0]["date"], "2024-02-15");
        assert!(body.data.iter().all(|row| decimal(&row["total"]) == Decimal::from(100)));
        assert_eq!(decimal(&body.data[5]["balance_after"]), Decimal::ZERO);

        server
            .post("/api/v1/loans/schedule-preview")
            .json(&json!({
                "principal": "600",
                "annual_rate": "5",
                "term_months": 0,
                "issue_date": "2024-01-15",
                "payment_scheme": "Annuity"
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pending_payment_flow() {
        let server = server().await;

        let low = post_created(
            &server,
            "/api/v1/pending",
            json!({ "name": "New tyres", "amount": "400", "priority": "Low" }),
        )
        .await;
        let urgent = post_created(
            &server,
            "/api/v1/pending",
            json!({ "name": "Dentist", "amount": "150", "priority": "Urgent" }),
        )
        .await;

        let listed = get_data(&server, "/api/v1/pending").await;
        assert_eq!(listed[0]["id"], id_of(&urgent));
        assert_eq!(listed[1]["id"], id_of(&low));

        let response = server
            .post(&format!("/api/v1/pending/{}/execute", id_of(&urgent)))
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::OK);
        let executed: ApiResponse<Value> = response.json();
        assert_eq!(executed.data["status"], "Executed");
        assert!(executed.data["transaction_id"].as_i64().is_some());

        server
            .post(&format!("/api/v1/pending/{}/cancel", id_of(&urgent)))
            .await
            .assert_status(StatusCode::CONFLICT);

        // Active entries sort ahead of finished ones
        let listed = get_data(&server, "/api/v1/pending").await;
        assert_eq!(listed[0]["id"], id_of(&low));
    }

    #[tokio::test]
    async fn test_overview_reflects_new_pending_payments() {
        let server = server().await;

        post_created(
            &server,
            "/api/v1/pending",
            json!({ "name": "Gift", "amount": "30" }),
        )
        .await;
        let overview = get_data(&server, "/api/v1/overview").await;
        assert_eq!(decimal(&overview["pending_total"]), Decimal::from(30));
        assert_eq!(overview["today"], json!(today()));

        post_created(
            &server,
            "/api/v1/pending",
            json!({ "name": "Books", "amount": "20" }),
        )
        .await;
        let overview = get_data(&server, "/api/v1/overview").await;
        assert_eq!(decimal(&overview["pending_total"]), Decimal::from(50));
        assert_eq!(overview["pending_payments"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_overview_window_lists_upcoming() {
        let server = server().await;

        post_created(
            &server,
            "/api/v1/planned",
            json!({
                "name": "Streaming",
                "amount": "9.99",
                "transaction_type": "Expense",
                "start_date": today().checked_add_days(Days::new(3)).unwrap()
            }),
        )
        .await;

        let narrow = get_data(&server, "/api/v1/overview?days=1").await;
        assert!(narrow["upcoming"].as_array().unwrap().is_empty());

        let wide = get_data(&server, "/api/v1/overview?days=7").await;
        assert_eq!(wide["upcoming"].as_array().unwrap().len(), 1);
    }
}
