#[cfg(test)]
mod tests {
    use crate::schemas::ApiDoc;
    use utoipa::openapi::PathItemType;
    use utoipa::OpenApi;

    #[test]
    fn test_openapi_schema_generation() {
        let openapi = ApiDoc::openapi();

        let components = openapi.components.as_ref().unwrap();
        assert!(components.schemas.contains_key("ErrorResponse"));
        assert!(components.schemas.contains_key("HealthResponse"));
        assert!(components.schemas.contains_key("OverviewDto"));
        assert!(components.schemas.contains_key("TransferLoanRequest"));

        assert!(serde_json::to_string(&openapi).is_ok());
    }

    #[test]
    fn test_error_response_schema_structure() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().unwrap();
        let error_response_schema = components.schemas.get("ErrorResponse").unwrap();

        if let utoipa::openapi::RefOr::T(utoipa::openapi::schema::Schema::Object(obj)) = error_response_schema {
            let properties = &obj.properties;
            assert!(properties.contains_key("error"));
            assert!(properties.contains_key("code"));
            assert!(properties.contains_key("success"));
        } else {
            panic!("ErrorResponse should be an object schema");
        }
    }

    #[test]
    fn test_documented_operations() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        for (path, method) in [
            ("/health", PathItemType::Get),
            ("/api/v1/categories", PathItemType::Post),
            ("/api/v1/transactions/summary", PathItemType::Get),
            ("/api/v1/planned/{plan_id}/preview", PathItemType::Get),
            ("/api/v1/occurrences/{occurrence_id}/execute", PathItemType::Post),
            ("/api/v1/loans/{loan_id}/early-repayment", PathItemType::Post),
            ("/api/v1/loans/{loan_id}/transfer", PathItemType::Post),
            ("/api/v1/loan-payments/{payment_id}/execute", PathItemType::Post),
            ("/api/v1/pending/{pending_id}/cancel", PathItemType::Post),
            ("/api/v1/overview", PathItemType::Get),
        ] {
            let item = paths
                .get(path)
                .unwrap_or_else(|| panic!("{} is not documented", path));
            assert!(item.operations.contains_key(&method), "{} lacks {}", path, serde_json::to_string(&method).unwrap_or_default());
        }
    }

    #[test]
    fn test_error_responses_reference_named_schema() {
        let openapi = ApiDoc::openapi();
        let openapi_json = serde_json::to_string(&openapi).unwrap();

        assert!(!openapi_json.contains("crate.schemas.ErrorResponse"));
        assert!(!openapi_json.contains("crate::schemas::ErrorResponse"));
        assert!(openapi_json.contains("#/components/schemas/ErrorResponse"));
    }
}
