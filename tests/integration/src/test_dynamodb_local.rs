//! Tests against a running DynamoDB Local (or any compatible emulator).

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dynawire_auth::{Credentials, SigV4Signer};
    use dynawire_http::{Dispatcher, DispatcherConfig};
    use dynawire_model::{ErrorClassifier, ErrorKind, Operation};

    fn local_dispatcher() -> Dispatcher {
        crate::init_tracing();
        let endpoint =
            std::env::var("DYNAMODB_ENDPOINT").unwrap_or_else(|_| "http://localhost:8000".to_owned());
        let signer = SigV4Signer::new(Credentials::new("test", "test"), "us-east-1").unwrap();
        Dispatcher::new(
            DispatcherConfig::builder()
                .endpoint(endpoint)
                .signer(Arc::new(signer))
                .error_builder(Arc::new(ErrorClassifier::dynamodb()))
                .transport(crate::direct_transport())
                .build(),
        )
        .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB Local"]
    async fn test_should_list_tables() {
        let dispatcher = local_dispatcher();
        let body = dispatcher
            .send_operation(Operation::ListTables, "{}")
            .await
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&body.collect_bytes().await.unwrap()).unwrap();
        assert!(value["TableNames"].is_array());
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB Local"]
    async fn test_should_report_missing_table_as_not_found() {
        let dispatcher = local_dispatcher();
        let err = dispatcher
            .send(
                "DescribeTable",
                r#"{"TableName":"dynawire-table-that-does-not-exist"}"#,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    #[ignore = "requires running DynamoDB Local"]
    async fn test_should_report_bad_input_as_invalid_parameter() {
        let dispatcher = local_dispatcher();
        let err = dispatcher
            .send("GetItem", r#"{"TableName":""}"#)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidParameter));
    }
}
