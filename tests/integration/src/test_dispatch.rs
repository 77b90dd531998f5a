//! Round-trip tests for the request side of the dispatcher.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDateTime;
    use dynawire_model::Operation;
    use parking_lot::Mutex;

    use crate::{
        MockServer, RecordedRequest, TEST_ACCESS_KEY, json_response, signed_dispatcher,
        test_signer,
    };

    #[tokio::test]
    async fn test_should_send_awsjson_request_and_return_body() {
        let server = MockServer::start(|_| json_response(200, r#"{"TableNames":["orders"]}"#)).await;
        let dispatcher = signed_dispatcher(&server.endpoint());

        let body = dispatcher.send("ListTables", r#"{"Limit":10}"#).await.unwrap();
        let data = body.collect_bytes().await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&data).unwrap();
        assert_eq!(value["TableNames"][0], "orders");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method, http::Method::POST);
        assert_eq!(req.uri.path(), "/");
        assert_eq!(req.header("x-amz-target"), Some("DynamoDB_20120810.ListTables"));
        assert_eq!(req.header("content-type"), Some("application/x-amz-json-1.0"));
        assert_eq!(req.header("host"), Some(server.authority().as_str()));
        assert_eq!(req.body.as_ref(), br#"{"Limit":10}"#);
    }

    #[tokio::test]
    async fn test_should_sign_with_sigv4() {
        let server = MockServer::start(|_| json_response(200, "{}")).await;
        let dispatcher = signed_dispatcher(&server.endpoint());
        dispatcher.send("DescribeLimits", "{}").await.unwrap();

        let req = server.requests().remove(0);
        let authorization = req.header("authorization").unwrap();
        assert!(authorization.starts_with(&format!(
            "AWS4-HMAC-SHA256 Credential={TEST_ACCESS_KEY}/"
        )));
        assert!(authorization.contains("/us-east-1/dynamodb/aws4_request"));
        assert!(authorization.contains("SignedHeaders=content-type;host;x-amz-date;x-amz-target,"));
        assert!(req.header("x-amz-date").is_some());
    }

    #[tokio::test]
    async fn test_should_produce_signature_verifiable_by_the_server() {
        let server = MockServer::start(|_| json_response(200, "{}")).await;
        let dispatcher = signed_dispatcher(&server.endpoint());
        dispatcher
            .send("PutItem", r#"{"TableName":"t","Item":{"pk":{"S":"a"}}}"#)
            .await
            .unwrap();

        let req = server.requests().remove(0);
        let received = req.header("authorization").unwrap().to_owned();
        let timestamp =
            NaiveDateTime::parse_from_str(req.header("x-amz-date").unwrap(), "%Y%m%dT%H%M%SZ")
                .unwrap()
                .and_utc();

        let (mut parts, ()) = rebuild(&req).into_parts();
        test_signer().sign_at(&mut parts, &req.body, timestamp);
        assert_eq!(parts.headers.get("authorization").unwrap(), received.as_str());
    }

    #[tokio::test]
    async fn test_should_send_streams_operation_unprefixed() {
        let server = MockServer::start(|_| json_response(200, r#"{"Records":[]}"#)).await;
        let dispatcher = signed_dispatcher(&server.endpoint());

        dispatcher
            .send_operation(Operation::GetRecords, r#"{"ShardIterator":"abc"}"#)
            .await
            .unwrap();
        dispatcher
            .send("DynamoDB_20120810.GetItem", "{}")
            .await
            .unwrap();

        let targets: Vec<String> = server
            .requests()
            .iter()
            .filter_map(|req| req.header("x-amz-target").map(str::to_owned))
            .collect();
        assert_eq!(
            targets,
            vec![
                "DynamoDBStreams_20120810.GetRecords".to_owned(),
                "DynamoDB_20120810.GetItem".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn test_should_serve_concurrent_callers_from_one_dispatcher() {
        let server = MockServer::start(|req| json_response(200, req.body.clone())).await;
        let dispatcher = Arc::new(signed_dispatcher(&server.endpoint()));

        let calls = (0..16).map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                let body = format!(r#"{{"Id":{i}}}"#);
                let response = dispatcher.send("GetItem", body.clone()).await.unwrap();
                let echoed = response.collect_bytes().await.unwrap();
                assert_eq!(echoed.as_ref(), body.as_bytes());
            })
        });
        for call in futures::future::join_all(calls).await {
            call.unwrap();
        }
        assert_eq!(server.requests().len(), 16);
    }

    #[tokio::test]
    async fn test_should_log_wire_traffic_to_custom_sink() {
        let server = MockServer::start(|_| json_response(200, r#"{"Count":0}"#)).await;
        let logged: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&logged);

        let mut config = crate::config_for(
            &server.endpoint(),
            Arc::new(test_signer()),
            dynawire_http::DEFAULT_MAX_RESPONSE_SIZE,
        );
        config.debug = dynawire_http::DebugOptions::all(Arc::new(move |message: &str| {
            sink.lock().push(message.to_owned());
        }));
        let dispatcher = dynawire_http::Dispatcher::new(config).unwrap();

        let body = dispatcher.send("Scan", r#"{"TableName":"t"}"#).await.unwrap();
        assert_eq!(body.collect_bytes().await.unwrap().as_ref(), br#"{"Count":0}"#);

        let logged = logged.lock();
        assert_eq!(logged.len(), 2);
        assert!(logged[0].contains("x-amz-target: DynamoDB_20120810.Scan"));
        assert!(logged[0].contains("authorization: <redacted>"));
        assert!(logged[1].contains("Body: {\"Count\":0}"));
    }

    fn rebuild(req: &RecordedRequest) -> http::Request<()> {
        let mut builder = http::Request::builder()
            .method(req.method.clone())
            .uri(req.uri.clone());
        for (name, value) in &req.headers {
            if name != http::header::AUTHORIZATION {
                builder = builder.header(name, value);
            }
        }
        builder.body(()).unwrap()
    }
}
