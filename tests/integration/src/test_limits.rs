//! Response size cap and transport failures.

#[cfg(test)]
mod tests {
    use crate::{MockServer, anonymous_dispatcher, json_response};

    #[tokio::test]
    async fn test_should_truncate_success_body_at_cap() {
        let payload = "x".repeat(64 * 1024);
        let server = MockServer::start(move |_| json_response(200, payload.clone())).await;
        let dispatcher = anonymous_dispatcher(&server.endpoint(), 1000);

        let body = dispatcher.send("Scan", "{}").await.unwrap();
        let data = body.collect_bytes().await.unwrap();
        assert_eq!(data.len(), 1000);
        assert!(data.iter().all(|b| *b == b'x'));
    }

    #[tokio::test]
    async fn test_should_not_cap_error_bodies() {
        let message = "m".repeat(4096);
        let body = crate::error_body("ValidationException", &message);
        let server = MockServer::start(move |_| json_response(400, body.clone())).await;
        let dispatcher = anonymous_dispatcher(&server.endpoint(), 16);

        let err = dispatcher.send("PutItem", "{}").await.unwrap_err();
        let service = err.service_error().unwrap();
        assert_eq!(service.kind, dynawire_model::ErrorKind::InvalidParameter);
        assert_eq!(service.message, message);
    }

    #[tokio::test]
    async fn test_should_surface_connection_refused_as_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let dispatcher = anonymous_dispatcher(&endpoint, 1024);
        let err = dispatcher.send("ListTables", "{}").await.unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {err:?}");
        assert!(err.service_error().is_none());

        let dynawire_http::DispatchError::Transport(inner) = err else {
            unreachable!();
        };
        assert!(inner.downcast_ref::<reqwest::Error>().is_some());
    }
}
