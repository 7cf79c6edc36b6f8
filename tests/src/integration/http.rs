//! # Gateway End to End
//!
//! The claims gateway built from a `RuntimeConfig` through the runtime
//! container, so the token table, store selection and post-commit relay
//! are the ones the binary would use.

#[cfg(test)]
mod tests {
    use crate::fixtures::seed_visit;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use ledger_runtime::{LedgerContainer, RuntimeConfig};
    use pl_01_settlement_ledger::{TokenGrant, VisitStatus};
    use pl_02_claims_gateway::{serve_on, ClaimsGateway};
    use serde_json::{json, Value};
    use shared_types::{VisitId, WorkerId};
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;
    use tower::ServiceExt;

    struct Stack {
        container: LedgerContainer,
        router: Router,
    }

    fn stack() -> Stack {
        let config = RuntimeConfig::parse(
            r#"
            [ledger]
            max_commit_attempts = 3

            [gateway.timeouts]
            request = "5s"

            [[gateway.tokens]]
            token = "tok-w1"
            worker_id = "w1"
            display_name = "Sam Worker"

            [[gateway.tokens]]
            token = "tok-w9"
            worker_id = "w9"
            display_name = "Former Worker"
            authorized = false
            "#,
        )
        .unwrap();
        config.validate().unwrap();

        let container = LedgerContainer::new(&config).unwrap();
        let gateway =
            ClaimsGateway::new(config.gateway.clone(), container.service.clone()).unwrap();
        let router = gateway.router();
        Stack { container, router }
    }

    impl Stack {
        fn seed(&self, id: &str, worker: &str, member: &str) {
            seed_visit(
                &self.container.repository,
                id,
                worker,
                "F1",
                member,
                "2025-01-10",
                json!({ "facilityReviewFlag": true }),
            );
        }

        async fn submit(&self, token: &str, ids: &[&str]) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(Method::POST)
                .uri("/v1/claims/submit")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(submission(ids).to_string()))
                .unwrap();
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, serde_json::from_slice(&bytes).unwrap())
        }
    }

    fn submission(ids: &[&str]) -> Value {
        json!({
            "facilityId": "F1",
            "claimDay": "2025-01-10",
            "selectedVisitIds": ids,
            "staffName": "Jo Staff",
            "staffTitle": "Administrator",
            "signature": "Jo Staff",
            "signedAt": "2025-01-10T15:30:00Z",
            "geolocation": { "latitude": 37.77, "longitude": -122.42, "accuracy": 12.0 },
        })
    }

    #[tokio::test]
    async fn test_submission_through_runtime_wiring() {
        let stack = stack();
        stack.seed("v-a", "w1", "A");
        stack.seed("v-b", "w1", "B");

        let (status, receipt) = stack.submit("tok-w1", &["v-a", "v-b", "v-a"]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(receipt["totalVisits"], 2);
        assert_eq!(receipt["totalAmount"], 110);
        assert_eq!(receipt["locationVerified"], true);
        assert_eq!(receipt["geolocation"]["accuracy"], 12.0);

        let visit = stack
            .container
            .repository
            .visit(&VisitId::new("v-a"))
            .unwrap()
            .unwrap();
        assert_eq!(visit.status, VisitStatus::SignedOff);
        assert_eq!(visit.flag_reasons, vec!["facility_review".to_string()]);

        let (status, json) = stack.submit("tok-w1", &["v-a", "v-b"]).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "ClaimAlreadyExists");
        assert_eq!(json["existingStatus"], "submitted");
    }

    #[tokio::test]
    async fn test_configured_suspension_is_403() {
        let stack = stack();
        stack.seed("v-x", "w9", "A");
        let (status, json) = stack.submit("tok-w9", &["v-x"]).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["success"], false);
        assert!(stack.container.repository.claims().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_token_is_401() {
        let stack = stack();
        stack.seed("v-a", "w1", "A");
        let (status, json) = stack.submit("tok-stolen", &["v-a"]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_imported_drafts_settle_through_runtime() {
        let mut drafts = tempfile::NamedTempFile::new().unwrap();
        let visits = json!([
            {
                "id": "v-imp-1",
                "workerId": "w1",
                "facilityId": "F1",
                "facilityName": "Sunrise Manor",
                "memberId": "A",
                "memberName": "Member A",
                "claimDay": "2025-01-10",
                "rawPayload": { "concerns": [{ "severity": "critical" }] }
            },
            {
                "id": "v-imp-2",
                "workerId": "w1",
                "facilityId": "F1",
                "facilityName": "Sunrise Manor",
                "memberId": "B",
                "memberName": "Member B",
                "claimDay": "2025-01-10"
            }
        ]);
        drafts.write_all(visits.to_string().as_bytes()).unwrap();

        let mut config = RuntimeConfig::parse(
            r#"
            [[gateway.tokens]]
            token = "tok-w1"
            worker_id = "w1"
            display_name = "Sam Worker"
            "#,
        )
        .unwrap();
        config
            .apply_overrides(|key| {
                (key == "PL_VISIT_IMPORT").then(|| drafts.path().display().to_string())
            })
            .unwrap();
        config.validate().unwrap();

        let container = LedgerContainer::new(&config).unwrap();
        let router = ClaimsGateway::new(config.gateway.clone(), container.service.clone())
            .unwrap()
            .router();
        let stack = Stack { container, router };

        let (status, receipt) = stack.submit("tok-w1", &["v-imp-1", "v-imp-2"]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(receipt["totalAmount"], 110);

        let visit = stack
            .container
            .repository
            .visit(&VisitId::new("v-imp-1"))
            .unwrap()
            .unwrap();
        assert_eq!(visit.status, VisitStatus::SignedOff);
        assert_eq!(visit.flag_reasons, vec!["critical_concern".to_string()]);

        // A restart over the same store re-reads the import without undoing
        // the sign-off.
        let summary =
            ledger_runtime::import_draft_visits(&stack.container.repository, drafts.path())
                .unwrap();
        assert_eq!(summary.skipped, 2);
        let (status, json) = stack.submit("tok-w1", &["v-imp-1", "v-imp-2"]).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "ClaimAlreadyExists");
    }

    #[test]
    fn test_runtime_token_table_reaches_gateway() {
        let mut config = RuntimeConfig::default();
        config.gateway.tokens = vec![TokenGrant {
            token: "tok-w1".to_string(),
            worker_id: WorkerId::new("w1"),
            display_name: "Sam Worker".to_string(),
            authorized: true,
        }];
        let container = LedgerContainer::new(&config).unwrap();
        assert!(ClaimsGateway::new(config.gateway.clone(), container.service.clone()).is_ok());
    }

    /// One request over a real socket. `Connection: close` makes the server
    /// end the stream after the response.
    async fn raw_request(addr: std::net::SocketAddr, request: String) -> (u16, Value) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let text = String::from_utf8(raw).unwrap();

        let status = text
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse().ok())
            .unwrap();
        let body = match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) => serde_json::from_str(&text[start..=end]).unwrap(),
            _ => Value::Null,
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_serves_over_tcp_and_drains_on_shutdown() {
        let stack = stack();
        stack.seed("v-a", "w1", "A");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_on(listener, stack.router.clone(), async move {
            let _ = stop_rx.await;
        }));

        let (status, health) = raw_request(
            addr,
            "GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".to_string(),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(health["status"], "ok");

        let body = submission(&["v-a"]).to_string();
        let request = format!(
            "POST /v1/claims/submit HTTP/1.1\r\n\
             Host: localhost\r\n\
             Authorization: Bearer tok-w1\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let (status, receipt) = raw_request(addr, request).await;
        assert_eq!(status, 200);
        assert_eq!(receipt["totalAmount"], 65);

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
        assert!(TcpStream::connect(addr).await.is_err());
    }
}
