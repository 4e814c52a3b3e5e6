//! Tests for HTTP request/response values and transport errors.

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

fn test_url() -> url::Url {
    url::Url::parse("https://example.com/api").unwrap()
}

mod http_request {
    use super::*;

    #[test]
    fn new_creates_request_with_method_and_url() {
        let req = HttpRequest::new(http::Method::PUT, test_url());

        assert_eq!(req.method, http::Method::PUT);
        assert_eq!(req.url, test_url());
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn get_and_post_set_method() {
        assert_eq!(HttpRequest::get(test_url()).method, http::Method::GET);
        assert_eq!(HttpRequest::post(test_url()).method, http::Method::POST);
    }

    #[test]
    fn with_body_sets_body() {
        let req = HttpRequest::post(test_url()).with_body(b"payload".to_vec());
        assert_eq!(req.body, Some(b"payload".to_vec()));
    }

    #[test]
    fn with_json_serializes_body_and_sets_content_type() {
        let req = HttpRequest::post(test_url())
            .with_json(&serde_json::json!({ "prompt": "hello" }))
            .unwrap();

        assert_eq!(
            req.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: serde_json::Value = serde_json::from_slice(req.body.as_ref().unwrap()).unwrap();
        assert_eq!(body["prompt"], "hello");
    }

    #[test]
    fn with_json_replaces_existing_content_type() {
        let req = HttpRequest::post(test_url())
            .with_header(
                http::header::CONTENT_TYPE,
                http::HeaderValue::from_static("text/plain"),
            )
            .with_json(&[1, 2, 3])
            .unwrap();

        assert_eq!(
            req.headers.get_all(http::header::CONTENT_TYPE).iter().count(),
            1
        );
        assert_eq!(
            req.headers.get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn with_header_appends_multiple_values_for_same_name() {
        let req = HttpRequest::get(test_url())
            .with_header(
                http::header::ACCEPT,
                http::HeaderValue::from_static("text/html"),
            )
            .with_header(
                http::header::ACCEPT,
                http::HeaderValue::from_static("application/json"),
            );

        assert_eq!(req.headers.get_all(http::header::ACCEPT).iter().count(), 2);
    }

    #[test]
    fn clones_compare_equal() {
        let req = HttpRequest::post(test_url()).with_body(b"x".to_vec());
        assert_eq!(req.clone(), req);
    }
}

mod http_response {
    use super::*;

    #[test]
    fn with_status_has_empty_parts() {
        let resp = HttpResponse::with_status(http::StatusCode::ACCEPTED);

        assert_eq!(resp.status, http::StatusCode::ACCEPTED);
        assert!(resp.headers.is_empty());
        assert!(resp.body.is_empty());
    }

    #[test]
    fn is_success_only_for_2xx() {
        assert!(HttpResponse::with_status(http::StatusCode::OK).is_success());
        assert!(HttpResponse::with_status(http::StatusCode::NO_CONTENT).is_success());
        assert!(!HttpResponse::with_status(http::StatusCode::UNAUTHORIZED).is_success());
        assert!(!HttpResponse::with_status(http::StatusCode::BAD_GATEWAY).is_success());
    }

    #[test]
    fn body_text_handles_valid_and_invalid_utf8() {
        let ok = HttpResponse::new(http::StatusCode::OK, http::HeaderMap::new(), b"hi".to_vec());
        let bad = HttpResponse::new(http::StatusCode::OK, http::HeaderMap::new(), vec![0xFF]);

        assert_eq!(ok.body_text(), Some("hi"));
        assert!(bad.body_text().is_none());
    }

    #[test]
    fn json_decodes_body() {
        let resp = HttpResponse::new(
            http::StatusCode::OK,
            http::HeaderMap::new(),
            br#"{"reply":"breathe"}"#.to_vec(),
        );

        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["reply"], "breathe");
    }

    #[test]
    fn json_reports_malformed_body() {
        let resp = HttpResponse::new(
            http::StatusCode::OK,
            http::HeaderMap::new(),
            b"not json".to_vec(),
        );

        assert!(resp.json::<serde_json::Value>().is_err());
    }
}

mod http_error {
    use super::*;
    use std::error::Error;

    #[test]
    fn connection_error_preserves_source() {
        let error = HttpError::Connection(Box::new(std::io::Error::other("network unavailable")));

        assert!(error.to_string().contains("Connection error"));
        assert!(
            error
                .source()
                .unwrap()
                .to_string()
                .contains("network unavailable")
        );
    }

    #[test]
    fn timeout_displays_message() {
        assert_eq!(HttpError::Timeout.to_string(), "Request timed out");
    }

    #[test]
    fn mentions_unauthorized_checks_own_message() {
        let error = HttpError::InvalidUrl("status 401 from gateway".to_string());
        assert!(error.mentions_unauthorized());
    }

    #[test]
    fn mentions_unauthorized_checks_source_chain() {
        let inner = std::io::Error::other("upstream said 401");
        let error = HttpError::Connection(Box::new(inner));

        assert!(error.mentions_unauthorized());
    }

    #[test]
    fn ordinary_errors_do_not_mention_unauthorized() {
        assert!(!HttpError::Timeout.mentions_unauthorized());
        assert!(
            !HttpError::Connection(Box::new(std::io::Error::other("refused")))
                .mentions_unauthorized()
        );
    }
}

mod http_client_trait {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedClient {
        response: HttpResponse,
        calls: AtomicUsize,
    }

    impl HttpClient for CannedClient {
        async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn canned_client_returns_configured_response() {
        let client = CannedClient {
            response: HttpResponse::with_status(http::StatusCode::CREATED),
            calls: AtomicUsize::new(0),
        };

        let result = client.request(HttpRequest::get(test_url())).await.unwrap();

        assert_eq!(result.status, http::StatusCode::CREATED);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }
}
