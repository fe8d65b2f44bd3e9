// defect-client/tests/client.rs

use defect_client::http::{error_for_status, parse_body};
use defect_client::{ClientConfig, ClientError, FeatureCollectionDto, HttpClient};
use reqwest::StatusCode;
use shared::error::{AppError, ErrorCode};

#[tokio::test]
async fn test_client_creation() {
    let config = ClientConfig::new("http://localhost:8080/")
        .with_token("secret")
        .with_timeout(5);
    let client = HttpClient::new(&config).unwrap();

    assert_eq!(client.base_url(), "http://localhost:8080");
    assert_eq!(client.token(), Some("secret"));
    assert_eq!(
        client.endpoint(&["api", "capture-points"]).unwrap().as_str(),
        "http://localhost:8080/api/capture-points"
    );
}

#[tokio::test]
async fn test_endpoint_encodes_segments() {
    let client = HttpClient::new(&ClientConfig::new("http://localhost:8080")).unwrap();
    let url = client
        .endpoint(&["api", "capture-points", "cp 01/../admin?x=1#top"])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "http://localhost:8080/api/capture-points/cp%2001%2F..%2Fadmin%3Fx=1%23top"
    );
    assert_eq!(url.path_segments().unwrap().count(), 3);
    assert!(url.query().is_none());
}

#[tokio::test]
async fn test_endpoint_keeps_base_path() {
    let client = HttpClient::new(&ClientConfig::new("https://defects.example.com/backend/")).unwrap();
    let url = client.endpoint(&["api", "damages", "status", "42"]).unwrap();
    assert_eq!(url.as_str(), "https://defects.example.com/backend/api/damages/status/42");
}

#[tokio::test]
async fn test_endpoint_rejects_bad_base() {
    let client = HttpClient::new(&ClientConfig::new("not a url")).unwrap();
    let err = client.endpoint(&["api"]).unwrap_err();
    assert!(matches!(err, ClientError::InvalidUrl(_)));

    let app: AppError = err.into();
    assert_eq!(app.code, ErrorCode::ConfigError);
}

#[test]
fn test_no_content_is_empty() {
    let parsed: Option<FeatureCollectionDto> = parse_body(StatusCode::NO_CONTENT, "").unwrap();
    assert!(parsed.is_none());

    let parsed: Option<FeatureCollectionDto> = parse_body(StatusCode::OK, "  ").unwrap();
    assert!(parsed.is_none());
}

#[test]
fn test_ok_body_is_decoded() {
    let parsed: Option<FeatureCollectionDto> =
        parse_body(StatusCode::OK, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
    assert_eq!(parsed.unwrap().kind, "FeatureCollection");

    let err = parse_body::<FeatureCollectionDto>(StatusCode::OK, "{").unwrap_err();
    assert!(matches!(err, ClientError::Serialization(_)));
}

#[test]
fn test_error_body_wins_over_status() {
    let err = error_for_status(
        StatusCode::BAD_REQUEST,
        r#"{"errors":[{"field":"status","defaultMessage":"invalid"}]}"#,
    );
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "status: invalid");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_status_mapping() {
    assert!(matches!(
        error_for_status(StatusCode::UNAUTHORIZED, ""),
        ClientError::Unauthorized
    ));
    assert!(matches!(
        error_for_status(StatusCode::NOT_FOUND, "missing"),
        ClientError::NotFound(_)
    ));
    assert!(matches!(
        error_for_status(StatusCode::BAD_GATEWAY, "upstream"),
        ClientError::Internal(_)
    ));
}

#[test]
fn test_into_app_error() {
    let app: AppError = ClientError::NotFound("cp-9".to_string()).into();
    assert_eq!(app.code, ErrorCode::NotFound);

    let app: AppError = ClientError::Api {
        status: 400,
        message: "bad".to_string(),
    }
    .into();
    assert_eq!(app.code, ErrorCode::InvalidRequest);
    assert_eq!(app.detail("status"), Some(&serde_json::Value::from(400)));

    let app: AppError = ClientError::InvalidResponse("x".to_string()).into();
    assert_eq!(app.code, ErrorCode::InvalidResponse);
}
