// Integration tests for jmxport-server
// Requests are driven through the router with tower's oneshot; no port is bound.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use jmxport_collector::{
    Attribute, Bean, BeanSet, ObjectIdentity, RawValue, ScrapeError, ScrapeResult, ScrapeSource,
    Scraper, StaticSource,
};
use jmxport_exposition::{parse, ExpositionFormat};
use jmxport_security::{AuthenticationMode, Verifier};
use jmxport_server::{create_router, AppState, ServerConfig};
use std::sync::Arc;
use tower::ServiceExt;

const PROTOBUF_ACCEPT: &str =
    "application/vnd.google.protobuf;proto=io.prometheus.client.MetricFamily;encoding=delimited";

fn threading_source() -> Arc<dyn ScrapeSource> {
    let identity = Arc::new(ObjectIdentity::parse("java.lang:type=Threading").unwrap());
    Arc::new(StaticSource::new(vec![Bean {
        identity,
        attributes: vec![
            Attribute::new("ThreadCount", "Live threads", RawValue::Number(12.0)),
            Attribute::new("Names", "", RawValue::Array(vec![])),
        ],
    }]))
}

fn open_app() -> Router {
    create_router(Arc::new(AppState::new(threading_source(), Scraper::default())))
}

fn secured_app() -> Router {
    let verifier =
        Verifier::configure(AuthenticationMode::Plaintext, "Prometheus", "secret").unwrap();
    let state = AppState::new(threading_source(), Scraper::default())
        .with_authenticator(Arc::new(verifier));
    create_router(Arc::new(state))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_auth(uri: &str, username: &str, password: &str) -> Request<Body> {
    let token = STANDARD.encode(format!("{}:{}", username, password));
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Basic {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_metrics_default_to_prometheus_text() {
    let response = open_app().oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4; charset=utf-8"
    );
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains(
        "# HELP java_lang_Threading_ThreadCount Live threads java.lang:name=null,type=Threading,attribute=ThreadCount\n"
    ));
    assert!(body.contains("# TYPE java_lang_Threading_ThreadCount untyped\n"));
    assert!(body.contains("java_lang_Threading_ThreadCount 12\n"));
    assert!(body.contains("jmx_scrape_error 0\n"));
    assert!(!body.contains("Names"));
}

#[tokio::test]
async fn test_openmetrics_negotiation() {
    let request = Request::builder()
        .uri("/metrics")
        .header(header::ACCEPT, "application/openmetrics-text; version=1.0.0, text/plain;q=0.5")
        .body(Body::empty())
        .unwrap();
    let response = open_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        ExpositionFormat::OpenMetricsText.content_type()
    );
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.ends_with("# EOF\n"));
    assert!(body.contains("# TYPE java_lang_Threading_ThreadCount unknown\n"));
}

#[tokio::test]
async fn test_protobuf_negotiation_round_trips() {
    let request = Request::builder()
        .uri("/metrics")
        .header(header::ACCEPT, PROTOBUF_ACCEPT)
        .body(Body::empty())
        .unwrap();
    let response = open_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        ExpositionFormat::ProtobufDelimited.content_type()
    );
    let samples = parse(&body_bytes(response).await, ExpositionFormat::ProtobufDelimited).unwrap();
    let thread_count = samples
        .iter()
        .find(|s| s.name == "java_lang_Threading_ThreadCount")
        .unwrap();
    assert_eq!(thread_count.value, 12.0);
}

#[tokio::test]
async fn test_healthy() {
    let response = open_app().oneshot(get("/-/healthy")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"Exporter is healthy.\n");
}

#[tokio::test]
async fn test_unknown_route() {
    let response = open_app().oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_credentials_rejected() {
    let response = secured_app().oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"/\""
    );
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_username_is_case_sensitive() {
    let app = secured_app();

    let response = app
        .clone()
        .oneshot(get_with_auth("/metrics", "prometheus", "secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(response).await.is_empty());

    let response = app
        .oneshot(get_with_auth("/metrics", "Prometheus", "secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_authorization_is_401_not_400() {
    for value in ["Basic !!!", "Basic bm8tY29sb24=", "Bearer abc"] {
        let request = Request::builder()
            .uri("/metrics")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let response = secured_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{value}");
    }
}

#[tokio::test]
async fn test_healthy_is_also_gated() {
    let app = secured_app();
    let response = app.clone().oneshot(get("/-/healthy")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_with_auth("/-/healthy", "Prometheus", "secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

struct FailingSource;

impl ScrapeSource for FailingSource {
    fn beans(&self) -> ScrapeResult<BeanSet> {
        Err(ScrapeError::Source("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_scrape_failure_is_500_without_body() {
    let state = AppState::new(Arc::new(FailingSource), Scraper::default());
    let response = create_router(Arc::new(state))
        .oneshot(get("/metrics"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_custom_metrics_path() {
    let state = AppState::new(threading_source(), Scraper::default()).with_metrics_path("/jmx");
    let app = create_router(Arc::new(state));

    let response = app.clone().oneshot(get("/jmx")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_state_from_toml_config() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("beans.json");
    let beans = serde_json::json!({
        "beans": [{
            "name": "io.prometheus.jmx:type=tabularData",
            "attributes": [{
                "name": "Server_1_Disk_Usage_Table",
                "description": "Disk Usage Table",
                "value": {"type": "tabular", "value": {
                    "index_names": ["source"],
                    "rows": [
                        {"type": "composite", "value": {"fields": [
                            {"name": "source", "value": {"type": "text", "value": "/dev/sda1"}},
                            {"name": "size", "value": {"type": "number", "value": 7516192768.0}}
                        ]}}
                    ]
                }}
            }]
        }, {
            "name": "not an object name",
            "attributes": []
        }]
    });
    std::fs::write(&snapshot, beans.to_string()).unwrap();

    let config_path = dir.path().join("jmxport.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
            port = 9999
            metrics_path = "/scrape"
            snapshot = "{}"
            lowercase_output_name = true

            [authentication]
            algorithm = "SHA-256"
            username = "Prometheus"
            password_hash = "{}"
            salt = "salt"
            "#,
            snapshot.display(),
            jmxport_security::generate_digest_hash(
                jmxport_security::HashAlgorithm::Sha256,
                "salt",
                "secret"
            )
        ),
    )
    .unwrap();

    let config = ServerConfig::load(Some(&config_path)).unwrap();
    assert_eq!(config.bind_addr(), "0.0.0.0:9999");
    let state = AppState::from_config(&config).unwrap();
    assert!(state.is_auth_enabled());
    let app = create_router(Arc::new(state));

    let response = app
        .oneshot(get_with_auth("/scrape", "Prometheus", "secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains(
        "io_prometheus_jmx_tabulardata_server_1_disk_usage_table_size{source=\"/dev/sda1\",} 7.516192768e+09\n"
    ));
    // The unparseable bean name marks the scrape as partial
    assert!(body.contains("jmx_scrape_error 1\n"));
}

#[test]
fn test_invalid_authentication_config_is_rejected() {
    let config: ServerConfig = toml::from_str(
        r#"
        [authentication]
        algorithm = "PBKDF2WithHmacSHA256"
        username = "Prometheus"
        password_hash = "abcd"
        salt = "salt"
        key_length = 100
        "#,
    )
    .unwrap();
    assert!(AppState::from_config(&config).is_err());
}

#[tokio::test]
async fn test_object_name_filters_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("beans.json");
    let number = |v: f64| serde_json::json!({"type": "number", "value": v});
    let beans = serde_json::json!({
        "beans": [{
            "name": "java.lang:type=Runtime",
            "attributes": [
                {"name": "Uptime", "value": number(42.0)},
                {"name": "StartTime", "value": number(1.0)}
            ]
        }, {
            "name": "java.lang:type=Compilation",
            "attributes": [{"name": "TotalCompilationTime", "value": number(9.0)}]
        }, {
            "name": "com.example:type=Cache",
            "attributes": [{"name": "Size", "value": number(3.0)}]
        }]
    });
    std::fs::write(&snapshot, beans.to_string()).unwrap();

    let config: ServerConfig = toml::from_str(&format!(
        r#"
        snapshot = "{}"
        includeObjectNames = ["java.lang:*"]
        excludeObjectNames = ["java.lang:type=Compilation"]

        [exclude_object_name_attributes]
        "java.lang:type=Runtime" = ["StartTime"]
        "#,
        snapshot.display()
    ))
    .unwrap();
    let app = create_router(Arc::new(AppState::from_config(&config).unwrap()));

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("java_lang_Runtime_Uptime 42\n"));
    assert!(!body.contains("StartTime"));
    assert!(!body.contains("TotalCompilationTime"));
    assert!(!body.contains("com_example"));
}

#[test]
fn test_invalid_object_name_pattern_is_rejected() {
    let config = ServerConfig {
        include_object_names: vec!["java.lang".to_string()],
        ..Default::default()
    };
    assert!(AppState::from_config(&config).is_err());
}
