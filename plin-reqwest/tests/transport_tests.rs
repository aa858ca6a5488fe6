//! Integration tests for ReqwestTransport using wiremock.

use http::{Method, StatusCode};
use plin::{
    CacheController, CacheStatus, ControllerConfig, Destination, FetchRequest, PrecacheError,
    Route, Transport, TransportError,
};
use plin_moka::MokaBackend;
use plin_reqwest::ReqwestTransport;
use url::Url;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn url(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), path)).unwrap()
}

#[tokio::test]
async fn returns_status_headers_and_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/css/style.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("body{}")
                .insert_header("content-type", "text/css"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::default();
    let response = transport
        .fetch(FetchRequest::get(
            url(&mock_server, "/css/style.css"),
            Destination::Style,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/css");
    assert_eq!(response.body().as_ref(), b"body{}");
    assert_eq!(response.url(), &url(&mock_server, "/css/style.css"));
}

#[tokio::test]
async fn error_status_is_a_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&mock_server)
        .await;

    let response = ReqwestTransport::default()
        .fetch(FetchRequest::get(
            url(&mock_server, "/gone"),
            Destination::Document,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.body().as_ref(), b"not here");
}

#[tokio::test]
async fn redirect_reports_final_url() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/new"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&mock_server)
        .await;

    let response = ReqwestTransport::default()
        .fetch(FetchRequest::get(
            url(&mock_server, "/old"),
            Destination::Document,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/new");
}

#[tokio::test]
async fn forwards_method_headers_and_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/trips"))
        .and(header("x-trip", "lisbon"))
        .and(body_string(r#"{"days":4}"#))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut headers = http::HeaderMap::new();
    headers.insert("x-trip", http::HeaderValue::from_static("lisbon"));
    let request = FetchRequest::new(
        Method::POST,
        url(&mock_server, "/api/trips"),
        Destination::Empty,
    )
    .with_headers(headers)
    .with_body(r#"{"days":4}"#);

    let response = ReqwestTransport::default().fetch(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn refused_connection_is_unreachable() {
    let request = FetchRequest::get(
        Url::parse("http://127.0.0.1:1/").unwrap(),
        Destination::Document,
    );

    let err = ReqwestTransport::default().fetch(request).await.unwrap_err();

    assert!(matches!(err, TransportError::Unreachable(_)));
}

fn config_for(server: &MockServer, precache: &[&str]) -> ControllerConfig {
    ControllerConfig::builder()
        .generation("plin", "1.1.0")
        .scope(format!("{}/", server.uri()))
        .precache(precache.iter().copied())
        .network_first([r"^http://127\.0\.0\.1:\d+/api/"])
        .build()
        .unwrap()
}

#[tokio::test]
async fn install_precaches_through_the_network() {
    let mock_server = MockServer::start().await;
    for asset in ["/", "/js/app.js"] {
        Mock::given(method("GET"))
            .and(path(asset))
            .respond_with(ResponseTemplate::new(200).set_body_string("asset"))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let controller = CacheController::new(
        config_for(&mock_server, &["/", "/js/app.js", "/js/missing.js"]),
        MokaBackend::builder().max_entries(100).build(),
        ReqwestTransport::default(),
    );

    let report = controller.install().await.unwrap();

    assert_eq!(report.stored.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(
        report.failed[0].error,
        PrecacheError::Status(StatusCode::NOT_FOUND)
    ));

    let lifetime = controller.lifetime();
    let served = controller
        .fetch(
            FetchRequest::get(url(&mock_server, "/js/app.js"), Destination::Script),
            &lifetime,
        )
        .await
        .unwrap();
    assert_eq!(served.route, Route::CacheFirst);
    assert_eq!(served.status, CacheStatus::Hit);
}

#[tokio::test]
async fn network_first_falls_back_when_server_goes_away() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"max":24.5}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let forecast = url(&mock_server, "/api/forecast");
    let controller = CacheController::new(
        config_for(&mock_server, &[]),
        MokaBackend::builder().max_entries(100).build(),
        ReqwestTransport::default(),
    );

    let lifetime = controller.lifetime();
    let live = controller
        .fetch(
            FetchRequest::get(forecast.clone(), Destination::Empty),
            &lifetime,
        )
        .await
        .unwrap();
    lifetime.settled().await;
    assert_eq!(live.route, Route::NetworkFirst);
    assert_eq!(live.status, CacheStatus::Network);

    drop(mock_server);

    let lifetime = controller.lifetime();
    let offline = controller
        .fetch(FetchRequest::get(forecast, Destination::Empty), &lifetime)
        .await
        .unwrap();
    assert_eq!(offline.status, CacheStatus::Fallback);
    assert_eq!(offline.response.body().as_ref(), br#"{"max":24.5}"#);
}
