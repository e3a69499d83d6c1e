//! Integration tests for the hyper transport against a mock backend.

use std::time::Duration;

use assert2::{check, let_assert};
use inklink::{
    ClientConfig, Error, ErrorKind, Form, HyperTransport, Method, NETWORK_ERROR_MESSAGE, Payload,
    RequestConfig, Transport,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

fn transport(server: &MockServer) -> HyperTransport {
    HyperTransport::new(&ClientConfig::builder().base_url(server.uri()).build())
}

#[tokio::test]
async fn json_response_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stories/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "title": "Dawn"})))
        .expect(1)
        .mount(&server)
        .await;

    let payload = transport(&server)
        .send(RequestConfig::get("/stories/7"))
        .await
        .expect("payload");

    check!(payload == Payload::Json(json!({"id": 7, "title": "Dawn"})));
}

#[tokio::test]
async fn non_json_response_is_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("UP"))
        .mount(&server)
        .await;

    let payload = transport(&server)
        .send(RequestConfig::get("/health"))
        .await
        .expect("payload");

    check!(payload == Payload::Text("UP".to_string()));
}

#[tokio::test]
async fn no_content_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/comments/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let config = RequestConfig::builder("/comments/3")
        .method(Method::Delete)
        .build();
    let payload = transport(&server).send(config).await.expect("payload");

    check!(payload.is_empty());
}

#[tokio::test]
async fn params_and_json_body_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/batch/stories"))
        .and(query_param("trace", "1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"ids": [1, 2, 3]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = RequestConfig::builder("/batch/stories")
        .method(Method::Post)
        .param("trace", 1)
        .json(&json!({"ids": [1, 2, 3]}))
        .expect("json")
        .build();
    transport(&server).send(config).await.expect("payload");
}

#[tokio::test]
async fn http_error_carries_status_and_body() {
    let server = MockServer::start().await;
    let body = json!({"success": false, "message": "Story not found"});
    Mock::given(method("GET"))
        .and(path("/stories/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let err = transport(&server)
        .send(RequestConfig::get("/stories/404"))
        .await
        .expect_err("404");

    let_assert!(Error::Http { status, message, data, .. } = &err);
    check!(*status == 404);
    check!(message == "Story not found");
    check!(*data == Payload::Json(body));
    check!(err.kind() == ErrorKind::Client);
    check!(err.timestamp().is_some());
}

#[tokio::test]
async fn http_error_without_message_uses_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down for maintenance"))
        .mount(&server)
        .await;

    let err = transport(&server)
        .send(RequestConfig::get("/status"))
        .await
        .expect_err("503");

    check!(err.to_string() == "HTTP 503: Service Unavailable");
    check!(err.is_server_error());
    check!(err.data() == Some(&Payload::Text("down for maintenance".to_string())));
}

#[tokio::test]
async fn unauthorized_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Not signed in"})))
        .mount(&server)
        .await;

    let err = transport(&server)
        .send(RequestConfig::get("/auth/me"))
        .await
        .expect_err("401");

    check!(err.is_auth_error());
    check!(err.is_client_error());
    check!(err.kind().to_string() == "authentication");
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    // port 1 is never listening
    let transport = HyperTransport::new(
        &ClientConfig::builder()
            .base_url("http://127.0.0.1:1/api")
            .connect_timeout(Duration::from_secs(2))
            .build(),
    );

    let err = transport
        .send(RequestConfig::get("/health"))
        .await
        .expect_err("network");

    check!(err.status() == 0);
    check!(err.is_network_error());
    check!(err.kind() == ErrorKind::Network);
    check!(err.to_string() == NETWORK_ERROR_MESSAGE);
    let_assert!(Some(Payload::Json(data)) = err.data());
    check!(data.get("originalError").is_some_and(serde_json::Value::is_string));
}

#[tokio::test]
async fn timeout_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let transport = HyperTransport::new(
        &ClientConfig::builder()
            .base_url(server.uri())
            .timeout(Duration::from_millis(50))
            .build(),
    );

    let err = transport
        .send(RequestConfig::get("/slow"))
        .await
        .expect_err("timeout");
    check!(err.is_network_error());
}

#[tokio::test]
async fn multipart_sets_boundary_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/3/avatar"))
        .and(header("content-type", "multipart/form-data; boundary=avatar-edge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let config = RequestConfig::builder("/users/3/avatar")
        .method(Method::Post)
        .header("Content-Type", "application/json")
        .multipart(Form::with_boundary("avatar-edge").file("file", "me.png", vec![0x89, 0x50]))
        .build();
    transport(&server).send(config).await.expect("payload");

    let requests = server.received_requests().await.expect("recorded");
    let_assert!(Some(request) = requests.first());
    let body = String::from_utf8_lossy(&request.body);
    check!(body.contains("name=\"file\"; filename=\"me.png\""));
}

#[tokio::test]
async fn session_cookie_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "JSESSIONID=abc123; Path=/; HttpOnly")
                .set_body_json(json!({"success": true, "data": {"id": 1}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("cookie", "JSESSIONID=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&server);
    let signin = RequestConfig::builder("/auth/signin")
        .method(Method::Post)
        .json(&json!({"username": "ada", "password": "secret"}))
        .expect("json")
        .build();
    transport.send(signin).await.expect("signin");
    check!(transport.cookies().get("JSESSIONID").as_deref() == Some("abc123"));

    transport
        .send(RequestConfig::get("/auth/me"))
        .await
        .expect("me");
}
