use ghost_api::{
    http::{HttpMethod, HttpRequest, Payload},
    transport::{self, ReqwestTransport, USER_AGENT},
    ClientConfig, ClientId, ClientSecret, GhostClient, Password, RequestError,
};
use serde_json::{json, Map, Value};
use wiremock::{
    matchers::{body_json, body_string_contains, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn config(url: &str) -> ClientConfig {
    ClientConfig::new(
        url,
        "you@example.com",
        Password::from_static("P@SSW0rd!"),
        ClientId::from_static("your-awesome-app"),
        ClientSecret::from_static("randomletters"),
    )
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("not an object"),
    }
}

fn token_body() -> Value {
    json!({
        "access_token": "access_granted",
        "refresh_token": "longerLasting",
        "expires_in": 3600,
        "token_type": "Bearer",
    })
}

#[tokio::test]
async fn posts_url_encoded_forms() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/form"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(header("user-agent", USER_AGENT))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=you%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/form", server.uri()).parse().unwrap();
    let body = json!({ "grant_type": "password", "username": "you@example.com" });

    let response = transport::post_form(&ReqwestTransport::default(), &url, &body, Vec::new())
        .await
        .unwrap();

    assert_eq!(response.body(), &json!({ "ok": true }));
    assert_eq!(response.raw().status, 200);
}

#[tokio::test]
async fn classifies_error_statuses() {
    let server = MockServer::start().await;
    Mock::given(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::default();
    let request = |p: &str| HttpRequest {
        method: HttpMethod::Put,
        url: format!("{}{p}", server.uri()).parse().unwrap(),
        headers: Vec::new(),
        payload: Payload::Json(Map::new()),
    };

    let down = transport::send(&transport, request("/down")).await.unwrap_err();
    let missing = transport::send(&transport, request("/missing")).await.unwrap_err();

    assert_eq!(down.to_string(), "SERVER_ERR{503}");
    assert!(down.is_server_error());
    assert_eq!(missing.to_string(), "CLIENT_ERR{404}");
}

#[tokio::test]
async fn get_payloads_become_query_strings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("limit", "5"))
        .and(query_param("filter", "featured:true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "posts": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let request = HttpRequest {
        method: HttpMethod::Get,
        url: format!("{}/posts", server.uri()).parse().unwrap(),
        headers: Vec::new(),
        payload: Payload::Json(fields(json!({ "limit": 5, "filter": "featured:true" }))),
    };

    let response = transport::send(&ReqwestTransport::default(), request).await.unwrap();

    assert_eq!(response["posts"], json!([]));
}

#[tokio::test]
async fn refused_connections_mean_the_server_is_dead() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{port}/token").parse().unwrap();

    let err = transport::post_form(
        &ReqwestTransport::default(),
        &url,
        &json!({ "grant_type": "password" }),
        Vec::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RequestError::ServerDead), "{err:?}");
}

#[tokio::test]
async fn client_logs_in_and_creates_posts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ghost/api/v0.1/authentication/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_id=your-awesome-app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ghost/api/v0.1/posts"))
        .and(header("authorization", "Bearer access_granted"))
        .and(body_json(json!({ "posts": [{ "title": "Hello" }] })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "posts": [{ "id": "abc" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ghost/api/v0.1/posts/abc"))
        .and(query_param("client_id", "your-awesome-app"))
        .and(query_param("client_secret", "randomletters"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "posts": [{ "id": "abc" }] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GhostClient::new(config(&server.uri()));

    let created = client
        .posts()
        .create(&json!({ "posts": [{ "title": "Hello" }] }))
        .await
        .unwrap();
    let read = client.posts().read(&json!({ "id": "abc" })).await.unwrap();

    assert_eq!(created["posts"][0]["id"], "abc");
    assert_eq!(read["posts"][0]["id"], "abc");
}

#[tokio::test]
async fn destruct_revokes_both_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ghost/api/v0.1/authentication/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ghost/api/v0.1/authentication/revoke"))
        .and(header("authorization", "Bearer access_granted"))
        .and(body_string_contains("token=longerLasting"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ghost/api/v0.1/authentication/revoke"))
        .and(header("authorization", "Bearer access_granted"))
        .and(body_string_contains("token=access_granted"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = GhostClient::new(config(&server.uri()));
    client.get_token().await.unwrap();

    client.destruct().await.unwrap();

    let tokens = client.token_manager().await;
    assert!(tokens.access_token().is_none());
    assert!(tokens.refresh_token().is_none());
}
