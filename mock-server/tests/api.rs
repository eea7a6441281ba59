use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, router, MockConfig, MockState};
use serde_json::Value;
use tower::{Service, ServiceExt};

const TOKEN_PATH: &str = "/auth/realms/orcrim/protocol/openid-connect/token";
const GOOD_FORM: &str =
    "grant_type=client_credentials&client_id=orcrim-client&client_secret=orcrim-secret&scope=openid";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn form_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(body.to_string())
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<&str>) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    if body.is_some() {
        builder = builder.header(http::header::CONTENT_TYPE, "application/json");
    }
    builder.body(body.unwrap_or_default().to_string()).unwrap()
}

async fn token(app: &mut axum::Router) -> String {
    let resp = ServiceExt::<Request<String>>::ready(app)
        .await
        .unwrap()
        .call(form_request(TOKEN_PATH, GOOD_FORM))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    body["access_token"].as_str().unwrap().to_string()
}

// --- token endpoint ---

#[tokio::test]
async fn token_issued_for_valid_client() {
    let state = MockState::new(MockConfig::default());
    let resp = router(state.clone())
        .oneshot(form_request(TOKEN_PATH, GOOD_FORM))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert_eq!(body["expires_in"], 300);
    assert_eq!(state.tokens_issued(), 1);
}

#[tokio::test]
async fn token_rejected_for_wrong_secret() {
    let state = MockState::new(MockConfig::default());
    let resp = router(state.clone())
        .oneshot(form_request(
            TOKEN_PATH,
            "grant_type=client_credentials&client_id=orcrim-client&client_secret=nope",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.tokens_issued(), 0);
}

#[tokio::test]
async fn token_rejects_other_grants() {
    let resp = app()
        .oneshot(form_request(
            TOKEN_PATH,
            "grant_type=password&client_id=orcrim-client&client_secret=orcrim-secret",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_unknown_realm_returns_404() {
    let resp = app()
        .oneshot(form_request(
            "/auth/realms/other/protocol/openid-connect/token",
            GOOD_FORM,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- bearer checks ---

#[tokio::test]
async fn resources_require_bearer_token() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/ufs")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let resp = app()
        .oneshot(authed("GET", "/api/v1/sexos", "forged", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let state = MockState::new(MockConfig {
        expires_in: 0,
        ..MockConfig::default()
    });
    let mut app = router(state);
    let token = token(&mut app).await;

    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/api/v1/sexos", &token, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- lookups ---

#[tokio::test]
async fn lookup_tables_are_served() {
    let mut app = app();
    let token = token(&mut app).await;

    for uri in ["/api/v1/ufs", "/api/v1/qualificacao/naturezas", "/api/v1/tiposRegimes"] {
        let resp = ServiceExt::<Request<String>>::ready(&mut app)
            .await
            .unwrap()
            .call(authed("GET", uri, &token, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let rows: Vec<Value> = body_json(resp).await;
        assert!(!rows.is_empty(), "{uri}");
    }
}

// --- personalidade ---

#[tokio::test]
async fn get_person_not_found() {
    let mut app = app();
    let token = token(&mut app).await;
    let resp = app
        .oneshot(authed(
            "GET",
            "/api/v1/personalidade/00000000-0000-0000-0000-000000000000",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn create_without_data_envelope_returns_422() {
    let mut app = app();
    let token = token(&mut app).await;
    let resp = app
        .oneshot(authed(
            "POST",
            "/api/v1/personalidade",
            &token,
            Some(r#"{"nome":"sem envelope"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn search_requires_well_formed_dates() {
    let mut app = app();
    let token = token(&mut app).await;
    let resp = app
        .oneshot(authed(
            "GET",
            "/api/v1/personalidade?dataInicio=2023-01-01&dataFim=2024-01-31",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_filters_by_update_date() {
    let state = MockState::new(MockConfig::default());
    let fmt = "%d/%m/%Y %H:%M:%S%.3f";
    let inside = chrono::NaiveDateTime::parse_from_str("15/06/2023 12:00:00.000", fmt).unwrap();
    let outside = chrono::NaiveDateTime::parse_from_str("15/06/2022 12:00:00.000", fmt).unwrap();
    let kept = state.seed_person(serde_json::json!({"nome": "Dentro"}), inside).await;
    state.seed_person(serde_json::json!({"nome": "Fora"}), outside).await;

    let mut app = router(state);
    let token = token(&mut app).await;
    let resp = app
        .oneshot(authed(
            "GET",
            "/api/v1/personalidade?dataInicio=01%2F01%2F2023+00%3A00%3A00.000&dataFim=31%2F01%2F2024+00%3A00%3A00.000",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listing: Value = body_json(resp).await;
    let data = listing["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["uuid"], kept.to_string());
    assert_eq!(data[0]["dataAtualizacao"], "15/06/2023 12:00:00.000");
}

#[tokio::test]
async fn full_person_lifecycle() {
    let mut app = app();
    let token = token(&mut app).await;

    // create
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(authed(
            "POST",
            "/api/v1/personalidade",
            &token,
            Some(r#"{"data":[{"nome":"Fulano","alcunhas":[]}]}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = body_json(resp).await;
    let id = created["data"][0]["uuid"].as_str().unwrap().to_string();

    // add phone
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(authed(
            "POST",
            &format!("/api/v1/personalidade/{id}/telefones"),
            &token,
            Some(r#"[{"telefone":"61999990000"}]"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // add alias
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(authed(
            "POST",
            &format!("/api/v1/personalidade/{id}/alcunhas"),
            &token,
            Some(r#"{"alcunha":"Tal","dataAlcunha":"2020-01-01"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // malformed phone list
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(authed(
            "POST",
            &format!("/api/v1/personalidade/{id}/telefones"),
            &token,
            Some(r#"[{"numero":"1"}]"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // get
    let resp = ServiceExt::<Request<String>>::ready(&mut app)
        .await
        .unwrap()
        .call(authed(
            "GET",
            &format!("/api/v1/personalidade/{id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let person: Value = body_json(resp).await;
    assert_eq!(person["nome"], "Fulano");
    assert_eq!(person["telefones"][0]["telefone"], "61999990000");
    assert_eq!(person["alcunhas"][0]["alcunha"], "Tal");
}
