use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S%.3f";

const LOOKUP_PATHS: [&str; 18] = [
    "/funcoes",
    "/instituicoes",
    "/nacionalidades",
    "/orcrims",
    "/qualificacao/naturezas",
    "/qualificacao/grupos",
    "/qualificacao/capitulos",
    "/qualificacao/titulos",
    "/qualificacao/legislacoes",
    "/sexos",
    "/tiposDocumentos",
    "/tiposEndereco",
    "/tiposFuncoesOrcrim",
    "/tiposProcedimentoCriminal",
    "/tiposRegimes",
    "/tiposUnidadesPrisionais",
    "/ufs",
    "/unidadesPrisionais",
];

/// Credentials and token lifetime the mock identity provider accepts.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub expires_in: i64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            realm: "orcrim".to_string(),
            client_id: "orcrim-client".to_string(),
            client_secret: "orcrim-secret".to_string(),
            expires_in: 300,
        }
    }
}

#[derive(Clone, Debug)]
struct Record {
    updated_at: NaiveDateTime,
    body: Map<String, Value>,
    telefones: Vec<Value>,
    alcunhas: Vec<Value>,
}

impl Record {
    fn render(&self, id: Uuid) -> Value {
        let mut out = self.body.clone();
        out.insert("uuid".to_string(), json!(id));
        out.insert(
            "dataAtualizacao".to_string(),
            json!(self.updated_at.format(DATE_FORMAT).to_string()),
        );
        out.insert("telefones".to_string(), Value::Array(self.telefones.clone()));
        if !self.alcunhas.is_empty() {
            let mut alcunhas = out
                .get("alcunhas")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            alcunhas.extend(self.alcunhas.iter().cloned());
            out.insert("alcunhas".to_string(), Value::Array(alcunhas));
        }
        Value::Object(out)
    }
}

/// Shared state of one mock ORCRIM instance.
#[derive(Debug)]
pub struct MockState {
    config: MockConfig,
    people: RwLock<HashMap<Uuid, Record>>,
    tokens: RwLock<HashMap<String, DateTime<Utc>>>,
    issued: AtomicUsize,
}

impl MockState {
    pub fn new(config: MockConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            people: RwLock::new(HashMap::new()),
            tokens: RwLock::new(HashMap::new()),
            issued: AtomicUsize::new(0),
        })
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Number of access tokens handed out so far.
    pub fn tokens_issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    /// Store a person directly, bypassing the API, with a chosen update date.
    pub async fn seed_person(&self, body: Value, updated_at: NaiveDateTime) -> Uuid {
        let id = Uuid::new_v4();
        let body = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.people.write().await.insert(
            id,
            Record {
                updated_at,
                body,
                telefones: Vec::new(),
                alcunhas: Vec::new(),
            },
        );
        id
    }

    pub async fn person(&self, id: Uuid) -> Option<Value> {
        self.people.read().await.get(&id).map(|r| r.render(id))
    }
}

pub type Db = Arc<MockState>;

pub fn app() -> Router {
    router(MockState::new(MockConfig::default()))
}

pub fn router(state: Db) -> Router {
    let mut api = Router::new()
        .route("/personalidade", get(search_people).post(create_people))
        .route("/personalidade/{id}", get(get_person))
        .route("/personalidade/{id}/telefones", post(add_phones))
        .route("/personalidade/{id}/alcunhas", post(add_alias));
    for path in LOOKUP_PATHS {
        api = api.route(path, get(move |state: State<Db>, headers: HeaderMap| {
            lookup(state, headers, path)
        }));
    }

    Router::new()
        .route(
            "/auth/realms/{realm}/protocol/openid-connect/token",
            post(issue_token),
        )
        .nest("/api/v1", api)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, state: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub grant_type: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scope: String,
}

async fn issue_token(
    State(db): State<Db>,
    Path(realm): Path<String>,
    Form(form): Form<TokenForm>,
) -> (StatusCode, Json<Value>) {
    if realm != db.config.realm {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Realm does not exist"})),
        );
    }
    if form.grant_type != "client_credentials" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        );
    }
    let authenticated = form.client_id.as_deref() == Some(db.config.client_id.as_str())
        && form.client_secret.as_deref() == Some(db.config.client_secret.as_str());
    if !authenticated {
        tracing::info!(client_id = ?form.client_id, "rejected token request");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "unauthorized_client"})),
        );
    }

    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::seconds(db.config.expires_in);
    db.tokens.write().await.insert(token.clone(), expires_at);
    db.issued.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        Json(json!({
            "access_token": token,
            "expires_in": db.config.expires_in,
            "token_type": "Bearer",
            "scope": form.scope,
        })),
    )
}

async fn authorize(db: &Db, headers: &HeaderMap) -> Result<(), StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    match db.tokens.read().await.get(token) {
        Some(expires_at) if Utc::now() < *expires_at => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "dataInicio")]
    pub data_inicio: String,
    #[serde(rename = "dataFim")]
    pub data_fim: String,
}

async fn search_people(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&db, &headers).await?;
    let start = NaiveDateTime::parse_from_str(&params.data_inicio, DATE_FORMAT)
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let end = NaiveDateTime::parse_from_str(&params.data_fim, DATE_FORMAT)
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let people = db.people.read().await;
    let mut hits: Vec<(&Uuid, &Record)> = people
        .iter()
        .filter(|(_, r)| start <= r.updated_at && r.updated_at <= end)
        .collect();
    hits.sort_by_key(|(_, r)| r.updated_at);
    let data: Vec<Value> = hits.into_iter().map(|(id, r)| r.render(*id)).collect();
    Ok(Json(json!({ "data": data })))
}

async fn create_people(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    authorize(&db, &headers).await?;
    let entries = input
        .get("data")
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty())
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;

    let mut created = Vec::with_capacity(entries.len());
    for entry in entries {
        let body = entry
            .as_object()
            .cloned()
            .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
        let id = Uuid::new_v4();
        db.people.write().await.insert(
            id,
            Record {
                updated_at: Utc::now().naive_utc(),
                body,
                telefones: Vec::new(),
                alcunhas: Vec::new(),
            },
        );
        created.push(json!({ "uuid": id }));
    }
    Ok((StatusCode::CREATED, Json(json!({ "data": created }))))
}

async fn get_person(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&db, &headers).await?;
    db.person(id).await.map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn add_phones(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(phones): Json<Vec<Value>>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    authorize(&db, &headers).await?;
    if phones.iter().any(|p| p.get("telefone").is_none()) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let mut people = db.people.write().await;
    let record = people.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    record.telefones.extend(phones);
    record.updated_at = Utc::now().naive_utc();
    Ok((StatusCode::CREATED, Json(record.render(id))))
}

async fn add_alias(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(alias): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    authorize(&db, &headers).await?;
    if alias.get("alcunha").and_then(Value::as_str).is_none() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let mut people = db.people.write().await;
    let record = people.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    record.alcunhas.push(alias);
    record.updated_at = Utc::now().naive_utc();
    Ok((StatusCode::CREATED, Json(record.render(id))))
}

async fn lookup(
    State(db): State<Db>,
    headers: HeaderMap,
    path: &'static str,
) -> Result<Json<Value>, StatusCode> {
    authorize(&db, &headers).await?;
    Ok(Json(lookup_table(path)))
}

fn lookup_table(path: &str) -> Value {
    match path {
        "/ufs" => json!([
            {"id": 7, "nome": "Distrito Federal", "sigla": "DF"},
            {"id": 25, "nome": "São Paulo", "sigla": "SP"}
        ]),
        "/sexos" => json!([
            {"id": 1, "nome": "Masculino"},
            {"id": 2, "nome": "Feminino"}
        ]),
        other => json!([{ "id": 1, "nome": other.trim_start_matches('/') }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_render_adds_service_fields() {
        let updated_at =
            NaiveDateTime::parse_from_str("02/01/2023 10:00:00.000", DATE_FORMAT).unwrap();
        let record = Record {
            updated_at,
            body: json!({"nome": "Fulano", "alcunhas": [{"alcunha": "A"}]})
                .as_object()
                .cloned()
                .unwrap(),
            telefones: vec![json!({"telefone": "1"})],
            alcunhas: vec![json!({"alcunha": "B"})],
        };
        let rendered = record.render(Uuid::nil());
        assert_eq!(rendered["uuid"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(rendered["dataAtualizacao"], "02/01/2023 10:00:00.000");
        assert_eq!(rendered["telefones"][0]["telefone"], "1");
        assert_eq!(rendered["alcunhas"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn token_form_requires_grant_type() {
        let form: Result<TokenForm, _> = serde_json::from_str(r#"{"client_id":"a"}"#);
        assert!(form.is_err());
    }

    #[test]
    fn search_params_use_service_names() {
        let params: SearchParams = serde_json::from_str(
            r#"{"dataInicio":"01/01/2023 00:00:00.000","dataFim":"31/01/2024 00:00:00.000"}"#,
        )
        .unwrap();
        assert_eq!(params.data_inicio, "01/01/2023 00:00:00.000");
    }

    #[test]
    fn every_lookup_has_a_table() {
        for path in LOOKUP_PATHS {
            assert!(lookup_table(path).is_array());
        }
        assert_eq!(lookup_table("/ufs")[1]["sigla"], "SP");
    }
}
