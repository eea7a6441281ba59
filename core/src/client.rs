//! Request builder and response parser for the ORCRIM resource API.
//!
//! # Design
//! `OrcrimClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! bearer token is an argument of every `build_*` method; obtaining it is the
//! caller's concern (see `Session`).

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::dates::format_query_date;
use crate::error::ApiError;
use crate::http::{ensure_success, HttpMethod, HttpRequest, HttpResponse};
use crate::person::{Alias, Person};
use crate::types::{Lookup, Phone};

const API_PREFIX: &str = "/api/v1";

/// Synchronous, stateless client for the ORCRIM API.
#[derive(Debug, Clone)]
pub struct OrcrimClient {
    base_url: String,
}

impl OrcrimClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    fn get(&self, path: String, token: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: auth_headers(token),
            body: None,
        }
    }

    fn post_json<B: Serialize + ?Sized>(
        &self,
        path: String,
        body: &B,
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(self.post(path, body, token))
    }

    fn post(&self, path: String, body: String, token: &str) -> HttpRequest {
        let mut headers = auth_headers(token);
        headers.push(("content-type".to_string(), "application/json".to_string()));
        HttpRequest {
            method: HttpMethod::Post,
            path,
            headers,
            body: Some(body),
        }
    }

    /// POST the record, wrapped as `{"data": [record]}`.
    pub fn build_create_person(&self, person: &Person, token: &str) -> Result<HttpRequest, ApiError> {
        Ok(self.post(self.url("/personalidade"), person.to_json()?, token))
    }

    pub fn build_get_person(&self, id: Uuid, token: &str) -> HttpRequest {
        self.get(self.url(&format!("/personalidade/{id}")), token)
    }

    pub fn build_add_phone(&self, person_id: Uuid, phone: &str, token: &str) -> Result<HttpRequest, ApiError> {
        let body = [Phone {
            telefone: phone.to_string(),
        }];
        self.post_json(self.url(&format!("/personalidade/{person_id}/telefones")), &body, token)
    }

    pub fn build_add_alias(
        &self,
        person_id: Uuid,
        alias: &str,
        alias_date: &str,
        token: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = Alias {
            alcunha: alias.to_string(),
            data_alcunha: alias_date.to_string(),
        };
        self.post_json(self.url(&format!("/personalidade/{person_id}/alcunhas")), &body, token)
    }

    /// GET the people updated between `start` and `end`.
    pub fn build_search_personalities(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        token: &str,
    ) -> HttpRequest {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("dataInicio", &format_query_date(start))
            .append_pair("dataFim", &format_query_date(end))
            .finish();
        self.get(format!("{}?{query}", self.url("/personalidade")), token)
    }

    pub fn build_lookup(&self, lookup: Lookup, token: &str) -> HttpRequest {
        self.get(self.url(lookup.path()), token)
    }

    pub fn parse_create_person(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_person(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(response)
    }

    pub fn parse_add_phone(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(response)
    }

    pub fn parse_add_alias(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(response)
    }

    pub fn parse_search_personalities(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(response)
    }

    pub fn parse_lookup(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(response)
    }
}

fn auth_headers(token: &str) -> Vec<(String, String)> {
    vec![
        ("accept".to_string(), "application/json".to_string()),
        ("authorization".to_string(), format!("Bearer {token}")),
    ]
}

/// Decode a 2xx body as JSON; an empty body is `null`.
fn parse_json(response: HttpResponse) -> Result<Value, ApiError> {
    ensure_success(&response)?;
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}
