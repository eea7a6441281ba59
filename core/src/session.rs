//! Blocking convenience layer: token, build, execute, parse in one call.

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::client::OrcrimClient;
use crate::config::OrcrimConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::person::Person;
use crate::token::{TokenManager, TokenProvider};
use crate::types::Lookup;

/// An `OrcrimClient` bound to a token source and a transport.
///
/// Every operation asks `P` for a bearer token first; with a `TokenManager`
/// that renews the token when it is missing or expired.
pub struct Session<T, P> {
    client: OrcrimClient,
    tokens: P,
    transport: T,
}

impl<T: Transport> Session<T, TokenManager> {
    pub fn from_config(config: &OrcrimConfig, transport: T) -> Self {
        Self::new(
            OrcrimClient::new(&config.base_url),
            TokenManager::from_config(config),
            transport,
        )
    }
}

impl<T: Transport, P: TokenProvider> Session<T, P> {
    pub fn new(client: OrcrimClient, tokens: P, transport: T) -> Self {
        Self {
            client,
            tokens,
            transport,
        }
    }

    pub fn client(&self) -> &OrcrimClient {
        &self.client
    }

    pub fn tokens(&self) -> &P {
        &self.tokens
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn token(&mut self) -> Result<String, ApiError> {
        self.tokens.access_token(&self.transport)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        info!(method = request.method.as_str(), path = %request.path, "sending request");
        let response = self.transport.execute(&request).inspect_err(|e| {
            warn!(path = %request.path, error = %e, "request failed");
        })?;
        if response.is_success() {
            info!(status = response.status, "request succeeded");
        } else {
            warn!(status = response.status, path = %request.path, "request rejected");
        }
        Ok(response)
    }

    #[instrument(skip_all, fields(name = ?person.name))]
    pub fn create_person(&mut self, person: &Person) -> Result<Value, ApiError> {
        let token = self.token()?;
        let request = self.client.build_create_person(person, &token)?;
        let response = self.send(request)?;
        self.client.parse_create_person(response)
    }

    #[instrument(skip(self))]
    pub fn get_person(&mut self, id: Uuid) -> Result<Value, ApiError> {
        let token = self.token()?;
        let request = self.client.build_get_person(id, &token);
        let response = self.send(request)?;
        self.client.parse_get_person(response)
    }

    #[instrument(skip(self, phone))]
    pub fn add_phone(&mut self, person_id: Uuid, phone: &str) -> Result<Value, ApiError> {
        let token = self.token()?;
        let request = self.client.build_add_phone(person_id, phone, &token)?;
        let response = self.send(request)?;
        self.client.parse_add_phone(response)
    }

    #[instrument(skip(self, alias))]
    pub fn add_alias(
        &mut self,
        person_id: Uuid,
        alias: &str,
        alias_date: &str,
    ) -> Result<Value, ApiError> {
        let token = self.token()?;
        let request = self
            .client
            .build_add_alias(person_id, alias, alias_date, &token)?;
        let response = self.send(request)?;
        self.client.parse_add_alias(response)
    }

    #[instrument(skip(self))]
    pub fn search_personalities(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Value, ApiError> {
        let token = self.token()?;
        let request = self.client.build_search_personalities(start, end, &token);
        let response = self.send(request)?;
        self.client.parse_search_personalities(response)
    }

    #[instrument(skip_all, fields(lookup = %lookup))]
    pub fn lookup(&mut self, lookup: Lookup) -> Result<Value, ApiError> {
        let token = self.token()?;
        let request = self.client.build_lookup(lookup, &token);
        let response = self.send(request)?;
        self.client.parse_lookup(response)
    }
}
