//! Person record ("personalidade") and its embedded reference values.
//!
//! # Design
//! Callers describe a person with the flat `PersonFields`; `Person::from_fields`
//! applies the service's defaults and assembles the nested record. A composite
//! (municipality, state, sex, nationality) is built only when all of its parts
//! are present, otherwise it stays `None` and serializes as `null`.
//!
//! Rust field names are English; the JSON keys are the service's.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

pub const UNKNOWN_DATE: &str = "Data Desconhecida";
pub const UNKNOWN_NAME: &str = "Desconhecido";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub id: i64,
    pub nome: String,
}

/// Federative unit (UF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: i64,
    pub nome: String,
    pub sigla: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sex {
    pub id: i64,
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nationality {
    pub id: i64,
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriminalOrganization {
    pub id: i64,
    pub nome: String,
    pub sigla: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub alcunha: String,
    #[serde(rename = "dataAlcunha")]
    pub data_alcunha: String,
}

/// Taxpayer number (CPF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNumber {
    pub cpf: String,
}

/// Identity card (RG) and the state that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdDocument {
    pub rg: String,
    #[serde(rename = "ufRg")]
    pub uf_rg: State,
}

/// Death flag as the service encodes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deceased {
    #[serde(rename = "S")]
    Yes,
    #[default]
    #[serde(rename = "N")]
    No,
}

/// Flat description of a person; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonFields {
    pub name: Option<String>,
    pub birth_date: Option<String>,
    pub mother_name: Option<String>,
    pub father_name: Option<String>,
    pub deceased: Option<Deceased>,
    pub municipality_id: Option<i64>,
    pub municipality_name: Option<String>,
    pub state_id: Option<i64>,
    pub state_name: Option<String>,
    pub state_abbreviation: Option<String>,
    pub sex_id: Option<i64>,
    pub sex_name: Option<String>,
    pub nationality_id: Option<i64>,
    pub nationality_name: Option<String>,
    pub aliases: Vec<Alias>,
    pub document_numbers: Vec<String>,
    pub id_documents: Vec<IdDocument>,
    pub criminal_organizations: Vec<CriminalOrganization>,
}

/// A person record in the shape the `personalidade` endpoint exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    #[serde(rename = "dataNascimento")]
    pub birth_date: String,
    #[serde(rename = "nomeMae")]
    pub mother_name: String,
    #[serde(rename = "nomePai")]
    pub father_name: String,
    #[serde(rename = "obito")]
    pub deceased: Deceased,
    #[serde(rename = "municipio")]
    pub municipality: Option<Municipality>,
    #[serde(rename = "uf")]
    pub state: Option<State>,
    #[serde(rename = "sexo")]
    pub sex: Option<Sex>,
    #[serde(rename = "nacionalidade")]
    pub nationality: Option<Nationality>,
    #[serde(rename = "alcunhas")]
    pub aliases: Vec<Alias>,
    #[serde(rename = "cpfs")]
    pub document_numbers: Vec<DocumentNumber>,
    #[serde(rename = "rgs")]
    pub id_documents: Vec<IdDocument>,
    #[serde(rename = "orcrims")]
    pub criminal_organizations: Vec<CriminalOrganization>,
}

impl Default for Person {
    fn default() -> Self {
        Person::from_fields(PersonFields::default())
    }
}

/// Text counts as supplied only when non-empty.
fn text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Ids count as supplied only when non-zero.
fn id(value: Option<i64>) -> Option<i64> {
    value.filter(|&id| id != 0)
}

impl Person {
    pub fn from_fields(fields: PersonFields) -> Self {
        debug!(name = ?fields.name, "building person record");

        let municipality = match (id(fields.municipality_id), text(fields.municipality_name)) {
            (Some(id), Some(nome)) => Some(Municipality { id, nome }),
            _ => None,
        };
        let state = match (
            id(fields.state_id),
            text(fields.state_name),
            text(fields.state_abbreviation),
        ) {
            (Some(id), Some(nome), Some(sigla)) => Some(State { id, nome, sigla }),
            _ => None,
        };
        let sex = match (id(fields.sex_id), text(fields.sex_name)) {
            (Some(id), Some(nome)) => Some(Sex { id, nome }),
            _ => None,
        };
        let nationality = match (id(fields.nationality_id), text(fields.nationality_name)) {
            (Some(id), Some(nome)) => Some(Nationality { id, nome }),
            _ => None,
        };

        // RGs are only accepted for people with a known state.
        let id_documents = if state.is_some() {
            fields.id_documents
        } else {
            if !fields.id_documents.is_empty() {
                debug!(
                    dropped = fields.id_documents.len(),
                    "identity documents ignored for person without state"
                );
            }
            Vec::new()
        };

        Person {
            name: fields.name,
            birth_date: text(fields.birth_date).unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            mother_name: text(fields.mother_name).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            father_name: text(fields.father_name).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            deceased: fields.deceased.unwrap_or_default(),
            municipality,
            state,
            sex,
            nationality,
            aliases: fields.aliases,
            document_numbers: fields
                .document_numbers
                .into_iter()
                .map(|cpf| DocumentNumber { cpf })
                .collect(),
            id_documents,
            criminal_organizations: fields.criminal_organizations,
        }
    }

    /// Dictionary form of the record.
    pub fn to_value(&self) -> Result<Value, ApiError> {
        serde_json::to_value(self).map_err(|e| ApiError::Encode(e.to_string()))
    }

    /// Pretty JSON wrapping the record as `{"data": [record]}`.
    pub fn to_json(&self) -> Result<String, ApiError> {
        #[derive(Serialize)]
        struct Envelope<'a> {
            data: [&'a Person; 1],
        }
        serde_json::to_string_pretty(&Envelope { data: [self] })
            .map_err(|e| ApiError::Encode(e.to_string()))
    }

    /// Records carried by a `{"data": [...]}` document.
    pub fn from_json(json: &str) -> Result<Vec<Person>, ApiError> {
        #[derive(Deserialize)]
        struct Envelope {
            data: Vec<Person>,
        }
        serde_json::from_str::<Envelope>(json)
            .map(|envelope| envelope.data)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
