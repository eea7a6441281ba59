//! Request payloads for the `personalidade` sub-collections and the catalogue
//! of reference (lookup) endpoints.

use serde::{Deserialize, Serialize};

/// One entry of the phone list posted to `/personalidade/{id}/telefones`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub telefone: String,
}

/// Reference tables served without parameters under `/api/v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    Functions,
    Institutions,
    Nationalities,
    CriminalOrganizations,
    OffenseNatures,
    OffenseGroups,
    OffenseChapters,
    OffenseTitles,
    Legislations,
    Sexes,
    DocumentTypes,
    AddressTypes,
    OrganizationRoleTypes,
    CriminalProcedureTypes,
    RegimeTypes,
    PrisonUnitTypes,
    States,
    PrisonUnits,
}

impl Lookup {
    pub const ALL: [Lookup; 18] = [
        Lookup::Functions,
        Lookup::Institutions,
        Lookup::Nationalities,
        Lookup::CriminalOrganizations,
        Lookup::OffenseNatures,
        Lookup::OffenseGroups,
        Lookup::OffenseChapters,
        Lookup::OffenseTitles,
        Lookup::Legislations,
        Lookup::Sexes,
        Lookup::DocumentTypes,
        Lookup::AddressTypes,
        Lookup::OrganizationRoleTypes,
        Lookup::CriminalProcedureTypes,
        Lookup::RegimeTypes,
        Lookup::PrisonUnitTypes,
        Lookup::States,
        Lookup::PrisonUnits,
    ];

    /// Path relative to `/api/v1`, with a leading slash.
    pub fn path(self) -> &'static str {
        match self {
            Lookup::Functions => "/funcoes",
            Lookup::Institutions => "/instituicoes",
            Lookup::Nationalities => "/nacionalidades",
            Lookup::CriminalOrganizations => "/orcrims",
            Lookup::OffenseNatures => "/qualificacao/naturezas",
            Lookup::OffenseGroups => "/qualificacao/grupos",
            Lookup::OffenseChapters => "/qualificacao/capitulos",
            Lookup::OffenseTitles => "/qualificacao/titulos",
            Lookup::Legislations => "/qualificacao/legislacoes",
            Lookup::Sexes => "/sexos",
            Lookup::DocumentTypes => "/tiposDocumentos",
            Lookup::AddressTypes => "/tiposEndereco",
            Lookup::OrganizationRoleTypes => "/tiposFuncoesOrcrim",
            Lookup::CriminalProcedureTypes => "/tiposProcedimentoCriminal",
            Lookup::RegimeTypes => "/tiposRegimes",
            Lookup::PrisonUnitTypes => "/tiposUnidadesPrisionais",
            Lookup::States => "/ufs",
            Lookup::PrisonUnits => "/unidadesPrisionais",
        }
    }

    pub fn from_path(path: &str) -> Option<Lookup> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Lookup::ALL.into_iter().find(|l| l.path() == path)
    }
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
