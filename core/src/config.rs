//! Connection settings for one ORCRIM deployment.

use serde::Deserialize;

pub const DEFAULT_SCOPES: &str = "openid email profile orcrim-backend";

/// Everything needed to reach one ORCRIM environment.
///
/// `base_url` includes the backend context path, e.g.
/// `https://hmlorcrim.mj.gov.br/backend-orcrim`. `auth_url` is the identity
/// provider's host, e.g. `https://hmlsegurancaorcrim.mj.gov.br`.
#[derive(Clone, Deserialize)]
pub struct OrcrimConfig {
    pub base_url: String,
    pub auth_url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_scopes")]
    pub scopes: String,
}

fn default_scopes() -> String {
    DEFAULT_SCOPES.to_string()
}

impl OrcrimConfig {
    /// OpenID Connect token endpoint of the configured realm.
    pub fn token_url(&self) -> String {
        format!(
            "{}/auth/realms/{}/protocol/openid-connect/token",
            self.auth_url.trim_end_matches('/'),
            self.realm
        )
    }
}

impl std::fmt::Debug for OrcrimConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrcrimConfig")
            .field("base_url", &self.base_url)
            .field("auth_url", &self.auth_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OrcrimConfig {
        OrcrimConfig {
            base_url: "https://hmlorcrim.mj.gov.br/backend-orcrim".to_string(),
            auth_url: "https://hmlsegurancaorcrim.mj.gov.br/".to_string(),
            realm: "hmlorcrim".to_string(),
            client_id: "svc".to_string(),
            client_secret: "s3cr3t".to_string(),
            scopes: DEFAULT_SCOPES.to_string(),
        }
    }

    #[test]
    fn token_url_is_built_from_realm() {
        assert_eq!(
            config().token_url(),
            "https://hmlsegurancaorcrim.mj.gov.br/auth/realms/hmlorcrim/protocol/openid-connect/token"
        );
    }

    #[test]
    fn debug_hides_client_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("s3cr3t"));
    }

    #[test]
    fn scopes_default_when_missing() {
        let cfg: OrcrimConfig = serde_json::from_str(
            r#"{"base_url":"http://b","auth_url":"http://a","realm":"r","client_id":"c","client_secret":"s"}"#,
        )
        .unwrap();
        assert_eq!(cfg.scopes, DEFAULT_SCOPES);
    }
}
