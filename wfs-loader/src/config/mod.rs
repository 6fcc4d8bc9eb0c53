//! Configuration : serveurs WFS connus et paramètres de téléchargement

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use wfs_import::DEFAULT_CRS;

/// Liste des serveurs WFS proposés
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub servers: Vec<ServerConfig>,
}

/// Un serveur WFS
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Identifiant court utilisé en ligne de commande
    pub key: String,

    /// Libellé affiché
    pub label: String,

    /// URL de base du service
    pub url: String,
}

impl Config {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        Ok(config.normalized())
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "nl" => Self::load_embedded(include_str!("presets/nl.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: nl", preset),
        }
    }

    /// Preset embarqué ou chemin vers un fichier JSON
    pub fn resolve(spec: &str) -> Result<Self> {
        match spec {
            "nl" => Self::from_preset(spec),
            _ => Self::load(Path::new(spec)),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse embedded config")?;
        Ok(config.normalized())
    }

    /// Les URLs de certains serveurs arrivent avec des espaces parasites
    fn normalized(mut self) -> Self {
        for server in &mut self.servers {
            server.url = server.url.trim().to_string();
        }
        self
    }

    /// Recherche un serveur par clé ou libellé (insensible à la casse)
    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers
            .iter()
            .find(|s| s.key.eq_ignore_ascii_case(name) || s.label.eq_ignore_ascii_case(name))
    }

    /// URL de base d'un serveur ; une valeur commençant par `http` est prise telle quelle
    pub fn resolve_url(&self, server: &str) -> Result<String> {
        let server = server.trim();
        if server.starts_with("http://") || server.starts_with("https://") {
            return Ok(server.to_string());
        }
        self.server(server)
            .map(|s| s.url.clone())
            .ok_or_else(|| anyhow::anyhow!("Unknown server: {}. Run `wfs-loader servers`", server))
    }
}

/// Paramètres de téléchargement
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub crs: String,
    pub output_format: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            user_agent: concat!("wfs-loader/", env!("CARGO_PKG_VERSION")).into(),
            crs: DEFAULT_CRS.into(),
            output_format: "application/json".into(),
        }
    }
}

impl FetchConfig {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout: std::env::var("WFS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            user_agent: std::env::var("WFS_USER_AGENT").unwrap_or(defaults.user_agent),
            crs: std::env::var("WFS_CRS").unwrap_or(defaults.crs),
            output_format: std::env::var("WFS_OUTPUT_FORMAT").unwrap_or(defaults.output_format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_servers() {
        let config = Config::from_preset("nl").unwrap();
        assert_eq!(config.servers.len(), 6);
        assert_eq!(
            config.server("alo").unwrap().url,
            "https://data.rivm.nl/geo/alo/wfs"
        );
        assert_eq!(
            config.server("Risicokaart - REV WFS").unwrap().key,
            "rev"
        );
    }

    #[test]
    fn test_preset_urls_are_trimmed() {
        let config = Config::from_preset("nl").unwrap();
        let geodan = config.server("GEODAN").unwrap();
        assert!(geodan.url.starts_with("https://apps.geodan.nl/"));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(Config::from_preset("fr").is_err());
    }

    #[test]
    fn test_resolve_url() {
        let config = Config::from_preset("nl").unwrap();
        assert_eq!(
            config.resolve_url("ANK").unwrap(),
            "https://data.rivm.nl/geo/ank/wfs"
        );
        assert_eq!(
            config.resolve_url(" https://example.org/wfs").unwrap(),
            "https://example.org/wfs"
        );
        assert!(config.resolve_url("onbekend").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("wfs_loader_test_config.json");
        std::fs::write(
            &path,
            r#"{"servers":[{"key":"pdok","label":"PDOK","url":" https://service.pdok.nl/wfs "}]}"#,
        )
        .unwrap();

        let config = Config::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server("pdok").unwrap().url, "https://service.pdok.nl/wfs");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.crs, "EPSG:28992");
        assert_eq!(config.output_format, "application/json");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }
}
