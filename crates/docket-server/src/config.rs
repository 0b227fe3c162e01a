use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable that overrides the listening port.
pub const PORT_ENV: &str = "PORT";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// JSON file holding the collection. Created on first run.
    pub data_file: PathBuf,
    /// Client assets served for any path the API does not handle.
    pub static_dir: Option<PathBuf>,
    /// Send permissive CORS headers.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_file: PathBuf::from("data").join("todos.json"),
            static_dir: None,
            cors: true,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys take their default.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> ServerResult<()> {
        self.apply_port(std::env::var(PORT_ENV).ok().as_deref())
    }

    fn apply_port(&mut self, port: Option<&str>) -> ServerResult<()> {
        if let Some(raw) = port {
            let port: u16 = raw
                .trim()
                .parse()
                .map_err(|_| ServerError::Config(format!("invalid {PORT_ENV}: {raw:?}")))?;
            self.bind_addr.set_port(port);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.data_file, PathBuf::from("data/todos.json"));
        assert!(c.static_dir.is_none());
        assert!(c.cors);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:8080"
            static_dir = "public"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.static_dir, Some(PathBuf::from("public")));
        assert_eq!(c.data_file, ServerConfig::default().data_file);
        assert!(c.cors);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("bind_addr = 12").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docket.toml");
        std::fs::write(&path, "cors = false\ndata_file = \"/tmp/x.json\"\n").unwrap();
        let c = ServerConfig::load(&path).unwrap();
        assert!(!c.cors);
        assert_eq!(c.data_file, PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = ServerConfig::load(Path::new("/nonexistent/docket.toml")).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn port_override() {
        let mut c = ServerConfig::default();
        c.apply_port(Some("4000")).unwrap();
        assert_eq!(c.bind_addr, "127.0.0.1:4000".parse::<SocketAddr>().unwrap());

        c.apply_port(None).unwrap();
        assert_eq!(c.bind_addr.port(), 4000);

        assert!(c.apply_port(Some("http")).is_err());
    }
}
