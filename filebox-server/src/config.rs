use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BASE_DIR: &str = "/var/lib/filebox";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Directory all uploads are written to and served from.
    pub base_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Guess a type from the file extension when sniffing finds nothing.
    pub sniff_extension_fallback: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            sniff_extension_fallback: true,
        }
    }
}

impl ServerConfig {
    /// Load from an optional TOML file, then apply `FILEBOX_*` environment
    /// overrides and validate.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(addr) = lookup("FILEBOX_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(port) = lookup("FILEBOX_PORT") {
            self.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("FILEBOX_PORT is not a valid port: {}", port))?;
        }
        if let Some(dir) = lookup("FILEBOX_BASE_DIR") {
            self.base_dir = PathBuf::from(dir);
        }
        if let Some(limit) = lookup("FILEBOX_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = limit.parse().map_err(|_| {
                anyhow::anyhow!("FILEBOX_MAX_UPLOAD_BYTES is not a byte count: {}", limit)
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.base_dir.as_os_str().is_empty() {
            anyhow::bail!("base_dir must not be empty");
        }
        if self.port == 0 {
            anyhow::bail!("port must not be 0");
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than 0");
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .bind_addr
            .parse()
            .map_err(|_| anyhow::anyhow!("bind_addr is not an IP address: {}", self.bind_addr))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_valid_config() {
        let toml_str = r#"
port = 9000
base_dir = "/srv/uploads"
max_upload_bytes = 1048576
"#;
        let config: ServerConfig = toml::from_str(toml_str).unwrap();
        config.validate().unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.base_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert!(config.sniff_extension_fallback);
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_empty_base_dir_rejected() {
        let config: ServerConfig = toml::from_str(r#"base_dir = """#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_bind_addr_rejected() {
        let config: ServerConfig = toml::from_str(r#"bind_addr = "localhost""#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config: ServerConfig = toml::from_str("port = 9000").unwrap();
        config
            .apply_env(env(&[
                ("FILEBOX_PORT", "9100"),
                ("FILEBOX_BASE_DIR", "/tmp/filebox"),
                ("FILEBOX_BIND_ADDR", "::1"),
            ]))
            .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.base_dir, PathBuf::from("/tmp/filebox"));
        assert_eq!(config.socket_addr().unwrap().to_string(), "[::1]:9100");
    }

    #[test]
    fn test_invalid_env_value_rejected() {
        let mut config = ServerConfig::default();
        assert!(config.apply_env(env(&[("FILEBOX_PORT", "eighty")])).is_err());
        assert!(config
            .apply_env(env(&[("FILEBOX_MAX_UPLOAD_BYTES", "-1")]))
            .is_err());
    }
}
