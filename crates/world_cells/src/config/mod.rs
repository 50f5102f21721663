//! Configuration system
//!
//! Settings that tune the cell core, loadable from TOML or RON.

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tuning for cell resolution and sweep queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Namespace tag used to key environment-cell archetypes in the store
    pub env_cell_namespace: u32,

    /// Cylinder-sphere inputs beyond this count are ignored by sweeps
    pub max_cylinder_spheres: usize,

    /// Initial value of `CellArray::load_cells`; when set, sweeps keep every
    /// gathered cell instead of pruning unreachable ones
    pub load_all_cells: bool,

    /// Optional RON file of environment-cell archetypes
    pub archetype_path: Option<String>,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            env_cell_namespace: 3,
            max_cylinder_spheres: 10,
            load_all_cells: false,
            archetype_path: None,
        }
    }
}

impl Config for SpatialConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_documented_values() {
        let config = SpatialConfig::default();
        assert_eq!(config.env_cell_namespace, 3);
        assert_eq!(config.max_cylinder_spheres, 10);
        assert!(!config.load_all_cells);
        assert!(config.archetype_path.is_none());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: SpatialConfig = toml::from_str("load_all_cells = true").unwrap();
        assert!(config.load_all_cells);
        assert_eq!(config.max_cylinder_spheres, 10);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let result = SpatialConfig::load_from_file("spatial.ini");
        // Reading fails first when the file is missing; either way it is an error
        assert!(result.is_err());
    }

    #[test]
    fn test_ron_save_and_load() {
        let path = std::env::temp_dir().join("world_cells_spatial_config.ron");
        let path = path.to_str().unwrap().to_string();

        let config = SpatialConfig {
            max_cylinder_spheres: 4,
            archetype_path: Some("cells.ron".into()),
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = SpatialConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }
}
