//! Default configuration values for Memory-Edit

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub memory: MemoryDefaults,
    pub backend: BackendDefaults,
    pub logging: LoggingDefaults,
}

/// Default memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDefaults {
    pub default_exclusions: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_read_size: usize,
}

/// Default backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendDefaults {
    pub preferred: String,
    pub proc_root: String,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Mappings skipped by every enumeration unless the caller overrides them:
/// GPU device nodes and the markers a Windows compatibility layer injects.
pub const DEFAULT_EXCLUSIONS: &[&str] = &["/dev/dri/", "Proton"];

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        memory: MemoryDefaults {
            default_exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            exclude_patterns: Vec::new(),
            max_read_size: 67108864, // 64MB
        },
        backend: BackendDefaults {
            preferred: "auto".to_string(),
            proc_root: "/proc".to_string(),
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
        },
    }
}
