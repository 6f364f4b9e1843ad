use crate::core::pricing::ADMIN_FEE;
use crate::domain::model::{Actor, Capability};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{RentalError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub identity: Option<IdentityConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_admin_fee")]
    pub admin_fee: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            admin_fee: default_admin_fee(),
        }
    }
}

fn default_admin_fee() -> i64 {
    ADMIN_FEE
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub data_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub capability: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RentalError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RentalError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_FILE})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RentalError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if self.pricing.admin_fee < 0 {
            return Err(RentalError::InvalidConfigValueError {
                field: "pricing.admin_fee".to_string(),
                value: self.pricing.admin_fee.to_string(),
                reason: "Admin fee cannot be negative".to_string(),
            });
        }

        if let Some(path) = &self.catalog.data_file {
            crate::utils::validation::validate_path("catalog.data_file", path)?;
        }

        if let Some(identity) = &self.identity {
            identity
                .capability
                .parse::<Capability>()
                .map_err(|_| RentalError::InvalidConfigValueError {
                    field: "identity.capability".to_string(),
                    value: identity.capability.clone(),
                    reason: "Expected tenant or manager".to_string(),
                })?;
            if identity.name.trim().is_empty() {
                return Err(RentalError::MissingConfigError {
                    field: "identity.name".to_string(),
                });
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if let Some(level) = &self.logging.level {
            if !valid_levels.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(RentalError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!(
                        "Unsupported level. Valid levels: {}",
                        valid_levels.join(", ")
                    ),
                });
            }
        }

        let valid_formats = ["compact", "json"];
        if let Some(format) = &self.logging.format {
            if !valid_formats.contains(&format.as_str()) {
                return Err(RentalError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }

    /// 取得設定中的登入身分，未設定時視為訪客
    pub fn actor(&self) -> Result<Option<Actor>> {
        self.identity
            .as_ref()
            .map(|identity| {
                Ok(Actor {
                    id: identity.id,
                    name: identity.name.clone(),
                    email: identity.email.clone(),
                    capability: identity.capability.parse()?,
                })
            })
            .transpose()
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format.as_deref() == Some("json")
    }
}

impl ConfigProvider for TomlConfig {
    fn admin_fee(&self) -> i64 {
        self.pricing.admin_fee
    }

    fn catalog_file(&self) -> Option<&str> {
        self.catalog.data_file.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
