//! 配置模块，负责加载JSON配置文件

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::{ConfigurationError, LimitError};
use crate::registry::FieldRegistry;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigurationError),
}

/// 查询文本的上限，在分词之前检查
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    /// 最大字符数
    pub max_length: usize,
    /// 括号最大嵌套深度
    pub max_depth: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_length: 512,
            max_depth: 16,
        }
    }
}

impl QueryLimits {
    /// Rejects text that is too long or nests parentheses too deeply.
    /// Parentheses inside quoted phrases are not counted.
    pub fn check(&self, text: &str) -> Result<(), LimitError> {
        let length = text.chars().count();
        if length > self.max_length {
            return Err(LimitError::TooLong {
                length,
                max: self.max_length,
            });
        }

        let mut depth = 0usize;
        let mut in_phrase = false;
        for c in text.chars() {
            match c {
                '"' => in_phrase = !in_phrase,
                '(' if !in_phrase => {
                    depth += 1;
                    if depth > self.max_depth {
                        return Err(LimitError::TooDeep {
                            depth,
                            max: self.max_depth,
                        });
                    }
                }
                ')' if !in_phrase => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        Ok(())
    }
}

fn default_implicit_and() -> bool {
    true
}

/// 搜索引擎配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 相邻的词之间是否自动插入 AND
    #[serde(default = "default_implicit_and")]
    pub implicit_and: bool,
    #[serde(default)]
    pub limits: QueryLimits,
    pub registry: FieldRegistry,
}

impl EngineConfig {
    pub fn new(registry: FieldRegistry) -> Self {
        Self {
            implicit_and: true,
            limits: QueryLimits::default(),
            registry,
        }
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_ref.to_path_buf(),
            source,
        })?;

        Self::parse_json(&content, &path_ref.display().to_string())
    }

    /// 从JSON字符串加载配置
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse_json(content, "<string>")
    }

    fn parse_json(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_str(content).map_err(|source| ConfigError::Json {
                origin: origin.to_string(),
                source,
            })?;
        config.registry.validate()?;
        Ok(config)
    }
}
