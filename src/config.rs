use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppResult, ConfigError};
use crate::models::QuestionKind;
use crate::services::CodePolicy;

/// 默认配置文件名（存在时自动加载）
pub const DEFAULT_CONFIG_FILE: &str = "question_bank.toml";

/// 运行模式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// 只补全字段
    Normalize,
    /// 只执行绘图
    Render,
    /// 先补全再绘图
    #[default]
    Pipeline,
}

impl std::str::FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normalize" => Ok(RunMode::Normalize),
            "render" => Ok(RunMode::Render),
            "pipeline" => Ok(RunMode::Pipeline),
            other => Err(format!("未知的运行模式: {}", other)),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 输入题库文件
    pub input_file: String,
    /// 输出题库文件（可与输入相同）
    pub output_file: String,
    /// 运行模式
    pub mode: RunMode,
    /// 需要补全的题型
    pub target_types: Vec<QuestionKind>,
    // --- 绘图配置 ---
    pub python_bin: String,
    pub render_dpi: u32,
    pub code_policy: CodePolicy,
    /// 输入文件不存在时生成示例数据
    pub create_template_when_missing: bool,
    /// 修正记录文件，不设置则只输出到日志
    pub warn_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: "questions.json".to_string(),
            output_file: "questions.json".to_string(),
            mode: RunMode::Pipeline,
            target_types: QuestionKind::ALL.to_vec(),
            python_bin: "python3".to_string(),
            render_dpi: 100,
            code_policy: CodePolicy::Clear,
            create_template_when_missing: false,
            warn_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：TOML 文件（`QB_CONFIG` 或默认文件名）+ 环境变量覆盖
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("QB_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };

        Ok(base.with_overrides(|key| std::env::var(key).ok()))
    }

    /// 默认配置 + 环境变量覆盖
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            }
        })?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用键值查找函数覆盖配置项，无法解析的值保持原样
    pub fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            input_file: lookup("INPUT_FILE").unwrap_or(self.input_file),
            output_file: lookup("OUTPUT_FILE").unwrap_or(self.output_file),
            mode: parse_var(&lookup, "RUN_MODE").unwrap_or(self.mode),
            target_types: lookup("TARGET_TYPES")
                .and_then(|v| parse_target_types(&v))
                .unwrap_or(self.target_types),
            python_bin: lookup("PYTHON_BIN").unwrap_or(self.python_bin),
            render_dpi: parse_var(&lookup, "RENDER_DPI").unwrap_or(self.render_dpi),
            code_policy: parse_var(&lookup, "CODE_POLICY").unwrap_or(self.code_policy),
            create_template_when_missing: parse_var(&lookup, "CREATE_TEMPLATE_WHEN_MISSING")
                .unwrap_or(self.create_template_when_missing),
            warn_file: lookup("WARN_FILE").or(self.warn_file),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// 解析逗号分隔的题型列表，任一项无法识别则整体放弃
fn parse_target_types(value: &str) -> Option<Vec<QuestionKind>> {
    let kinds: Result<Vec<QuestionKind>, _> = value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect();

    match kinds {
        Ok(kinds) if !kinds.is_empty() => Some(kinds),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("TARGET_TYPES 解析失败: {}", e);
            None
        }
    }
}
