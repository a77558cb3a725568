//! 节点绘图服务 - 业务能力层
//!
//! 只负责"把一个 RichNode 的 code 变成 image"，不关心题型和流程

use base64::{engine::general_purpose, Engine as _};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::infrastructure::PlotBackend;
use crate::models::rich_node::{
    CODE, CODE_ARCHIVE, CODE_ERROR, CODE_RUN_COUNT, DEBUG_MSG, HAS_IMAGE, IMAGE,
};
use crate::utils::logging::truncate_text;

/// 图片字段的 data-URI 前缀
pub const IMAGE_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// has_image 为 true 但没有代码时写入的提示
pub const MISSING_CODE_MSG: &str = "has_image is true but code is missing.";

/// 代码中没有使用 plt 时写入的提示
pub const NO_PLOT_CODE_MSG: &str = "code does not reference plt, no figure to capture.";

static PLOT_REFERENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\bplt\s*\.").ok());

/// 绘图成功后如何处理 code 字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePolicy {
    /// 保留代码
    Keep,
    /// 清空代码以减小 JSON 体积
    #[default]
    Clear,
    /// 代码移动到 `code_archive`，`code` 置空
    Archive,
}

impl std::str::FromStr for CodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keep" => Ok(CodePolicy::Keep),
            "clear" => Ok(CodePolicy::Clear),
            "archive" => Ok(CodePolicy::Archive),
            other => Err(format!("未知的代码处理策略: {}", other)),
        }
    }
}

/// 单个节点的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOutcome {
    /// 生成了新图片
    Rendered,
    /// 代码执行失败
    Failed,
    /// 需要图片但没有代码
    MissingCode,
    /// 不需要绘图
    Skipped,
}

/// 绘图统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub rendered: usize,
    pub failed: usize,
    pub missing_code: usize,
    pub skipped: usize,
}

impl RenderStats {
    pub fn record(&mut self, outcome: NodeOutcome) {
        match outcome {
            NodeOutcome::Rendered => self.rendered += 1,
            NodeOutcome::Failed => self.failed += 1,
            NodeOutcome::MissingCode => self.missing_code += 1,
            NodeOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn merge(&mut self, other: RenderStats) {
        self.rendered += other.rendered;
        self.failed += other.failed;
        self.missing_code += other.missing_code;
        self.skipped += other.skipped;
    }

    /// 出错的节点数
    pub fn errors(&self) -> usize {
        self.failed + self.missing_code
    }
}

/// 节点绘图服务
///
/// 职责：
/// - 判断节点是否需要绘图
/// - 调用绘图后端并回写 image / code_error / debug_msg
/// - 失败只记录在节点上，不向上传播
pub struct NodeRenderer<B> {
    backend: B,
    code_policy: CodePolicy,
}

impl<B: PlotBackend> NodeRenderer<B> {
    /// 创建新的节点绘图服务
    pub fn new(backend: B, code_policy: CodePolicy) -> Self {
        Self {
            backend,
            code_policy,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 处理单个节点
    ///
    /// # 参数
    /// - `node`: RichNode（非对象直接跳过）
    /// - `label`: 日志中显示的位置描述
    pub async fn render_node(&self, node: &mut Value, label: &str) -> NodeOutcome {
        let Some(map) = node.as_object_mut() else {
            return NodeOutcome::Skipped;
        };

        if !needs_render(map) {
            map.entry(CODE_ERROR).or_insert(json!(false));
            return NodeOutcome::Skipped;
        }

        let Some(code) = map
            .get(CODE)
            .and_then(Value::as_str)
            .filter(|code| !code.trim().is_empty())
            .map(str::to_owned)
        else {
            warn!("    ⚠️ {} 需要图片但缺少代码", label);
            mark_failed(map, MISSING_CODE_MSG);
            return NodeOutcome::MissingCode;
        };

        if !references_plot(&code) {
            warn!("    ⚠️ {} 的代码没有使用 plt，跳过执行", label);
            mark_failed(map, NO_PLOT_CODE_MSG);
            return NodeOutcome::Failed;
        }

        info!("    🎨 [绘图] {} ...", label);
        bump_run_count(map);

        match self.backend.render_png(&code).await {
            Ok(png) => {
                let image = format!(
                    "{}{}",
                    IMAGE_DATA_URI_PREFIX,
                    general_purpose::STANDARD.encode(png)
                );
                map.insert(IMAGE.to_string(), Value::String(image));
                map.insert(CODE_ERROR.to_string(), json!(false));
                map.insert(DEBUG_MSG.to_string(), Value::Null);
                self.apply_code_policy(map);
                info!("    ✅ {} 生成成功", label);
                NodeOutcome::Rendered
            }
            Err(e) => {
                let message = e.to_string();
                warn!(
                    "    ❌ {} 绘图失败: {}",
                    label,
                    truncate_text(message.lines().last().unwrap_or_default(), 120)
                );
                mark_failed(map, message);
                NodeOutcome::Failed
            }
        }
    }

    fn apply_code_policy(&self, map: &mut Map<String, Value>) {
        match self.code_policy {
            CodePolicy::Keep => {}
            CodePolicy::Clear => {
                map.insert(CODE.to_string(), Value::Null);
            }
            CodePolicy::Archive => {
                if let Some(code) = map.insert(CODE.to_string(), Value::Null) {
                    map.insert(CODE_ARCHIVE.to_string(), code);
                }
            }
        }
    }
}

/// has_image 为 true 且当前没有图片
fn needs_render(map: &Map<String, Value>) -> bool {
    let wants_image = map.get(HAS_IMAGE) == Some(&Value::Bool(true));
    let has_stored_image = match map.get(IMAGE) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    wants_image && !has_stored_image
}

fn references_plot(code: &str) -> bool {
    match PLOT_REFERENCE.as_ref() {
        Some(re) => re.is_match(code),
        None => code.contains("plt."),
    }
}

fn mark_failed(map: &mut Map<String, Value>, message: impl Into<String>) {
    map.insert(CODE_ERROR.to_string(), json!(true));
    map.insert(DEBUG_MSG.to_string(), Value::String(message.into()));
}

fn bump_run_count(map: &mut Map<String, Value>) {
    let count = map.get(CODE_RUN_COUNT).and_then(Value::as_u64).unwrap_or(0);
    map.insert(CODE_RUN_COUNT.to_string(), json!(count + 1));
}
