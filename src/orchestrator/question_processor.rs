//! 题目处理器 - 编排层
//!
//! 遍历题目列表，把单道题交给 normalizer / QuestionFlow，
//! 输出逐题日志并汇总统计。不做具体的字段判断。

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::infrastructure::PlotBackend;
use crate::models::rich_node::display_id;
use crate::models::{schema_for, QuestionKind};
use crate::services::normalizer::{find_duplicate_ids, normalize_question, Diagnostic};
use crate::services::RenderStats;
use crate::workflow::QuestionFlow;

/// 字段补全结果
#[derive(Debug, Default, Clone)]
pub struct NormalizeReport {
    /// 各题型处理数量
    pub counts: BTreeMap<QuestionKind, usize>,
    /// 非目标题型、未知题型等原样保留的题目数量
    pub passed_through: usize,
    /// 形态修正记录
    pub corrections: Vec<Diagnostic>,
    /// 题库级别的提醒（重复 ID、未知题型等），不修改数据
    pub warnings: Vec<Diagnostic>,
}

impl NormalizeReport {
    /// 处理的题目总数
    pub fn processed(&self) -> usize {
        self.counts.values().sum()
    }
}

/// 按题型补全题目列表
///
/// # 参数
/// - `questions`: 题目列表（原地修改）
/// - `targets`: 需要补全的题型，其余题目原样保留
pub fn normalize_questions(questions: &mut [Value], targets: &[QuestionKind]) -> NormalizeReport {
    let total = questions.len();
    let mut report = NormalizeReport::default();

    for (idx, question) in questions.iter_mut().enumerate() {
        let id = display_id(question);

        if !question.is_object() {
            report.warnings.push(Diagnostic::new(
                format!("#{}", idx + 1),
                "不是对象，已跳过",
            ));
            report.passed_through += 1;
            continue;
        }

        let type_name = question
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let Some(schema) = schema_for(&type_name) else {
            report.warnings.push(Diagnostic::new(
                id,
                format!("的题目类型 '{}' 未知，已跳过", type_name),
            ));
            report.passed_through += 1;
            continue;
        };

        if !targets.contains(&schema.kind) {
            report.passed_through += 1;
            continue;
        }

        info!(
            "[{}/{}] 补全 ID: {} | 类型: {}",
            idx + 1,
            total,
            id,
            schema.kind.name()
        );

        let corrections = normalize_question(question, schema);
        for diagnostic in &corrections {
            warn!("⚠️ {}", diagnostic);
        }
        report.corrections.extend(corrections);
        *report.counts.entry(schema.kind).or_insert(0) += 1;
    }

    for (id, count) in find_duplicate_ids(questions) {
        report
            .warnings
            .push(Diagnostic::new(id, format!("重复出现 {} 次", count)));
    }

    for diagnostic in &report.warnings {
        warn!("⚠️ {}", diagnostic);
    }

    report
}

/// 依次为每道题执行绘图
pub async fn render_questions<B: PlotBackend>(
    questions: &mut [Value],
    flow: &QuestionFlow<B>,
) -> RenderStats {
    let total = questions.len();
    let mut stats = RenderStats::default();

    for (idx, question) in questions.iter_mut().enumerate() {
        let id = display_id(question);
        let type_name = question
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("None");
        info!("[{}/{}] 处理 ID: {} | 类型: {}", idx + 1, total, id, type_name);
        stats.merge(flow.render_question(question).await);
    }

    stats
}
