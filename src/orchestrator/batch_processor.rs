//! 题库批处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整的批处理：
//!
//! 1. **加载**：读取题库文件（数组或单个对象）
//! 2. **补全**：按题型补全字段（`RunMode::Normalize` / `Pipeline`）
//! 3. **绘图**：执行节点中的绘图代码（`RunMode::Render` / `Pipeline`）
//! 4. **写回**：全部处理完成后一次性写出结果
//!
//! 任何单题、单节点的问题只记录不中断；只有读写文件失败才终止本次运行。

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::config::{Config, RunMode};
use crate::infrastructure::{PlotBackend, PythonPlotExecutor};
use crate::models::{load_bank, save_bank, write_template};
use crate::orchestrator::question_processor::{
    normalize_questions, render_questions, NormalizeReport,
};
use crate::services::{NodeRenderer, RenderStats, WarnWriter};
use crate::utils::logging::{
    log_stage_start, log_startup, print_normalize_stats, print_render_stats,
};
use crate::workflow::QuestionFlow;

/// 一次运行的结果
#[derive(Debug, Default)]
pub struct RunSummary {
    /// 输入文件不存在，已生成示例数据
    pub template_created: bool,
    pub normalize: Option<NormalizeReport>,
    pub render: Option<RenderStats>,
}

/// 应用主结构
pub struct App {
    config: Config,
    warn_writer: Option<WarnWriter>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let warn_writer = match &config.warn_file {
            Some(path) => {
                let writer = WarnWriter::with_path(path);
                writer
                    .write_header("题库修正记录")
                    .await
                    .context("无法初始化警告文件")?;
                Some(writer)
            }
            None => None,
        };

        Ok(Self {
            config,
            warn_writer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行应用主逻辑（使用 Python 绘图执行器）
    pub async fn run(&self) -> Result<RunSummary> {
        let executor =
            PythonPlotExecutor::new(self.config.python_bin.clone(), self.config.render_dpi);
        self.run_with_backend(executor).await
    }

    /// 使用指定绘图后端运行
    pub async fn run_with_backend<B: PlotBackend>(&self, backend: B) -> Result<RunSummary> {
        log_startup(&self.config);

        let input = Path::new(&self.config.input_file);
        let mut summary = RunSummary::default();

        info!("📂 正在读取数据源: {} ...", input.display());
        let mut bank = match load_bank(input).await {
            Ok(bank) => bank,
            Err(e) if e.is_not_found() && self.config.create_template_when_missing => {
                warn!("❌ 找不到文件: {}，正在生成测试数据模板...", input.display());
                write_template(input)
                    .await
                    .context("生成测试数据模板失败")?;
                info!("✅ 测试文件已生成，请再次运行。");
                summary.template_created = true;
                return Ok(summary);
            }
            Err(e) => return Err(e).context("读取题库失败"),
        };

        if bank.is_empty() {
            warn!("⚠️ 题库为空");
        }

        if matches!(self.config.mode, RunMode::Normalize | RunMode::Pipeline) {
            summary.normalize = Some(self.normalize(&mut bank.questions).await?);
        }

        if matches!(self.config.mode, RunMode::Render | RunMode::Pipeline) {
            let flow = QuestionFlow::new(NodeRenderer::new(backend, self.config.code_policy));
            log_stage_start("代码绘图", bank.len());
            let stats = render_questions(&mut bank.questions, &flow).await;
            print_render_stats(stats.rendered, stats.failed, stats.missing_code);
            summary.render = Some(stats);
        }

        let output = Path::new(&self.config.output_file);
        info!("💾 正在保存结果到: {} ...", output.display());
        save_bank(&bank, output).await.context("保存结果失败")?;
        info!("✨ 处理程序运行结束！");

        Ok(summary)
    }

    /// 补全阶段
    async fn normalize(&self, questions: &mut [serde_json::Value]) -> Result<NormalizeReport> {
        log_stage_start("字段补全", questions.len());
        let report = normalize_questions(questions, &self.config.target_types);

        let counts: Vec<(&str, usize)> = report
            .counts
            .iter()
            .map(|(kind, count)| (kind.name(), *count))
            .collect();
        print_normalize_stats(&counts, report.passed_through, report.corrections.len());

        if let Some(writer) = &self.warn_writer {
            for diagnostic in report.corrections.iter().chain(report.warnings.iter()) {
                writer
                    .write(diagnostic)
                    .await
                    .with_context(|| format!("写入警告文件失败: {}", writer.path()))?;
            }
        }

        Ok(report)
    }
}
