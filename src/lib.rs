//! # Question Bank Fix
//!
//! 题库 JSON 的字段补全与绘图代码渲染工具
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 唯一会执行题库中代码的地方，只暴露能力
//! - `PythonPlotExecutor` - 每次绘图启动独立的解释器进程，返回 PNG 字节
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个题目或节点
//! - `normalizer` - 按题型结构表补全字段
//! - `NodeRenderer` - 单个 RichNode 的绘图与回写
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"有哪些节点需要绘图
//! - `NodeCtx` - 节点位置（题干 / 解析 / 选项 / 空-选项）
//! - `QuestionFlow` - 按题型分发（选择类 / 完形填空 / 基础类）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 加载、补全、绘图、写回
//! - `orchestrator/question_processor` - 遍历题目列表并汇总统计
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, RunMode};
pub use error::{AppError, AppResult};
pub use infrastructure::{PlotBackend, PythonPlotExecutor};
pub use models::{QuestionBank, QuestionKind};
pub use orchestrator::{App, RunSummary};
pub use services::{CodePolicy, NodeRenderer};
pub use workflow::QuestionFlow;
