//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 题库批处理器
//! - 管理一次运行的生命周期（加载、补全、绘图、写回）
//! - 持有绘图执行器
//! - 输出全局统计信息
//!
//! ### `question_processor` - 题目处理器
//! - 遍历题目列表（Vec<Value>）
//! - 按题型过滤并调用补全服务
//! - 调用 QuestionFlow 处理绘图
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理题库文件)
//!     ↓
//! question_processor (处理 Vec<Question>)
//!     ↓
//! workflow::QuestionFlow (处理单个 Question)
//!     ↓
//! services (能力层：normalizer / renderer / warn)
//!     ↓
//! infrastructure (基础设施：PythonPlotExecutor)
//! ```

pub mod batch_processor;
pub mod question_processor;

// 重新导出主要类型
pub use batch_processor::{App, RunSummary};
pub use question_processor::{normalize_questions, render_questions, NormalizeReport};
