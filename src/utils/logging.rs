/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, RunMode};

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 `info`，详细模式下为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    let mode = match config.mode {
        RunMode::Normalize => "字段补全",
        RunMode::Render => "代码绘图",
        RunMode::Pipeline => "字段补全 + 代码绘图",
    };
    let types: Vec<&str> = config.target_types.iter().map(|k| k.as_str()).collect();

    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {}模式", mode);
    info!("📂 输入: {} | 输出: {}", config.input_file, config.output_file);
    info!("🧩 补全题型: {}", types.join(", "));
    info!("{}", "=".repeat(60));
}

/// 记录阶段开始信息
///
/// # 参数
/// - `stage`: 阶段名称
/// - `total`: 题目总数
pub fn log_stage_start(stage: &str, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("⚙️ 开始{}: 共 {} 道题目", stage, total);
    info!("{}", "─".repeat(60));
}

/// 打印补全统计
///
/// # 参数
/// - `counts`: (题型中文名, 数量)
/// - `passed_through`: 未处理（非目标题型）的题目数量
/// - `corrections`: 形态修正条数
pub fn print_normalize_stats(counts: &[(&str, usize)], passed_through: usize, corrections: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 字段补全统计");
    for (name, count) in counts {
        info!("  {}: {}", name, count);
    }
    info!("⏭️ 未处理: {}", passed_through);
    info!("🔧 形态修正: {}", corrections);
    info!("{}", "=".repeat(60));
}

/// 打印绘图统计
pub fn print_render_stats(rendered: usize, failed: usize, missing_code: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 绘图统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 成功: {}", rendered);
    info!("❌ 失败: {}", failed);
    info!("⚠️ 缺少代码: {}", missing_code);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
