//! RichNode 字段定义
//!
//! 题干、解析、选项、填空位都共享同一组字段

use serde_json::{json, Value};

pub const TEXT: &str = "text";
pub const CODE: &str = "code";
pub const CODE_ERROR: &str = "code_error";
pub const CODE_RUN_COUNT: &str = "code_run_count";
pub const HAS_IMAGE: &str = "has_image";
pub const IMAGE: &str = "image";
pub const DEBUG_MSG: &str = "debug_msg";
/// 归档策略下保存原始绘图代码的字段
pub const CODE_ARCHIVE: &str = "code_archive";

/// 空字符串视为 null 的字段
pub const NULLABLE_FIELDS: [&str; 2] = [CODE, IMAGE];

/// 节点角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// 题干 / 解析，额外带 `debug_msg`
    Content,
    /// 选项 / 填空位
    Child,
}

/// 所有节点共有的字段及默认值（按写入顺序）
pub fn base_fields() -> [(&'static str, Value); 5] {
    [
        (CODE, Value::Null),
        (CODE_ERROR, json!(false)),
        (CODE_RUN_COUNT, json!(0)),
        (HAS_IMAGE, json!(false)),
        (IMAGE, Value::Null),
    ]
}

/// 用于日志的 id 展示
pub fn display_id(node: &Value) -> String {
    match node.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "Unknown".to_string(),
        Some(other) => other.to_string(),
    }
}
