//! 节点位置上下文
//!
//! 封装"我正在处理哪道题的哪个节点"这一信息，只用于日志

use std::fmt::Display;

/// 节点在题目中的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePart {
    /// 题干
    Content,
    /// 解析
    Explanation,
    /// 选项
    Option { option_id: String },
    /// 完形填空某个空下的选项
    BlankOption { blank_id: String, option_id: String },
}

/// 节点处理上下文
#[derive(Debug, Clone)]
pub struct NodeCtx {
    /// 题目ID
    pub question_id: String,

    /// 节点位置
    pub part: NodePart,
}

impl NodeCtx {
    pub fn new(question_id: impl Into<String>, part: NodePart) -> Self {
        Self {
            question_id: question_id.into(),
            part,
        }
    }
}

impl Display for NodeCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "题目[{}]-", self.question_id)?;
        match &self.part {
            NodePart::Content => write!(f, "题干"),
            NodePart::Explanation => write!(f, "解析"),
            NodePart::Option { option_id } => write!(f, "选项[{}]", option_id),
            NodePart::BlankOption {
                blank_id,
                option_id,
            } => write!(f, "空({})-选项[{}]", blank_id, option_id),
        }
    }
}
