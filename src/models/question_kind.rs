use serde::{Deserialize, Serialize};

/// 题型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// 单选
    SingleChoice,
    /// 多选
    MultipleChoice,
    /// 判断
    TrueFalse,
    /// 填空
    FillBlank,
    /// 简答
    ShortAnswer,
    /// 完形填空
    Cloze,
}

impl QuestionKind {
    /// 全部题型
    pub const ALL: [QuestionKind; 6] = [
        QuestionKind::SingleChoice,
        QuestionKind::MultipleChoice,
        QuestionKind::TrueFalse,
        QuestionKind::FillBlank,
        QuestionKind::ShortAnswer,
        QuestionKind::Cloze,
    ];

    /// JSON 中 `type` 字段的取值
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::SingleChoice => "single_choice",
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::TrueFalse => "true_false",
            QuestionKind::FillBlank => "fill_blank",
            QuestionKind::ShortAnswer => "short_answer",
            QuestionKind::Cloze => "cloze",
        }
    }

    /// 中文名称（日志用）
    pub fn name(self) -> &'static str {
        match self {
            QuestionKind::SingleChoice => "单选题",
            QuestionKind::MultipleChoice => "多选题",
            QuestionKind::TrueFalse => "判断题",
            QuestionKind::FillBlank => "填空题",
            QuestionKind::ShortAnswer => "简答题",
            QuestionKind::Cloze => "完形填空",
        }
    }
}

impl std::str::FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("未知的题目类型: {}", s))
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
