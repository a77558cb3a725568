//! 题型结构表
//!
//! 每种题型对 `structure` 与 `validation.answer` 的要求，
//! 通过静态表查找，而不是为每个题型单独写一份修复脚本

use phf::phf_map;
use serde_json::{json, Map, Value};

use crate::models::question_kind::QuestionKind;

/// `structure` 下挂的子节点形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildLayout {
    /// `structure.options`，每个选项是一个 RichNode
    Options,
    /// `structure.blanks`，每个填空位是一个 RichNode
    Blanks,
    /// `structure.blanks[*].options`，填空位只是容器
    ClozeBlanks,
    /// 无子节点
    None,
}

impl ChildLayout {
    /// `structure` 中的字段名
    pub fn key(self) -> Option<&'static str> {
        match self {
            ChildLayout::Options => Some("options"),
            ChildLayout::Blanks | ChildLayout::ClozeBlanks => Some("blanks"),
            ChildLayout::None => None,
        }
    }
}

/// `validation.answer` 的形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerShape {
    /// 字符串，缺失时补 `""`，存在时不做转换
    Text,
    /// 列表，类型不符时重置为 `[]`
    List,
    /// `{blank_id: [可接受答案]}`，类型不符时重置为 `{}`
    Mapping,
}

impl AnswerShape {
    pub fn default_value(self) -> Value {
        match self {
            AnswerShape::Text => json!(""),
            AnswerShape::List => json!([]),
            AnswerShape::Mapping => json!({}),
        }
    }

    /// 当前值是否满足形态要求
    pub fn matches(self, value: &Value) -> bool {
        match self {
            AnswerShape::Text => true,
            AnswerShape::List => value.is_array(),
            AnswerShape::Mapping => value.is_object(),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            AnswerShape::Text => "字符串",
            AnswerShape::List => "列表 []",
            AnswerShape::Mapping => "字典 {}",
        }
    }
}

/// 单个题型的结构要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSchema {
    pub kind: QuestionKind,
    pub default_layout: Option<&'static str>,
    pub children: ChildLayout,
    pub answer: AnswerShape,
}

impl QuestionSchema {
    /// `structure` 缺失或损坏时使用的默认值
    pub fn default_structure(&self) -> Value {
        let mut structure = Map::new();
        if let Some(layout) = self.default_layout {
            structure.insert("layout".to_string(), json!(layout));
        }
        if let Some(key) = self.children.key() {
            structure.insert(key.to_string(), json!([]));
        }
        Value::Object(structure)
    }

    /// `validation` 缺失或损坏时使用的默认值
    pub fn default_validation(&self) -> Value {
        json!({
            "answer": self.answer.default_value(),
            "explanation": {},
        })
    }
}

static SCHEMAS: phf::Map<&'static str, QuestionSchema> = phf_map! {
    "single_choice" => QuestionSchema {
        kind: QuestionKind::SingleChoice,
        default_layout: Some("vertical"),
        children: ChildLayout::Options,
        answer: AnswerShape::Text,
    },
    "multiple_choice" => QuestionSchema {
        kind: QuestionKind::MultipleChoice,
        default_layout: Some("vertical"),
        children: ChildLayout::Options,
        answer: AnswerShape::List,
    },
    "true_false" => QuestionSchema {
        kind: QuestionKind::TrueFalse,
        default_layout: Some("horizontal"),
        children: ChildLayout::Options,
        answer: AnswerShape::Text,
    },
    "fill_blank" => QuestionSchema {
        kind: QuestionKind::FillBlank,
        default_layout: None,
        children: ChildLayout::Blanks,
        answer: AnswerShape::Mapping,
    },
    "short_answer" => QuestionSchema {
        kind: QuestionKind::ShortAnswer,
        default_layout: Some("free_text"),
        children: ChildLayout::None,
        answer: AnswerShape::Text,
    },
    "cloze" => QuestionSchema {
        kind: QuestionKind::Cloze,
        default_layout: None,
        children: ChildLayout::ClozeBlanks,
        answer: AnswerShape::Text,
    },
};

/// 按 `type` 字段查找结构要求
pub fn schema_for(type_name: &str) -> Option<&'static QuestionSchema> {
    SCHEMAS.get(type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_schema() {
        for kind in QuestionKind::ALL {
            let schema = schema_for(kind.as_str()).expect("schema missing");
            assert_eq!(schema.kind, kind);
        }
        assert!(schema_for("essay").is_none());
    }

    #[test]
    fn test_default_structures() {
        assert_eq!(
            schema_for("single_choice").unwrap().default_structure(),
            json!({"layout": "vertical", "options": []})
        );
        assert_eq!(
            schema_for("true_false").unwrap().default_structure(),
            json!({"layout": "horizontal", "options": []})
        );
        assert_eq!(
            schema_for("fill_blank").unwrap().default_structure(),
            json!({"blanks": []})
        );
        assert_eq!(
            schema_for("short_answer").unwrap().default_structure(),
            json!({"layout": "free_text"})
        );
    }

    #[test]
    fn test_answer_shapes() {
        assert!(AnswerShape::List.matches(&json!(["A"])));
        assert!(!AnswerShape::List.matches(&json!("A")));
        assert!(!AnswerShape::Mapping.matches(&Value::Null));
        assert!(AnswerShape::Text.matches(&json!({"b1": ["x"]})));
        assert_eq!(
            schema_for("multiple_choice").unwrap().default_validation(),
            json!({"answer": [], "explanation": {}})
        );
    }
}
