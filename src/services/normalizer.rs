//! 字段补全服务 - 业务能力层
//!
//! 只负责"把一道题补全成标准形态"，不关心文件和批量流程。
//! 所有检查都是"存在/形态"检查，重复执行不会改变已标准化的数据。

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::rich_node::{self, NodeRole, DEBUG_MSG, NULLABLE_FIELDS, TEXT};
use crate::models::schema::{AnswerShape, ChildLayout, QuestionSchema};

const ANSWER: &str = "answer";
const EXPLANATION: &str = "explanation";
const LAYOUT: &str = "layout";

/// 一条修正记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub question_id: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(question_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID {} {}", self.question_id, self.message)
    }
}

/// 补全单个字段
///
/// - 字段不存在：写入默认值
/// - `code` / `image` 为空字符串：改为 null
/// - 其他情况保持原样
pub fn ensure_field(node: &mut Map<String, Value>, field: &str, default: Value) {
    match node.get_mut(field) {
        None => {
            node.insert(field.to_string(), default);
        }
        Some(value) => {
            if NULLABLE_FIELDS.contains(&field) && value.as_str() == Some("") {
                *value = Value::Null;
            }
        }
    }
}

/// 原地补全一个 RichNode，非对象节点直接忽略
pub fn normalize_node(node: &mut Value, role: NodeRole) {
    let Some(map) = node.as_object_mut() else {
        return;
    };

    for (field, default) in rich_node::base_fields() {
        ensure_field(map, field, default);
    }

    if !map.contains_key(TEXT) {
        map.insert(TEXT.to_string(), json!(""));
    }

    if role == NodeRole::Content {
        ensure_field(map, DEBUG_MSG, Value::Null);
    }
}

/// 按题型结构表补全一道题，返回本次做出的形态修正
pub fn normalize_question(question: &mut Value, schema: &QuestionSchema) -> Vec<Diagnostic> {
    let id = rich_node::display_id(question);
    let mut diagnostics = Vec::new();

    let Some(q) = question.as_object_mut() else {
        return diagnostics;
    };

    normalize_header(q);
    normalize_node(object_slot(q, "content", || json!({})), NodeRole::Content);
    normalize_structure(q, schema, &id, &mut diagnostics);
    normalize_validation(q, schema, &id, &mut diagnostics);

    diagnostics
}

/// 找出重复的题目 ID（按首次出现顺序）
pub fn find_duplicate_ids(questions: &[Value]) -> Vec<(String, usize)> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    let mut order = Vec::new();

    for id in questions
        .iter()
        .filter_map(|q| q.get("id").and_then(Value::as_str))
    {
        let count = seen.entry(id).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(id);
        }
    }

    order
        .into_iter()
        .map(|id| (id.to_string(), seen[id]))
        .collect()
}

fn normalize_header(q: &mut Map<String, Value>) {
    ensure_field(q, "subject", json!(""));

    match q.get_mut("meta") {
        Some(Value::Object(meta)) => fill_meta(meta),
        Some(_) => {}
        None => {
            let mut meta = Map::new();
            fill_meta(&mut meta);
            q.insert("meta".to_string(), Value::Object(meta));
        }
    }
}

fn fill_meta(meta: &mut Map<String, Value>) {
    ensure_field(meta, "chapter", json!(""));
    ensure_field(meta, "difficulty", json!(""));
    ensure_field(meta, "score", json!(0));
}

fn normalize_structure(
    q: &mut Map<String, Value>,
    schema: &QuestionSchema,
    id: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(structure) = object_slot(q, "structure", || schema.default_structure()).as_object_mut()
    else {
        return;
    };

    if let Some(layout) = schema.default_layout {
        if !structure.contains_key(LAYOUT) {
            structure.insert(LAYOUT.to_string(), json!(layout));
        }
    }

    let Some(key) = schema.children.key() else {
        return;
    };

    match structure.get_mut(key) {
        Some(Value::Array(children)) => {
            for child in children.iter_mut() {
                normalize_child(child, schema.children, id, diagnostics);
            }
            return;
        }
        Some(other) => diagnostics.push(Diagnostic::new(
            id,
            format!("的 {} 格式错误（{}），已重置为 []", key, type_name(other)),
        )),
        None => diagnostics.push(Diagnostic::new(id, format!("缺少 {}，已补全为 []", key))),
    }

    structure.insert(key.to_string(), json!([]));
}

fn normalize_child(
    child: &mut Value,
    layout: ChildLayout,
    id: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if layout != ChildLayout::ClozeBlanks {
        normalize_node(child, NodeRole::Child);
        return;
    }

    // 完形填空：填空位只是容器，选项才是 RichNode
    let blank_id = rich_node::display_id(child);
    let Some(blank) = child.as_object_mut() else {
        return;
    };

    let found = match blank.get_mut("options") {
        Some(Value::Array(options)) => {
            for option in options.iter_mut() {
                normalize_node(option, NodeRole::Child);
            }
            return;
        }
        Some(other) => Some(type_name(other)),
        None => None,
    };

    if let Some(found) = found {
        diagnostics.push(Diagnostic::new(
            id,
            format!("的空({}) options 格式错误（{}），已重置为 []", blank_id, found),
        ));
    }
    blank.insert("options".to_string(), json!([]));
}

fn normalize_validation(
    q: &mut Map<String, Value>,
    schema: &QuestionSchema,
    id: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(validation) =
        object_slot(q, "validation", || schema.default_validation()).as_object_mut()
    else {
        return;
    };

    let mismatch = match validation.get(ANSWER) {
        Some(answer) if schema.answer.matches(answer) => None,
        Some(answer) => Some(type_name(answer)),
        None => Some("缺失"),
    };

    if let Some(found) = mismatch {
        if schema.answer != AnswerShape::Text {
            diagnostics.push(Diagnostic::new(
                id,
                format!(
                    "的 answer 类型错误（{}），重置为{}",
                    found,
                    schema.answer.describe()
                ),
            ));
        }
        validation.insert(ANSWER.to_string(), schema.answer.default_value());
    }

    normalize_node(
        object_slot(validation, EXPLANATION, || json!({})),
        NodeRole::Content,
    );
}

/// 取出必须为对象的字段，缺失或类型不符时用默认值替换
fn object_slot<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    default: impl FnOnce() -> Value,
) -> &'a mut Value {
    let slot = parent.entry(key.to_string()).or_insert(Value::Null);
    if !slot.is_object() {
        *slot = default();
    }
    slot
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "布尔值",
        Value::Number(_) => "数字",
        Value::String(_) => "字符串",
        Value::Array(_) => "列表",
        Value::Object(_) => "字典",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schema::schema_for;

    const NODE_FIELDS: [&str; 6] = [
        "code",
        "code_error",
        "code_run_count",
        "has_image",
        "image",
        "text",
    ];

    fn normalize(mut question: Value) -> (Value, Vec<Diagnostic>) {
        let type_name = question["type"].as_str().unwrap().to_string();
        let schema = schema_for(&type_name).unwrap();
        let diagnostics = normalize_question(&mut question, schema);
        (question, diagnostics)
    }

    fn assert_node_complete(node: &Value, with_debug: bool) {
        for field in NODE_FIELDS {
            assert!(node.get(field).is_some(), "缺少字段 {} in {}", field, node);
        }
        assert_eq!(node.get("debug_msg").is_some(), with_debug, "{}", node);
    }

    #[test]
    fn test_ensure_field_fills_and_cleans() {
        let mut node = json!({"code": "", "image": "", "text": ""})
            .as_object()
            .cloned()
            .unwrap();
        ensure_field(&mut node, "code", Value::Null);
        ensure_field(&mut node, "image", Value::Null);
        ensure_field(&mut node, "text", json!("x"));
        ensure_field(&mut node, "has_image", json!(false));

        assert_eq!(node["code"], Value::Null);
        assert_eq!(node["image"], Value::Null);
        assert_eq!(node["text"], "");
        assert_eq!(node["has_image"], false);
    }

    #[test]
    fn test_ensure_field_does_not_coerce_other_values() {
        let mut node = json!({"code_error": "yes", "code": 3})
            .as_object()
            .cloned()
            .unwrap();
        ensure_field(&mut node, "code_error", json!(false));
        ensure_field(&mut node, "code", Value::Null);
        assert_eq!(node["code_error"], "yes");
        assert_eq!(node["code"], 3);
    }

    #[test]
    fn test_single_choice_option_gets_defaults_and_layout() {
        let (q, diagnostics) = normalize(json!({
            "id": "Q1",
            "type": "single_choice",
            "structure": {"options": [{"id": "A", "text": "x"}]}
        }));

        assert!(diagnostics.is_empty());
        assert_eq!(q["structure"]["layout"], "vertical");
        let option = &q["structure"]["options"][0];
        assert_node_complete(option, false);
        assert_eq!(option["text"], "x");
        assert_node_complete(&q["content"], true);
        assert_node_complete(&q["validation"]["explanation"], true);
        assert_eq!(q["validation"]["answer"], "");
        assert_eq!(q["subject"], "");
        assert_eq!(q["meta"], json!({"chapter": "", "difficulty": "", "score": 0}));
    }

    #[test]
    fn test_fill_blank_answer_reset_to_mapping() {
        for bad in [json!("b1"), Value::Null, json!(["x"])] {
            let (q, diagnostics) = normalize(json!({
                "id": "F1",
                "type": "fill_blank",
                "structure": {"blanks": [{"id": "b1", "placeholder": "?"}]},
                "validation": {"answer": bad}
            }));
            assert_eq!(q["validation"]["answer"], json!({}));
            assert_eq!(diagnostics.len(), 1);
            assert_node_complete(&q["structure"]["blanks"][0], false);
            assert_eq!(q["structure"]["blanks"][0]["placeholder"], "?");
        }
    }

    #[test]
    fn test_fill_blank_valid_answer_kept() {
        let (q, diagnostics) = normalize(json!({
            "id": "F2",
            "type": "fill_blank",
            "structure": {"blanks": []},
            "validation": {"answer": {"b1": ["3", "三"]}}
        }));
        assert!(diagnostics.is_empty());
        assert_eq!(q["validation"]["answer"], json!({"b1": ["3", "三"]}));
    }

    #[test]
    fn test_multiple_choice_answer_reset_to_list() {
        let (q, diagnostics) = normalize(json!({
            "id": "M1",
            "type": "multiple_choice",
            "structure": {"options": []},
            "validation": {"answer": "AB", "explanation": {"text": "因为"}}
        }));
        assert_eq!(q["validation"]["answer"], json!([]));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].to_string().starts_with("ID M1"));
        assert_eq!(q["validation"]["explanation"]["text"], "因为");
    }

    #[test]
    fn test_short_answer_text_answer_is_not_coerced() {
        let (q, _) = normalize(json!({
            "id": "S1",
            "type": "short_answer",
            "validation": {"answer": ["not", "a", "string"]}
        }));
        assert_eq!(q["validation"]["answer"], json!(["not", "a", "string"]));
        assert_eq!(q["structure"], json!({"layout": "free_text"}));

        let (q, _) = normalize(json!({"id": "S2", "type": "short_answer", "validation": {}}));
        assert_eq!(q["validation"]["answer"], "");
    }

    #[test]
    fn test_true_false_without_options_gets_empty_list() {
        let (q, diagnostics) = normalize(json!({
            "id": "T1",
            "type": "true_false",
            "structure": {"options": "TF"}
        }));
        assert_eq!(q["structure"]["options"], json!([]));
        assert_eq!(q["structure"]["layout"], "horizontal");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_cloze_blank_options_are_normalized() {
        let (q, _) = normalize(json!({
            "id": "C1",
            "type": "cloze",
            "structure": {"blanks": [
                {"id": "1", "options": [{"id": "A", "text": "go"}]},
                {"id": "2"}
            ]}
        }));
        let blanks = &q["structure"]["blanks"];
        assert_node_complete(&blanks[0]["options"][0], false);
        assert_eq!(blanks[1]["options"], json!([]));
        assert!(blanks[0].get("code").is_none());
    }

    #[test]
    fn test_malformed_sections_are_replaced() {
        let (q, _) = normalize(json!({
            "id": "Q9",
            "type": "single_choice",
            "content": "not a node",
            "structure": 5,
            "validation": []
        }));
        assert_node_complete(&q["content"], true);
        assert_eq!(q["structure"]["options"], json!([]));
        assert_eq!(q["validation"]["answer"], "");
        assert_node_complete(&q["validation"]["explanation"], true);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            json!({"id": "A", "type": "single_choice", "content": {"code": "", "image": ""}}),
            json!({"id": "B", "type": "multiple_choice", "validation": {"answer": 1}}),
            json!({"id": "C", "type": "fill_blank", "structure": {"blanks": [{}]}}),
            json!({"id": "D", "type": "cloze", "structure": {"blanks": [{"options": 1}]}}),
            json!({"id": "E", "type": "short_answer", "meta": {"score": 5}}),
            json!({"id": "F", "type": "true_false", "structure": []}),
        ];

        for input in inputs {
            let (once, _) = normalize(input);
            let (twice, diagnostics) = normalize(once.clone());
            assert_eq!(once, twice);
            assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        }
    }

    #[test]
    fn test_find_duplicate_ids() {
        let questions = vec![
            json!({"id": "Q1"}),
            json!({"id": "Q2"}),
            json!({"id": "Q1"}),
            json!({"id": "Q1"}),
            json!({"type": "cloze"}),
        ];
        assert_eq!(find_duplicate_ids(&questions), vec![("Q1".to_string(), 3)]);
    }
}
