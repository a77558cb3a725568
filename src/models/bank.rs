use serde_json::Value;

/// 文件根节点形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootShape {
    /// `[ {...}, {...} ]`
    Array,
    /// 单个题目对象，处理时包装成单元素列表，写回时还原
    Single,
}

/// 已加载的题库
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub questions: Vec<Value>,
    pub root: RootShape,
}

impl QuestionBank {
    /// 从 JSON 根节点构建，非数组/对象返回实际类型名
    pub fn from_root(root: Value) -> Result<Self, &'static str> {
        match root {
            Value::Array(questions) => Ok(Self {
                questions,
                root: RootShape::Array,
            }),
            Value::Object(_) => Ok(Self {
                questions: vec![root],
                root: RootShape::Single,
            }),
            Value::Null => Err("null"),
            Value::Bool(_) => Err("布尔值"),
            Value::Number(_) => Err("数字"),
            Value::String(_) => Err("字符串"),
        }
    }

    /// 还原为写回文件的根节点
    pub fn to_root(&self) -> Value {
        match (self.root, self.questions.as_slice()) {
            (RootShape::Single, [only]) => only.clone(),
            _ => Value::Array(self.questions.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
