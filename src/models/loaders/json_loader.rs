use crate::error::{AppError, AppResult, FileError};
use crate::models::bank::QuestionBank;
use serde_json::{json, Value};
use std::path::Path;
use tokio::fs;

/// 从 JSON 文件加载题库
///
/// 根节点可以是数组，也可以是单个题目对象
pub async fn load_bank(path: &Path) -> AppResult<QuestionBank> {
    let path_str = path.display().to_string();

    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(AppError::file_not_found(path_str));
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path_str.as_str(), e))?;

    let root: Value = serde_json::from_str(&content)
        .map_err(|e| AppError::json_parse_failed(path_str.as_str(), e))?;

    let bank = QuestionBank::from_root(root).map_err(|found| FileError::RootShapeInvalid {
        path: path_str.clone(),
        found,
    })?;

    tracing::info!("📂 已读取 {} 道题目: {}", bank.len(), path_str);
    Ok(bank)
}

/// 将题库写回文件（两空格缩进，保留非 ASCII 字符）
pub async fn save_bank(bank: &QuestionBank, path: &Path) -> AppResult<()> {
    write_json(&bank.to_root(), path).await
}

/// 输入文件不存在时生成的示例数据
pub fn template_bank() -> Value {
    json!([{
        "id": "TEST-NEW-FIELD",
        "type": "single_choice",
        "content": { "text": "测试题目", "code": "print('hello')" },
        "structure": { "options": [{ "id": "A", "text": "A" }] }
    }])
}

/// 写出示例数据文件
pub async fn write_template(path: &Path) -> AppResult<()> {
    write_json(&template_bank(), path).await
}

async fn write_json(root: &Value, path: &Path) -> AppResult<()> {
    let path_str = path.display().to_string();
    let text = serde_json::to_string_pretty(root)
        .map_err(|e| AppError::json_parse_failed(path_str.as_str(), e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_write_failed(path_str.as_str(), e))?;
    }

    fs::write(path, text)
        .await
        .map_err(|e| AppError::file_write_failed(path_str, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bank::RootShape;

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_bank(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[{\"id\": ").unwrap();

        let err = load_bank(&path).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::File(FileError::JsonParseFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_wrong_root_shape_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("num.json");
        std::fs::write(&path, "42").unwrap();

        let err = load_bank(&path).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::File(FileError::RootShapeInvalid { found: "数字", .. })
        ));
    }

    #[tokio::test]
    async fn test_output_is_pretty_and_keeps_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let bank = QuestionBank {
            questions: vec![json!({"id": "Q1", "subject": "数学"})],
            root: RootShape::Array,
        };

        save_bank(&bank, &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"subject\": \"数学\""));
        assert!(text.starts_with("[\n  {\n    \"id\""));
    }

    #[tokio::test]
    async fn test_single_object_round_trips_as_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("single.json");
        std::fs::write(&path, r#"{"id": "Q1", "type": "true_false"}"#).unwrap();

        let bank = load_bank(&path).await.unwrap();
        assert_eq!(bank.root, RootShape::Single);
        save_bank(&bank, &path).await.unwrap();

        let reloaded: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(reloaded.is_object());
    }

    #[tokio::test]
    async fn test_template_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("questions.json");
        write_template(&path).await.unwrap();

        let bank = load_bank(&path).await.unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.questions[0]["type"], "single_choice");
    }
}
