//! 题目绘图流程 - 流程层
//!
//! 核心职责：按题型决定一道题里有哪些节点需要交给绘图服务
//!
//! - 选择类（单选、多选、判断）：题干 + 解析 + `structure.options`
//! - 完形填空：题干 + 解析 + `structure.blanks[*].options`
//! - 基础类（简答、填空）：题干 + 解析

use phf::phf_map;
use serde_json::Value;
use tracing::warn;

use crate::infrastructure::PlotBackend;
use crate::models::rich_node::display_id;
use crate::services::renderer::{NodeRenderer, RenderStats};
use crate::workflow::node_ctx::{NodeCtx, NodePart};

/// 绘图策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    ChoiceStyle,
    Cloze,
    Basic,
}

static STRATEGIES: phf::Map<&'static str, RenderStrategy> = phf_map! {
    "single_choice" => RenderStrategy::ChoiceStyle,
    "multiple_choice" => RenderStrategy::ChoiceStyle,
    "true_false" => RenderStrategy::ChoiceStyle,
    "short_answer" => RenderStrategy::Basic,
    "fill_blank" => RenderStrategy::Basic,
    "cloze" => RenderStrategy::Cloze,
};

/// 按 `type` 字段查找绘图策略
pub fn strategy_for(type_name: &str) -> Option<RenderStrategy> {
    STRATEGIES.get(type_name).copied()
}

/// 题目绘图流程
///
/// - 只决定"处理哪些节点"
/// - 节点本身的判断与回写交给 NodeRenderer
pub struct QuestionFlow<B> {
    renderer: NodeRenderer<B>,
}

impl<B: PlotBackend> QuestionFlow<B> {
    /// 创建新的题目绘图流程
    pub fn new(renderer: NodeRenderer<B>) -> Self {
        Self { renderer }
    }

    /// 处理一道题，返回本题的节点统计
    pub async fn render_question(&self, question: &mut Value) -> RenderStats {
        let id = display_id(question);
        let type_name = question
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let strategy = strategy_for(&type_name).unwrap_or_else(|| {
            warn!(
                "⚠️ 未知的题目类型: {}, 仅处理通用部分(题干/解析)",
                type_name
            );
            RenderStrategy::Basic
        });

        let mut stats = self.render_common(question, &id).await;

        match strategy {
            RenderStrategy::ChoiceStyle => stats.merge(self.render_options(question, &id).await),
            RenderStrategy::Cloze => stats.merge(self.render_blank_options(question, &id).await),
            RenderStrategy::Basic => {}
        }

        stats
    }

    /// 题干与解析
    async fn render_common(&self, question: &mut Value, id: &str) -> RenderStats {
        let mut stats = RenderStats::default();

        if let Some(content) = question.get_mut("content") {
            let label = NodeCtx::new(id, NodePart::Content).to_string();
            stats.record(self.renderer.render_node(content, &label).await);
        }

        if let Some(explanation) = question.pointer_mut("/validation/explanation") {
            let label = NodeCtx::new(id, NodePart::Explanation).to_string();
            stats.record(self.renderer.render_node(explanation, &label).await);
        }

        stats
    }

    async fn render_options(&self, question: &mut Value, id: &str) -> RenderStats {
        let mut stats = RenderStats::default();

        let Some(options) = question
            .pointer_mut("/structure/options")
            .and_then(Value::as_array_mut)
        else {
            return stats;
        };

        for option in options.iter_mut() {
            let part = NodePart::Option {
                option_id: display_id(option),
            };
            let label = NodeCtx::new(id, part).to_string();
            stats.record(self.renderer.render_node(option, &label).await);
        }

        stats
    }

    async fn render_blank_options(&self, question: &mut Value, id: &str) -> RenderStats {
        let mut stats = RenderStats::default();

        let Some(blanks) = question
            .pointer_mut("/structure/blanks")
            .and_then(Value::as_array_mut)
        else {
            return stats;
        };

        for blank in blanks.iter_mut() {
            let blank_id = display_id(blank);
            let Some(options) = blank.get_mut("options").and_then(Value::as_array_mut) else {
                continue;
            };

            for option in options.iter_mut() {
                let part = NodePart::BlankOption {
                    blank_id: blank_id.clone(),
                    option_id: display_id(option),
                };
                let label = NodeCtx::new(id, part).to_string();
                stats.record(self.renderer.render_node(option, &label).await);
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::infrastructure::PNG_SIGNATURE;
    use crate::models::QuestionKind;
    use crate::services::renderer::CodePolicy;
    use serde_json::json;

    struct AlwaysPng;

    impl PlotBackend for AlwaysPng {
        async fn render_png(&self, _code: &str) -> Result<Vec<u8>, RenderError> {
            Ok(PNG_SIGNATURE.to_vec())
        }
    }

    fn flow() -> QuestionFlow<AlwaysPng> {
        QuestionFlow::new(NodeRenderer::new(AlwaysPng, CodePolicy::Clear))
    }

    fn plot_node() -> Value {
        json!({"has_image": true, "image": null, "code": "plt.plot([1])"})
    }

    #[test]
    fn test_every_kind_has_strategy() {
        for kind in QuestionKind::ALL {
            assert!(strategy_for(kind.as_str()).is_some(), "{}", kind);
        }
        assert_eq!(strategy_for("true_false"), Some(RenderStrategy::ChoiceStyle));
        assert_eq!(strategy_for("essay"), None);
    }

    #[tokio::test]
    async fn test_choice_style_renders_options() {
        let mut q = json!({
            "id": "Q1",
            "type": "multiple_choice",
            "content": plot_node(),
            "structure": {"options": [plot_node(), {"id": "B", "text": "b"}]},
            "validation": {"explanation": plot_node()}
        });

        let stats = flow().render_question(&mut q).await;

        assert_eq!(stats.rendered, 3);
        assert_eq!(stats.skipped, 1);
        assert!(q["structure"]["options"][0]["image"].is_string());
        assert!(q["validation"]["explanation"]["image"].is_string());
    }

    #[tokio::test]
    async fn test_cloze_renders_blank_options() {
        let mut q = json!({
            "id": "C1",
            "type": "cloze",
            "structure": {"blanks": [{"options": [{"id": "1", "has_image": true, "code": "plt.bar([1],[2])"}]}]}
        });

        let stats = flow().render_question(&mut q).await;

        let option = &q["structure"]["blanks"][0]["options"][0];
        assert_eq!(stats.rendered, 1);
        assert!(option["image"].as_str().unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(option["code"], Value::Null);
    }

    #[tokio::test]
    async fn test_basic_ignores_nested_structures() {
        let mut q = json!({
            "id": "S1",
            "type": "short_answer",
            "content": {"text": "简答"},
            "structure": {"options": [plot_node()]}
        });

        let stats = flow().render_question(&mut q).await;

        assert_eq!(stats.rendered, 0);
        assert_eq!(q["structure"]["options"][0]["image"], Value::Null);
    }

    #[tokio::test]
    async fn test_unknown_type_renders_common_parts_only() {
        let mut q = json!({
            "id": "X1",
            "type": "essay",
            "content": plot_node(),
            "structure": {"options": [plot_node()]}
        });

        let stats = flow().render_question(&mut q).await;

        assert_eq!(stats.rendered, 1);
        assert!(q["content"]["image"].is_string());
        assert_eq!(q["structure"]["options"][0]["image"], Value::Null);
    }
}
