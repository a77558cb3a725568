pub mod node_ctx;
pub mod render_flow;

pub use node_ctx::{NodeCtx, NodePart};
pub use render_flow::{strategy_for, QuestionFlow, RenderStrategy};
