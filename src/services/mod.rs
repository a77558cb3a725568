pub mod normalizer;
pub mod renderer;
pub mod warn_writer;

pub use normalizer::{normalize_node, normalize_question, Diagnostic};
pub use renderer::{CodePolicy, NodeOutcome, NodeRenderer, RenderStats};
pub use warn_writer::WarnWriter;
