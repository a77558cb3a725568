pub mod bank;
pub mod loaders;
pub mod question_kind;
pub mod rich_node;
pub mod schema;

pub use bank::{QuestionBank, RootShape};
pub use loaders::{load_bank, save_bank, write_template};
pub use question_kind::QuestionKind;
pub use rich_node::NodeRole;
pub use schema::{schema_for, AnswerShape, ChildLayout, QuestionSchema};
