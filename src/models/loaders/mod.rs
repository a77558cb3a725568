pub mod json_loader;

pub use json_loader::{load_bank, save_bank, template_bank, write_template};
