//! 终端层：crossterm 着色输出；逐条问答（console）与列表/详情渲染（render）

pub mod console;
pub mod render;

pub use console::ConsolePrompter;
pub use render::{render_item_detail, render_item_line, render_items_json};
