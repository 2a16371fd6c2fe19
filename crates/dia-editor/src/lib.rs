pub mod commands;
pub mod config;
pub mod editor;
pub mod input;
pub mod text_focus;
pub mod tools;

pub use commands::{Command, CommandStack};
pub use config::EditorConfig;
pub use editor::Editor;
pub use input::InputEvent;
pub use text_focus::TextFocus;
pub use tools::{DragController, DragState};
