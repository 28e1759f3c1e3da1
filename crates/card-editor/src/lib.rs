pub mod commands;
pub mod editor;
pub mod input;
pub mod shortcuts;
pub mod snap;
pub mod sync;
pub mod tools;

pub use commands::{Command, CommandStack};
pub use editor::{DeleteRequest, EditorHost, LayoutEditor, NullHost};
pub use input::{InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use snap::{SnapResult, snap_position};
pub use sync::{ElementProp, LayoutMutation, SyncEngine};
pub use tools::SelectTool;
