pub mod animator;
pub mod context;
pub mod export;
pub mod history;
pub mod input;
pub mod loader;
pub mod media;
pub mod selection;
pub mod shortcuts;
pub mod text_edit;

pub use animator::AnimationRunner;
pub use context::{EditorContext, EditorEvent, SharedEditor};
pub use export::{ExportedImage, Rasterizer};
pub use history::HistoryStore;
pub use input::{InputEvent, InteractionProfile, Modifiers};
pub use loader::{ImageDecoder, LoadReport, load_builtin, load_template};
pub use media::{MediaBackend, MediaElement, MediaOverlay, MediaRegistry, add_video};
pub use selection::{NullPanel, PanelDescription, PropertyPanel, Selection};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use text_edit::TextEditSession;
