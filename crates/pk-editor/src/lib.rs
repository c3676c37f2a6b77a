pub mod clipping;
pub mod layers;
pub mod session;
pub mod store;

pub use layers::{LayerDrop, LayerNode, layer_tree, reorder_layer};
pub use session::EditorSession;
pub use store::{ElementMutation, ElementStore};
