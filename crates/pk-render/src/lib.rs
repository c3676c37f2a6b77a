pub mod clip;
pub mod draw;
pub mod hit;

pub use clip::{ClipCache, ClipPath, clip_path};
pub use draw::{DrawNode, draw_tree, paint_order};
pub use hit::{hit_test, hit_test_rect};
