pub mod display;
pub mod hit;
pub mod paint;

pub use display::{DisplayList, DrawItem, DrawShape, build_display_list, node_affine};
pub use hit::hit_test;
pub use kurbo::Affine;
pub use paint::paint_display_list;
