pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;
pub mod scene;
pub mod snapshot;
pub mod template;

pub use animation::{AnimationHandle, AnimationKind, AnimationPlan, Easing, Pose};
pub use color::{Color, parse_css_color};
pub use config::EditorConfig;
pub use error::EditorError;
pub use geometry::{Bounds, Viewport, fit_contain, fit_shrink};
pub use id::NodeId;
pub use model::*;
pub use scene::SceneGraph;
pub use snapshot::{SceneSnapshot, Snapshot};
pub use template::{NodeDescriptor, Template, Variant};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
