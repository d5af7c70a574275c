use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide interner backing every `NodeId`.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic counter for generated ids (`text_4`, `image_12`, ...).
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifier of a scene node. Unique within a scene.
///
/// Interned, so it is 4 bytes, `Copy`, and compares in O(1). Serializes as
/// the plain string so snapshots and templates stay readable.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh id carrying a variant prefix.
    pub fn generate(prefix: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Generate a fresh id derived from this one, used for duplicates.
    pub fn derived(&self) -> Self {
        let base = self.as_str();
        let stem = base.split("_copy").next().unwrap_or(base);
        Self::generate(&format!("{stem}_copy"))
    }

    /// Ids of the placeholders that accept a dropped image as fill.
    pub fn is_drop_placeholder(&self) -> bool {
        matches!(
            self.as_str(),
            "media-placeholder" | "image-placeholder" | "circle-placeholder"
        )
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_same_id() {
        let a = NodeId::intern("headline");
        let b = NodeId::intern("headline");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "headline");
    }

    #[test]
    fn generated_ids_never_repeat() {
        let a = NodeId::generate("text");
        let b = NodeId::generate("text");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("text_"));
    }

    #[test]
    fn derived_ids_do_not_stack_suffixes() {
        let first = NodeId::intern("cta_rect").derived();
        let second = first.derived();
        assert!(first.as_str().starts_with("cta_rect_copy_"));
        assert!(second.as_str().starts_with("cta_rect_copy_"));
        assert_ne!(first, second);
    }

    #[test]
    fn placeholder_ids() {
        assert!(NodeId::intern("image-placeholder").is_drop_placeholder());
        assert!(!NodeId::intern("bg").is_drop_placeholder());
    }
}
