use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for element keys. Layouts reuse the same
/// handful of keys (`groom`, `bride`, `photo`, ...) across every template.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// The JSON key of the canvas record. Never an element.
pub const CANVAS_KEY: &str = "baseSize";

/// The reserved full-bleed backdrop key.
pub const BACKGROUND_KEY: &str = "background";

/// Interned key of a layout element (`groom`, `photo`, `decoration2`).
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(Spur);

impl ElementKey {
    /// Intern a key, or return the existing handle if already interned.
    pub fn intern(s: &str) -> Self {
        ElementKey(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }

    /// The reserved `background` key.
    pub fn background() -> Self {
        Self::intern(BACKGROUND_KEY)
    }

    pub fn is_background(&self) -> bool {
        self.as_str() == BACKGROUND_KEY
    }

    /// Generate a key not present in `taken`, e.g. `decoration3`.
    pub fn unique_with_prefix(prefix: &str, taken: impl Fn(ElementKey) -> bool) -> Self {
        let base = Self::intern(prefix);
        if !taken(base) {
            return base;
        }
        let mut n = 2u32;
        loop {
            let candidate = Self::intern(&format!("{prefix}{n}"));
            if !taken(candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl fmt::Debug for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementKey::intern(&s))
    }
}
