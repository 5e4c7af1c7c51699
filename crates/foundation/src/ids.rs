use std::fmt;

/// Opaque vertex id.
///
/// Ids are caller-generated and unique within a dataset. Persisted datasets
/// may carry string or numeric ids; the codec normalizes both to strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(String);

impl VertexId {
    pub fn new(id: impl Into<String>) -> Self {
        VertexId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque feature id. The join key for selection, undo actions, and
/// rendering identity; assigned at creation and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        FeatureId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints fresh prefixed ids.
///
/// Deterministic within a session: `vx-1`, `vx-2`, ... Callers loading an
/// existing dataset must seed past any ids already in use via
/// [`IdAllocator::reserve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    prefix: &'static str,
    next: u64,
}

impl IdAllocator {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 1 }
    }

    pub fn mint(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }

    /// Skips the counter past `id` if it looks like one of ours, so reloaded
    /// datasets never collide with freshly minted ids.
    pub fn reserve(&mut self, id: &str) {
        let Some(rest) = id.strip_prefix(self.prefix) else {
            return;
        };
        let Some(n) = rest.strip_prefix('-').and_then(|s| s.parse::<u64>().ok()) else {
            return;
        };
        if n >= self.next {
            self.next = n + 1;
        }
    }
}
