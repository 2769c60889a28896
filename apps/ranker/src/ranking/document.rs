use bytes::Bytes;

/// A named blob of raw document bytes, immutable for the duration of a ranking run.
///
/// `name` is the identifier that appears in the report; callers are expected to
/// have made it unique and filesystem-safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub content: Bytes,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}
