/// Convenience result type used across the scene graph.
pub type SceneResult<T> = Result<T, SceneError>;

/// Top-level error taxonomy used by scene graph APIs.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// A field key that is not a string reached the node field API.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A value could not be converted into the requested shape.
    #[error("malformed value: {0}")]
    MalformedValue(String),

    /// A node handle refers to a disposed (or reused) arena slot.
    #[error("stale node: {0}")]
    StaleNode(String),

    /// A tree mutation would break the single-owner invariant.
    #[error("tree error: {0}")]
    Tree(String),

    /// An observer callback raised a domain error.
    #[error("callback error: {0}")]
    Callback(String),

    /// Invalid user-provided configuration or scene description.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SceneError {
    /// Build a [`SceneError::InvalidKey`] value.
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    /// Build a [`SceneError::MalformedValue`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedValue(msg.into())
    }

    /// Build a [`SceneError::StaleNode`] value.
    pub fn stale(msg: impl Into<String>) -> Self {
        Self::StaleNode(msg.into())
    }

    /// Build a [`SceneError::Tree`] value.
    pub fn tree(msg: impl Into<String>) -> Self {
        Self::Tree(msg.into())
    }

    /// Build a [`SceneError::Callback`] value.
    pub fn callback(msg: impl Into<String>) -> Self {
        Self::Callback(msg.into())
    }

    /// Build a [`SceneError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
