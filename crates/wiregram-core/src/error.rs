//! Error types for scene operations.

use thiserror::Error;

use crate::scene::ElementId;

/// Scene errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("Control point {index} not found on element {element}")]
    ControlPointNotFound { element: ElementId, index: usize },
    #[error("Socket {index} not found on element {element}")]
    SocketNotFound { element: ElementId, index: usize },
    #[error("Element is not a container: {0}")]
    NotAContainer(ElementId),
    #[error("Operation not allowed on the root container")]
    RootElement,
    #[error("Nothing to group")]
    EmptyGroup,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
