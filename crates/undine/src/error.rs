use crate::layers::LayerState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] undine_core::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("no active layer")]
    NoLayer,

    #[error("no node named `{0}` in the current layer")]
    UnknownNode(String),

    #[error("no group `{0}` in the current layer")]
    UnknownGroup(String),

    #[error("layer `{id}`: invalid state transition {from:?} -> {to:?}")]
    InvalidLayerTransition {
        id: String,
        from: LayerState,
        to: LayerState,
    },

    #[error("layer `{0}` is no longer on the stack")]
    StaleLayer(String),
}
