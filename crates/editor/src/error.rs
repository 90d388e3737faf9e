use spe_core::{EntityRef, SpeError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Core(#[from] SpeError),
    #[error("nothing is selected")]
    NothingSelected,
    #[error("{0} is not an account")]
    NotAnAccount(EntityRef),
}
