use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlError {
    #[error("GlError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("GlError - NotFound: GL '{0}' not found")]
    NotFound(String),
    #[error("GlError - InvalidLayer: layer {0} is outside 1..=4")]
    InvalidLayer(i64),
    #[error("GlError - ParentNotFound: GL '{gl_num}' references parent '{parent}' at layer {layer}")]
    ParentNotFound {
        gl_num: String,
        parent: String,
        layer: i64,
    },
    #[error("GlError - DuplicateGl: GL '{0}' already exists")]
    DuplicateGl(String),
    #[error("GlError - Builder: {0}")]
    Builder(String),
}
