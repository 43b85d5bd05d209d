use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProductError {
    #[error("ProductError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("ProductError - NotFound: sub-product '{0}' not found")]
    NotFound(String),
    #[error("ProductError - CustomerNotFound: customer '{0}' not found")]
    CustomerNotFound(i64),
    #[error("ProductError - GlNotLeaf: '{0}' is not a leaf GL")]
    GlNotLeaf(String),
    #[error("ProductError - DuplicateCode: sub-product code '{0}' already exists")]
    DuplicateCode(String),
    #[error("ProductError - Gl: {0}")]
    Gl(#[from] crate::gl::error::GlError),
}
