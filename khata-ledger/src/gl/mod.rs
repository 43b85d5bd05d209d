//! Chart of accounts. Read-only during ledger operation; classification of
//! a GL code is a pure function of its prefix.

pub mod error;

mod entity;
mod repo;

use sqlx::SqlitePool;
use tracing::instrument;

pub use entity::*;
use error::GlError;
use repo::GlRepo;

#[derive(Clone)]
pub struct ChartOfAccounts {
    repo: GlRepo,
}

impl ChartOfAccounts {
    pub(crate) fn new(pool: &SqlitePool) -> Self {
        Self {
            repo: GlRepo::new(pool),
        }
    }

    #[instrument(name = "khata.gl.create", skip(self, new_gl), fields(gl_num = %new_gl.gl_num))]
    pub async fn create(&self, new_gl: NewGlSetup) -> Result<GlSetup, GlError> {
        if !(1..=LEAF_LAYER).contains(&new_gl.layer_id) {
            return Err(GlError::InvalidLayer(new_gl.layer_id));
        }
        if new_gl.layer_id > 1 {
            let parent = new_gl
                .parent_gl_num
                .clone()
                .ok_or_else(|| GlError::ParentNotFound {
                    gl_num: new_gl.gl_num.clone(),
                    parent: String::new(),
                    layer: new_gl.layer_id - 1,
                })?;
            if self
                .repo
                .find_at_layer(&parent, new_gl.layer_id - 1)
                .await?
                .is_none()
            {
                return Err(GlError::ParentNotFound {
                    gl_num: new_gl.gl_num.clone(),
                    parent,
                    layer: new_gl.layer_id - 1,
                });
            }
        }
        self.repo.insert(&new_gl).await?;
        self.find(&new_gl.gl_num).await
    }

    pub async fn find(&self, gl_num: &str) -> Result<GlSetup, GlError> {
        self.repo
            .find(gl_num)
            .await?
            .ok_or_else(|| GlError::NotFound(gl_num.to_string()))
    }

    /// Whether the GL exists and sits on the leaf layer. Accounts may only
    /// reference leaf GLs.
    pub async fn leaf(&self, gl_num: &str) -> Result<bool, GlError> {
        Ok(self
            .repo
            .find(gl_num)
            .await?
            .map(|gl| gl.is_leaf())
            .unwrap_or(false))
    }

    pub async fn gl_name(&self, gl_num: &str) -> Result<String, GlError> {
        Ok(self
            .repo
            .find(gl_num)
            .await?
            .map(|gl| gl.gl_name)
            .unwrap_or_else(|| "Unknown GL".to_string()))
    }

    pub async fn list_by_layer(&self, layer_id: i64) -> Result<Vec<GlSetup>, GlError> {
        self.repo.list_by_layer(layer_id).await
    }

    /// GLs in active use: referenced (directly or via interest mappings) by
    /// a sub-product that has at least one account.
    pub async fn active_gl_nums(&self) -> Result<Vec<String>, GlError> {
        self.repo.active_gl_nums().await
    }

    /// The subset of active GLs that belongs on the balance sheet: codes
    /// with prefix 1 or 2. Interest-expenditure leaves (`14…`) stay on the
    /// liability side, interest-income leaves (`24…`) on the asset side.
    pub async fn balance_sheet_gl_nums(&self) -> Result<Vec<String>, GlError> {
        Ok(self
            .active_gl_nums()
            .await?
            .into_iter()
            .filter(|gl| is_liability(gl) || is_asset(gl))
            .collect())
    }
}
