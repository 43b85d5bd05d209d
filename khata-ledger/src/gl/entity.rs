use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::primitives::GlClass;

/// One row of the immutable chart of accounts. Layer 1 is the root of the
/// hierarchy, layer 4 the leaves; only leaf GLs may be referenced by
/// accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlSetup {
    pub gl_num: String,
    pub gl_name: String,
    pub layer_id: i64,
    pub layer_gl_num: String,
    pub parent_gl_num: Option<String>,
}

impl GlSetup {
    pub fn is_leaf(&self) -> bool {
        self.layer_id == LEAF_LAYER
    }
}

impl FromRow<'_, SqliteRow> for GlSetup {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            gl_num: row.try_get("gl_num")?,
            gl_name: row.try_get("gl_name")?,
            layer_id: row.try_get("layer_id")?,
            layer_gl_num: row.try_get("layer_gl_num")?,
            parent_gl_num: row.try_get("parent_gl_num")?,
        })
    }
}

pub const LEAF_LAYER: i64 = 4;

/// Leaf GLs whose accounts may run a negative balance.
const OVERDRAFT_LEAVES: [&str; 2] = ["210201000", "140101000"];

pub fn classify(gl_num: &str) -> Option<GlClass> {
    if gl_num.starts_with("14") {
        Some(GlClass::Expenditure)
    } else if gl_num.starts_with("24") {
        Some(GlClass::Income)
    } else if gl_num.starts_with('1') {
        Some(GlClass::Liability)
    } else if gl_num.starts_with('2') {
        Some(GlClass::Asset)
    } else {
        None
    }
}

pub fn is_liability(gl_num: &str) -> bool {
    gl_num.starts_with('1')
}

pub fn is_asset(gl_num: &str) -> bool {
    gl_num.starts_with('2')
}

pub fn is_overdraft_leaf(gl_num: &str) -> bool {
    OVERDRAFT_LEAVES.contains(&gl_num)
}

pub fn is_interest_payable_leaf(gl_num: &str) -> bool {
    gl_num.starts_with("13")
}

pub fn is_interest_expenditure_leaf(gl_num: &str) -> bool {
    gl_num.starts_with("14")
}

pub fn is_interest_receivable_leaf(gl_num: &str) -> bool {
    gl_num.starts_with("23")
}

pub fn is_interest_income_leaf(gl_num: &str) -> bool {
    gl_num.starts_with("24")
}

#[derive(Builder, Debug)]
pub struct NewGlSetup {
    #[builder(setter(into))]
    pub(super) gl_num: String,
    #[builder(setter(into))]
    pub(super) gl_name: String,
    pub(super) layer_id: i64,
    #[builder(setter(into))]
    pub(super) layer_gl_num: String,
    #[builder(setter(strip_option, into), default)]
    pub(super) parent_gl_num: Option<String>,
}

impl NewGlSetup {
    pub fn builder() -> NewGlSetupBuilder {
        NewGlSetupBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_classification() {
        assert_eq!(classify("110101000"), Some(GlClass::Liability));
        assert_eq!(classify("210101000"), Some(GlClass::Asset));
        assert_eq!(classify("140101000"), Some(GlClass::Expenditure));
        assert_eq!(classify("240101000"), Some(GlClass::Income));
        assert_eq!(classify("910101000"), None);
    }

    #[test]
    fn interest_leaves() {
        assert!(is_interest_payable_leaf("130101000"));
        assert!(is_interest_expenditure_leaf("140103001"));
        assert!(is_interest_receivable_leaf("230101000"));
        assert!(is_interest_income_leaf("240102001"));
        assert!(!is_interest_income_leaf("210101000"));
    }

    #[test]
    fn overdraft_leaves_are_flagged() {
        assert!(is_overdraft_leaf("210201000"));
        assert!(is_overdraft_leaf("140101000"));
        assert!(!is_overdraft_leaf("110101000"));
    }
}
