//! Per-leg validation policy.
//!
//! Customer accounts may be debited only up to the available balance,
//! except on overdraft leaves. Office accounts under an asset GL are
//! unrestricted; under a liability GL the current balance must cover the
//! debit; anything else is held non-negative conservatively.

use rust_decimal::Decimal;

use super::error::TransactionError;
use crate::{
    account::AccountInfo,
    gl,
    primitives::{AccountStatus, DrCrFlag},
};

pub(super) struct LegContext {
    pub current_balance: Decimal,
    pub available_balance: Decimal,
}

pub(super) fn check_leg(
    info: &AccountInfo,
    flag: DrCrFlag,
    amount: Decimal,
    ctx: &LegContext,
) -> Result<(), TransactionError> {
    if info.status != AccountStatus::Active {
        return Err(TransactionError::AccountInactive {
            account_no: info.account_no.clone(),
            status: info.status,
        });
    }

    if info.is_customer() {
        if flag == DrCrFlag::Debit && !gl::is_overdraft_leaf(&info.gl_num) {
            if amount > ctx.available_balance {
                return Err(TransactionError::InsufficientBalance {
                    account_no: info.account_no.clone(),
                    available: ctx.available_balance,
                    amount,
                });
            }
        }
        return Ok(());
    }

    // Office accounts.
    if info.is_asset() {
        return Ok(());
    }
    let resulting = match flag {
        DrCrFlag::Debit => ctx.current_balance - amount,
        DrCrFlag::Credit => ctx.current_balance + amount,
    };
    if info.is_liability() {
        if flag == DrCrFlag::Debit && resulting < Decimal::ZERO {
            return Err(TransactionError::InsufficientBalance {
                account_no: info.account_no.clone(),
                available: ctx.current_balance,
                amount,
            });
        }
        return Ok(());
    }
    // Neither asset nor liability GL: hold the balance non-negative.
    if resulting < Decimal::ZERO {
        return Err(TransactionError::InsufficientBalance {
            account_no: info.account_no.clone(),
            available: ctx.current_balance,
            amount,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::AccountKind;

    fn info(kind: AccountKind, gl_num: &str, status: AccountStatus) -> AccountInfo {
        AccountInfo {
            account_no: "0000000110001".to_string(),
            acct_name: "Test".to_string(),
            gl_num: gl_num.to_string(),
            kind,
            status,
            loan_limit: Decimal::ZERO,
            sub_product_id: 1,
        }
    }

    fn ctx(current: &str, available: &str) -> LegContext {
        LegContext {
            current_balance: current.parse().unwrap(),
            available_balance: available.parse().unwrap(),
        }
    }

    #[test]
    fn inactive_account_rejects_everything() {
        let info = info(AccountKind::Customer, "110101000", AccountStatus::Dormant);
        let err = check_leg(
            &info,
            DrCrFlag::Credit,
            Decimal::ONE,
            &ctx("100.00", "100.00"),
        )
        .unwrap_err();
        assert!(matches!(err, TransactionError::AccountInactive { .. }));
    }

    #[test]
    fn customer_debit_bounded_by_available() {
        let info = info(AccountKind::Customer, "110101000", AccountStatus::Active);
        let at_limit = "100.00".parse().unwrap();
        assert!(check_leg(&info, DrCrFlag::Debit, at_limit, &ctx("100.00", "100.00")).is_ok());
        let over = "100.01".parse().unwrap();
        let err =
            check_leg(&info, DrCrFlag::Debit, over, &ctx("100.00", "100.00")).unwrap_err();
        assert!(matches!(err, TransactionError::InsufficientBalance { .. }));
    }

    #[test]
    fn customer_overdraft_leaf_may_go_negative() {
        let info = info(AccountKind::Customer, "210201000", AccountStatus::Active);
        let amount = "500.00".parse().unwrap();
        assert!(check_leg(&info, DrCrFlag::Debit, amount, &ctx("0.00", "0.00")).is_ok());
    }

    #[test]
    fn customer_credit_unrestricted() {
        let info = info(AccountKind::Customer, "110101000", AccountStatus::Active);
        let amount = "999999.99".parse().unwrap();
        assert!(check_leg(&info, DrCrFlag::Credit, amount, &ctx("0.00", "0.00")).is_ok());
    }

    #[test]
    fn office_asset_debit_unrestricted() {
        let info = info(AccountKind::Office, "210101000", AccountStatus::Active);
        let amount = "1000.00".parse().unwrap();
        assert!(check_leg(&info, DrCrFlag::Debit, amount, &ctx("0.00", "0.00")).is_ok());
    }

    #[test]
    fn office_liability_cannot_go_negative() {
        let info = info(AccountKind::Office, "110102000", AccountStatus::Active);
        let amount = "100.01".parse().unwrap();
        let err = check_leg(&info, DrCrFlag::Debit, amount, &ctx("100.00", "100.00")).unwrap_err();
        assert!(matches!(err, TransactionError::InsufficientBalance { .. }));
        let exact = "100.00".parse().unwrap();
        assert!(check_leg(&info, DrCrFlag::Debit, exact, &ctx("100.00", "100.00")).is_ok());
    }

    #[test]
    fn office_other_gl_is_conservative() {
        let info = info(AccountKind::Office, "910101000", AccountStatus::Active);
        let amount = "1.00".parse().unwrap();
        let err = check_leg(&info, DrCrFlag::Debit, amount, &ctx("0.00", "0.00")).unwrap_err();
        assert!(matches!(err, TransactionError::InsufficientBalance { .. }));
        assert!(check_leg(&info, DrCrFlag::Credit, amount, &ctx("0.00", "0.00")).is_ok());
    }
}
