use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scale every monetary value is kept at.
pub const MONEY_SCALE: u32 = 2;

/// Simple-interest day basis: rate is a percentage, year counts 365 days.
pub const INTEREST_DIVISOR: u32 = 36500;

/// Rounds a monetary value to scale 2, half-up.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Error, Debug)]
#[error("invalid {field} value: {value}")]
pub struct InvalidEnumValue {
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrCrFlag {
    #[serde(rename = "D")]
    Debit,
    #[serde(rename = "C")]
    Credit,
}

impl DrCrFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrCrFlag::Debit => "D",
            DrCrFlag::Credit => "C",
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            DrCrFlag::Debit => DrCrFlag::Credit,
            DrCrFlag::Credit => DrCrFlag::Debit,
        }
    }
}

impl fmt::Display for DrCrFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrCrFlag {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "D" => Ok(DrCrFlag::Debit),
            "C" => Ok(DrCrFlag::Credit),
            other => Err(InvalidEnumValue {
                field: "dr_cr_flag",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle of a transaction leg. All legs of one transaction transition
/// together; `Future` legs wait for BOD to bring them into the open day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranStatus {
    Entry,
    Posted,
    Verified,
    Future,
}

impl TranStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranStatus::Entry => "Entry",
            TranStatus::Posted => "Posted",
            TranStatus::Verified => "Verified",
            TranStatus::Future => "Future",
        }
    }
}

impl fmt::Display for TranStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Entry" => Ok(TranStatus::Entry),
            "Posted" => Ok(TranStatus::Posted),
            "Verified" => Ok(TranStatus::Verified),
            "Future" => Ok(TranStatus::Future),
            other => Err(InvalidEnumValue {
                field: "tran_status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Inactive,
    Closed,
    Dormant,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Inactive => "Inactive",
            AccountStatus::Closed => "Closed",
            AccountStatus::Dormant => "Dormant",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(AccountStatus::Active),
            "Inactive" => Ok(AccountStatus::Inactive),
            "Closed" => Ok(AccountStatus::Closed),
            "Dormant" => Ok(AccountStatus::Dormant),
            other => Err(InvalidEnumValue {
                field: "account_status",
                value: other.to_string(),
            }),
        }
    }
}

/// Interest-accrual legs are written `Pending` by Job 2 and flipped to
/// `Processed` once Job 3 has emitted their GL movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccrualStatus {
    Pending,
    Processed,
}

impl AccrualStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccrualStatus::Pending => "Pending",
            AccrualStatus::Processed => "Processed",
        }
    }
}

impl fmt::Display for AccrualStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccrualStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(AccrualStatus::Pending),
            "Processed" => Ok(AccrualStatus::Processed),
            other => Err(InvalidEnumValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Customer,
    Office,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlClass {
    Liability,
    Asset,
    Income,
    Expenditure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_round_trip() {
        for flag in [DrCrFlag::Debit, DrCrFlag::Credit] {
            assert_eq!(flag.as_str().parse::<DrCrFlag>().unwrap(), flag);
        }
        assert_eq!(DrCrFlag::Debit.flipped(), DrCrFlag::Credit);
        assert!("X".parse::<DrCrFlag>().is_err());
    }

    #[test]
    fn statuses_round_trip() {
        for status in [
            TranStatus::Entry,
            TranStatus::Posted,
            TranStatus::Verified,
            TranStatus::Future,
        ] {
            assert_eq!(status.as_str().parse::<TranStatus>().unwrap(), status);
        }
        for status in [
            AccountStatus::Active,
            AccountStatus::Inactive,
            AccountStatus::Closed,
            AccountStatus::Dormant,
        ] {
            assert_eq!(status.as_str().parse::<AccountStatus>().unwrap(), status);
        }
    }

    #[test]
    fn money_rounds_half_up() {
        assert_eq!(round_money("1.005".parse().unwrap()), "1.01".parse().unwrap());
        assert_eq!(round_money("1.004".parse().unwrap()), "1.00".parse().unwrap());
        assert_eq!(
            round_money("198.630136".parse().unwrap()),
            "198.63".parse().unwrap()
        );
    }
}
