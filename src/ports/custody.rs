//! Asset Custody Port - Value Transfer Interface
//!
//! The engine never holds assets itself; an external custody collaborator
//! provides atomic transfers and delegated (approval-based) pulls. Any
//! transfer failure aborts the enclosing engine operation.

use rust_decimal::Decimal;

use crate::domain::error::CustodyError;
use crate::domain::policy::AccountId;

/// Trait for the external value-transfer service.
///
/// Both operations are all-or-nothing: on `Err` no value moved.
#[cfg_attr(test, mockall::automock)]
pub trait AssetCustody {
    /// Move `amount` from `from` to `to`.
    fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<(), CustodyError>;

    /// Pull `amount` from `owner` into `to` under a prior approval.
    fn transfer_delegated(
        &self,
        owner: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<(), CustodyError>;
}
