//! Ownership Certificate Port - Policy Certificate Interface
//!
//! Each issued policy is represented by a non-transferable certificate
//! minted by an external collaborator. The collaborator itself rejects
//! transfers between two non-zero holders; the engine only issues and
//! queries.

use crate::domain::error::CertificateError;
use crate::domain::policy::{AccountId, PolicyId};

/// Trait for the certificate collaborator.
#[cfg_attr(test, mockall::automock)]
pub trait CertificateIssuer {
    /// Mint the certificate for a freshly issued policy.
    fn issue(&self, policy_id: PolicyId, holder: &AccountId) -> Result<(), CertificateError>;

    /// Current holder of a policy's certificate.
    fn holder_of(&self, policy_id: PolicyId) -> Result<AccountId, CertificateError>;
}
