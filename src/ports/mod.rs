//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) the usecases layer requires from
//! external collaborators. Collaborator implementations live outside
//! this crate; tests substitute mocks or in-memory fakes.
//!
//! Port categories:
//! - `AssetCustody`: atomic value transfer and delegated pulls
//! - `CertificateIssuer`: non-transferable per-policy certificates
//! - `OutcomeSource`: read-only view of finalized market outcomes

pub mod certificate;
pub mod custody;
pub mod outcome_source;

pub use certificate::CertificateIssuer;
pub use custody::AssetCustody;
pub use outcome_source::OutcomeSource;
