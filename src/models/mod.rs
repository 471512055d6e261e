//! Data models for casepoll.

mod case_status;
mod identifier;
mod lookup;

pub use case_status::CaseStatus;
pub use identifier::{Identifier, IdentifierRange, DEFAULT_ID_WIDTH};
pub use lookup::{LookupResult, StatusFields};
