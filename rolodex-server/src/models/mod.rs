//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod person;
pub mod pagination;

pub use validation::ValidationError;
pub use person::{ContactIds, Email, Gender, NewPerson, PersonName, PersonPatch};
pub use pagination::{Pagination, Paginated, PaginationParams};
