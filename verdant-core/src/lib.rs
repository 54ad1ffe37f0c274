//! VERDANT Core - Shared Record Types
//!
//! Pure data structures with no behavior: the normalized cultivar/breeder
//! records produced by catalog ingestion, and the error taxonomy shared
//! across crates. No business logic lives here.

pub mod cultivar;
pub mod error;

pub use cultivar::{
    BreederRecord, CannabinoidContent, CultivarRecord, Genetics, EXTERNAL_ID_CANNABIS_API,
};
pub use error::{CatalogError, CatalogResult};
