//! Entity services on top of a key-value backend.
//! - `storage`: backend contract plus in-memory and JSON-file backends.
//! - `codec` / `entities`: typed values and their stored envelopes.
//! - `crud`: CRUD over one namespace; `lifecycle`: enable/disable/error gate.
//! - `facade`: the two composed, as served to callers.

pub mod codec;
pub mod crud;
pub mod entities;
pub mod errors;
pub mod facade;
pub mod key;
pub mod lifecycle;
pub mod random;
pub mod storage;
#[cfg(test)]
pub mod test_support;

pub use codec::{Entity, EntityCodec};
pub use crud::CrudService;
pub use entities::{Counter, Point};
pub use errors::ServiceError;
pub use facade::ServiceFacade;
pub use lifecycle::{Lifecycle, LifecycleState};
pub use random::RandomNumberService;
