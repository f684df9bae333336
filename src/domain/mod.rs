pub mod entities;
pub mod value_objects;

pub use entities::{MutationPayload, MutationRecord, OptimisticSnapshot};
pub use value_objects::{JobId, MutationId, MutationKind};
