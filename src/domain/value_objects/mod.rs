pub mod customer_id;
pub mod job_id;
pub mod job_status;
pub mod mutation_id;
pub mod mutation_kind;
pub mod payment_method;
pub mod user_id;

pub use customer_id::CustomerId;
pub use job_id::JobId;
pub use job_status::{JobStatus, PaymentStatus};
pub use mutation_id::MutationId;
pub use mutation_kind::MutationKind;
pub use payment_method::PaymentMethod;
pub use user_id::UserId;
