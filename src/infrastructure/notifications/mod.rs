pub mod channel_notifier;
pub mod read_model_broadcaster;
pub mod tracing_notifier;

pub use channel_notifier::ChannelNotifier;
pub use read_model_broadcaster::{ReadModelBroadcaster, ReadModelEvent};
pub use tracing_notifier::TracingNotifier;
