pub mod error_detector;
pub mod error_logger;
pub mod progress;

pub use error_detector::{FailureDetector, KeywordDetector};
pub use error_logger::ErrorLogger;
pub use progress::{ChannelSink, MemorySink, Progress, ProgressSink, NullSink};
