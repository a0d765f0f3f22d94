pub mod lesson;
pub mod response;
pub mod user_progress;

pub use lesson::Lesson;
pub use response::{ResponseRecord, ResponseType};
pub use user_progress::UserProgress;
