pub mod catalog;
pub mod engine;
pub mod locks;
pub mod reply;
pub mod scheduler;
pub mod texts;

pub use catalog::LessonCatalog;
pub use engine::CourseEngine;
pub use reply::ReplyContent;
pub use scheduler::{run_delivery_worker, DelayQueue};
