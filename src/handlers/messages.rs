use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;

use crate::course::{texts, CourseEngine, ReplyContent};
use crate::handlers::utils::{display_name, reply_content, user_id};

/// Что делать с входящим сообщением.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    BeginCourse,
    Reply(ReplyContent),
    Skip,
}

fn route(text: Option<&str>, content: Option<ReplyContent>) -> Route {
    match text {
        // Неизвестные команды не считаются ответом на урок
        Some(text) if text.starts_with('/') => Route::Skip,
        Some(text) if text == texts::BEGIN_COURSE_BUTTON => Route::BeginCourse,
        _ => content.map_or(Route::Skip, Route::Reply),
    }
}

pub async fn message_handler(
    msg: Message,
    engine: Arc<CourseEngine>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let user_id = user_id(&msg);

    match route(msg.text(), reply_content(&msg)) {
        Route::BeginCourse => engine.begin_course(&user_id).await,
        Route::Reply(content) => {
            engine.handle_reply(&user_id, &display_name(&msg), content).await;
        }
        Route::Skip => log::debug!("Message from user {} skipped", user_id),
    }
    Ok(())
}
