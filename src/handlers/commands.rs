use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;

use crate::course::{texts, CourseEngine};
use crate::handlers::utils::{display_name, user_id};
use crate::Command;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    engine: Arc<CourseEngine>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let user_id = user_id(&msg);

    match cmd {
        Command::Start => engine.start(&user_id, &display_name(&msg)).await,
        Command::Pause => engine.pause(&user_id).await,
        Command::Resume => engine.resume(&user_id).await,
        Command::Help => {
            bot.send_message(msg.chat.id, texts::HELP).await?;
        }
    }
    Ok(())
}
