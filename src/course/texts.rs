pub const BEGIN_COURSE_BUTTON: &str = "Начать курс";

pub const WELCOME: &str = "👋 Привет! Я — помощник по дизайну интерьера.\n\n\
    📚 Курс состоит из коротких уроков. После каждого урока напиши ответ, \
    пришли фото или голосовое, и следующий урок придёт автоматически.\n\n\
    🎁 По окончании курса — чек-лист «7 шагов к идеальному интерьеру»!\n\n\
    ⏸ /pause — поставить курс на паузу\n\
    ▶️ /resume — продолжить\n\n\
    Готов? Нажми → «Начать курс»";

pub const HELP: &str = "ℹ️ Как это работает:\n\n\
    1. /start — начать (или начать заново)\n\
    2. «Начать курс» — получить первый урок\n\
    3. Ответь на урок текстом, фото, голосовым или документом\n\
    4. Следующий урок придёт через несколько секунд\n\n\
    /pause — пауза, /resume — продолжить с текущего урока";

pub const PLEASE_START: &str = "Пожалуйста, начни с команды /start";
pub const START_FIRST: &str = "Сначала начни курс с /start";
pub const PAUSED: &str = "Курс приостановлен. Напиши /resume, чтобы продолжить.";
pub const RESUMED: &str = "Курс возобновлён!";
pub const ALREADY_COMPLETED: &str = "Курс уже завершён! 🎉";
pub const NEXT_LESSON_SOON: &str = "Отлично! Следующий урок придёт через 5 секунд 🎯";
pub const FINAL_THANKS: &str = "Спасибо за обратную связь! Ты крут(а) 🙌";
pub const GENERIC_ERROR: &str = "Произошла ошибка. Попробуй позже.";
