mod config;
mod health;
mod quiz;
mod topics;
mod users;

use std::sync::Arc;

use dotenv::dotenv;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ParseMode},
    utils::command::BotCommands,
};

use config::Config;
use quiz::engine::{option_letter, CallbackAction, QuestionPrompt, QuizEngine, Reply};
use quiz::generator::ClaudeGenerator;
use quiz::store::SessionStore;
use users::UserRegistry;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const QUICK_QUIZ_TOPIC: &str = "16";
const QUICK_QUIZ_COUNT: usize = 5;
const MEDIUM_QUIZ_COUNT: usize = 10;

const NO_ACTIVE_QUIZ_TEXT: &str = "No hay ningún test activo. Usa /rapido para empezar uno.";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Comandos disponibles:")]
enum Command {
    #[command(description = "registrarse y ver el menú")]
    Start,
    #[command(description = "5 preguntas rápidas")]
    Rapido,
    #[command(description = "10 preguntas")]
    Medio,
    #[command(description = "Servicios Sociales")]
    Tema16,
    #[command(description = "ver estadísticas")]
    Progreso,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    pretty_env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("❌ {}", err);
            std::process::exit(1);
        }
    };

    let bot = Bot::new(config.telegram_token.clone());

    let engine = Arc::new(QuizEngine::new(
        SessionStore::new(),
        Arc::new(ClaudeGenerator::new(config.claude_api_key.clone())),
    ));
    let users = Arc::new(UserRegistry::new());

    let port = config.port;
    tokio::spawn(async move {
        if let Err(err) = health::serve(port).await {
            log::error!("liveness endpoint failed: {}", err);
        }
    });

    log::info!("🤖 Bot de oposiciones iniciado");

    Dispatcher::builder(
        bot,
        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(handle_command),
            )
            .branch(Update::filter_callback_query().endpoint(handle_callback)),
    )
    .dependencies(dptree::deps![engine, users])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    engine: Arc<QuizEngine>,
    users: Arc<UserRegistry>,
) -> HandlerResult {
    match cmd {
        Command::Start => {
            let name = msg
                .from()
                .map(|user| user.first_name.clone())
                .unwrap_or_else(|| "opositor".to_string());
            let profile = users.register(msg.chat.id.0, name);
            send_greeting(&bot, msg.chat.id, &profile.display_name).await?;
        }
        Command::Rapido | Command::Tema16 => {
            start_quiz(&bot, &engine, msg.chat.id, QUICK_QUIZ_TOPIC, QUICK_QUIZ_COUNT).await?;
        }
        Command::Medio => {
            start_quiz(&bot, &engine, msg.chat.id, QUICK_QUIZ_TOPIC, MEDIUM_QUIZ_COUNT).await?;
        }
        Command::Progreso => {
            let text = match engine.progress(msg.chat.id.0) {
                Some(p) if p.completed => format!(
                    "🎯 Último test completado: ✅ {} aciertos, ❌ {} fallos",
                    p.correct, p.incorrect
                ),
                Some(p) => format!(
                    "📊 Pregunta {}/{} — ✅ {} aciertos, ❌ {} fallos",
                    p.current + 1,
                    p.total,
                    p.correct,
                    p.incorrect
                ),
                None => NO_ACTIVE_QUIZ_TEXT.to_string(),
            };
            bot.send_message(msg.chat.id, text).await?;
        }
    }
    Ok(())
}

async fn send_greeting(bot: &Bot, chat_id: ChatId, name: &str) -> HandlerResult {
    let keyboard = KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new("🚇 /rapido"),
            KeyboardButton::new("🚌 /medio"),
        ],
        vec![
            KeyboardButton::new("📚 /tema16"),
            KeyboardButton::new("📊 /progreso"),
        ],
    ])
    .resize_keyboard(true);

    let text = format!(
        "🎓 ¡Hola {name}! Soy tu bot de oposiciones.\n\n🚀 **Comandos:**\n\
         /rapido - 5 preguntas rápidas\n/medio - 10 preguntas\n\
         /tema16 - Servicios Sociales\n/progreso - Ver estadísticas\n\n\
         ¡Empezamos! 🚇"
    );
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

async fn start_quiz(
    bot: &Bot,
    engine: &QuizEngine,
    chat_id: ChatId,
    topic_id: &str,
    count: usize,
) -> HandlerResult {
    bot.send_message(chat_id, "🧠 Generando preguntas con Claude IA...")
        .await?;
    let prompt = engine.start_quiz(chat_id.0, topic_id, count).await;
    send_question(bot, chat_id, &prompt).await?;
    Ok(())
}

async fn send_question(bot: &Bot, chat_id: ChatId, prompt: &QuestionPrompt) -> HandlerResult {
    let text = format!(
        "❓ **Pregunta {}/{}**\n\n{}",
        prompt.number, prompt.total, prompt.text
    );
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(answer_keyboard(prompt))
        .await?;
    Ok(())
}

fn answer_keyboard(prompt: &QuestionPrompt) -> InlineKeyboardMarkup {
    let rows = prompt.options.iter().enumerate().map(|(i, option)| {
        vec![InlineKeyboardButton::callback(
            format!("{}) {}", option_letter(i), option),
            CallbackAction::Answer(i).token(),
        )]
    });
    InlineKeyboardMarkup::new(rows)
}

async fn handle_callback(bot: Bot, query: CallbackQuery, engine: Arc<QuizEngine>) -> HandlerResult {
    let (Some(data), Some(message)) = (query.data.as_deref(), query.message.as_ref()) else {
        bot.answer_callback_query(query.id).await?;
        return Ok(());
    };
    let chat_id = message.chat.id;

    let reply = match CallbackAction::parse(data) {
        Some(action) => engine.handle_callback(chat_id.0, action),
        None => Reply::Ignored,
    };

    match reply {
        Reply::Feedback(outcome) => {
            let (emoji, verdict) = if outcome.correct {
                ("✅", "CORRECTO")
            } else {
                ("❌", "INCORRECTO")
            };
            let text = format!("{emoji} **{verdict}**\n\n💡 {}", outcome.explanation);
            let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
                "➡️ Siguiente",
                CallbackAction::Next.token(),
            )]]);
            bot.edit_message_text(chat_id, message.id, text)
                .parse_mode(ParseMode::Markdown)
                .reply_markup(keyboard)
                .await?;
        }
        Reply::Prompt(prompt) => {
            bot.delete_message(chat_id, message.id).await?;
            send_question(&bot, chat_id, &prompt).await?;
        }
        Reply::Summary(summary) => {
            let text = format!(
                "🎯 **COMPLETADO**\n\n✅ {} aciertos\n❌ {} fallos\n📈 {}%",
                summary.correct, summary.incorrect, summary.percentage
            );
            bot.edit_message_text(chat_id, message.id, text)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Reply::NoActiveQuiz => {
            bot.send_message(chat_id, NO_ACTIVE_QUIZ_TEXT).await?;
        }
        Reply::Ignored => {}
    }

    bot.answer_callback_query(query.id).await?;
    Ok(())
}
