use icq_bot_api::*;

static HELP: &str = "(this bot repeats whatever you tell it, and has buttons to press)";

async fn handle_new_message(mut bot: Bot, event: Event) -> HandlerResult {
    let (Some(chat_id), Some(text)) = (event.chat_id(), event.text()) else {
        return respond(());
    };

    if text == "/start" || text == "/help" {
        bot.send_text(chat_id, HELP).await?;
        return respond(());
    }

    bot.set_key_row(vec![
        btn("Yes", "yes", "primary"),
        btn("No", "no", "attention"),
    ])
    .set_key_row(vec![btn("🤷", "shrug", "base")]);

    bot.send_text(chat_id, &format!("You said: {text}\nDid you mean it?"))
        .await?;

    respond(())
}

async fn handle_callback_query(bot: Bot, event: Event) -> HandlerResult {
    // The button keeps spinning until this is answered.
    bot.accept_click(&event).await?;

    let Some(chat_id) = event.chat_id() else {
        return respond(());
    };

    let answer = match event.callback_data() {
        Some("yes") => "Glad we agree.",
        Some("no") => "Oh. Okay then.",
        Some("shrug") => "Same tbh",
        _ => "What was that button?",
    };
    bot.send_text(chat_id, answer).await?;

    respond(())
}

async fn lol() {
    log::info!("ASYNC WOOOO");
    let token = load_token().expect("Could not load bot key file!");

    let bot = Bot::new(token);

    log::info!("Creating the dispatcher...");

    let mut dispatcher = Dispatcher::new(bot)
        .register("newMessage", handle_new_message)
        .register("callbackQuery", handle_callback_query)
        .register(WILDCARD, |_bot, event: Event| async move {
            log::debug!("Event {} of type {}", event.event_id, event.kind);
            respond(())
        })
        .enable_ctrlc_handler();

    log::info!("Dispatching the dispatcher!");

    if let Err(e) = dispatcher.run(0).await {
        log::error!("Polling died: {e}");
    }

    log::info!("it appears we have been bonked.");
}

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "WARN,icq_echo_bot=debug,icq_bot_api=info");
    }
    start_everything(lol());
}
