use icq_bot_api::*;

/// Runs a bot and prints every event it receives to stdout.
/// This is useful to find out what the payloads of different
/// event types look like, and to grab chat IDs.
async fn run_bot_to_print_events() {
    log::info!("Starting The thingamading...");

    let token = load_token().expect("Could not load bot key file!");
    let bot = Bot::new(token);

    let mut dispatcher = Dispatcher::new(bot)
        .register(WILDCARD, |_bot, event: Event| async move {
            println!("{:#?}", event);
            respond(())
        })
        .enable_ctrlc_handler();

    log::info!("Dispatching the bot to listen and print all events.");
    if let Err(e) = dispatcher.run(0).await {
        log::error!("Polling died: {e}");
    }

    log::info!("it appears we have been bonked.");
}

fn main() {
    start_everything(run_bot_to_print_events());
}
