use crate::dispatcher::{ChartReply, Dispatcher};
use crate::error::Result;
use log::error;
use std::sync::Arc;
use teloxide::dispatching::repls::CommandReplExt;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Diese Befehle werden unterstützt:")]
pub enum Command {
    #[command(description = "Willkommensnachricht anzeigen")]
    Start,
    #[command(description = "Aktueller Preis, z.B. /price bitcoin")]
    Price(String),
    #[command(description = "Neueste Nachrichten, z.B. /news solana")]
    News(String),
    #[command(description = "Technischer Chart, z.B. /chart ethereum")]
    Chart(String),
}

/// Telegram front-end: owns the polling loop and the outgoing sends, and
/// delegates everything else to the dispatcher. One task per update; a
/// handler failure is logged and never tears down the loop.
pub struct CryptoBot {
    bot: Bot,
    dispatcher: Dispatcher,
}

impl CryptoBot {
    pub fn new(bot_token: String, dispatcher: Dispatcher) -> Self {
        Self {
            bot: Bot::new(bot_token),
            dispatcher,
        }
    }

    pub async fn run(self: Arc<Self>) -> Result<()> {
        let bot = self.bot.clone();
        let handler_instance = self.clone();
        Command::repl(bot, move |_b: Bot, msg: Message, cmd: Command| {
            let handler_instance = handler_instance.clone();
            async move {
                if let Err(e) = handler_instance.handle_command(msg, cmd).await {
                    error!("Error handling command: {}", e);
                }
                Ok(())
            }
        })
        .await;
        Ok(())
    }

    async fn handle_command(&self, msg: Message, command: Command) -> Result<()> {
        match command {
            Command::Start => {
                let user_name = msg
                    .from()
                    .map(|user| user.first_name.as_str())
                    .unwrap_or("");
                self.bot
                    .send_message(msg.chat.id, self.dispatcher.welcome_text(user_name))
                    .await?;
            }
            Command::Price(arg) => {
                let reply = self.dispatcher.price_reply(&arg).await;
                self.bot.send_message(msg.chat.id, reply).await?;
            }
            Command::News(arg) => {
                let reply = self.dispatcher.news_reply(&arg).await;
                self.bot
                    .send_message(msg.chat.id, reply)
                    .parse_mode(ParseMode::Markdown)
                    .disable_web_page_preview(true)
                    .await?;
            }
            Command::Chart(arg) => {
                let coin = match self.dispatcher.validate_coin(&arg, "/chart bitcoin") {
                    Ok(coin) => coin,
                    Err(reply) => {
                        self.bot.send_message(msg.chat.id, reply).await?;
                        return Ok(());
                    }
                };
                self.bot
                    .send_message(msg.chat.id, self.dispatcher.chart_ack(coin))
                    .await?;
                match self.dispatcher.chart_reply(coin).await {
                    ChartReply::Text(text) => {
                        self.bot.send_message(msg.chat.id, text).await?;
                    }
                    ChartReply::Photo { png, caption } => {
                        self.bot
                            .send_photo(msg.chat.id, InputFile::memory(png))
                            .caption(caption)
                            .await?;
                    }
                }
            }
        }
        Ok(())
    }
}
