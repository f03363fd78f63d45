//! Discord transport - turns DMs and button presses into [`InboundEvent`]s and renders
//! [`Reply`]s as messages with button rows.
//!
//! Reply-keyboard labels become buttons whose custom id is the label behind a `menu:`
//! prefix; pressing one is delivered as if the label had been typed. Inline selection
//! buttons carry the callback tag as their custom id.
//!
//! A reply that does not fit into one Discord message is sent as several: long text is
//! split at line breaks, and inline buttons beyond the first message's capacity follow in
//! extra messages of up to 25 buttons each. No button is ever dropped.

use super::{
    BotData,
    event::InboundEvent,
    reply::{InlineButton, Reply},
};
use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, instrument};

const MENU_PREFIX: &str = "menu:";
const MAX_ROWS: usize = 5;
const MAX_BUTTONS_PER_ROW: usize = 5;
const MAX_LABEL_LEN: usize = 80;
const MAX_CONTENT_LEN: usize = 2000;
const MORE_OPTIONS: &str = "More options:";

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{BotData, layout_reply};
    use crate::{
        bot::{event::InboundEvent, menu},
        errors::{Error, Result},
    };

    /// Opens the main menu.
    #[poise::command(slash_command)]
    pub async fn start(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let sender = ctx.author().id.to_string();
        let Some(reply) = ctx.data().dispatch(InboundEvent::text(sender, menu::START)).await else {
            return Ok(());
        };

        for message in layout_reply(&reply) {
            ctx.send(
                poise::CreateReply::default()
                    .content(message.content.clone())
                    .components(message.components()),
            )
            .await?;
        }
        Ok(())
    }
}

pub use inner::*;

/// One Discord message worth of a [`Reply`]
#[derive(Debug)]
struct OutgoingMessage<'a> {
    content: String,
    menu: Vec<&'static str>,
    inline: Vec<&'a InlineButton>,
}

impl OutgoingMessage<'_> {
    fn text(content: String) -> Self {
        Self {
            content,
            menu: Vec::new(),
            inline: Vec::new(),
        }
    }

    /// Inline selections first, then the menu labels.
    fn components(&self) -> Vec<serenity::CreateActionRow> {
        let inline_buttons: Vec<serenity::CreateButton> = self
            .inline
            .iter()
            .map(|button| {
                serenity::CreateButton::new(button.action.to_string())
                    .label(button_label(&button.label))
                    .style(serenity::ButtonStyle::Primary)
            })
            .collect();
        let menu_buttons: Vec<serenity::CreateButton> = self
            .menu
            .iter()
            .map(|label| {
                serenity::CreateButton::new(format!("{MENU_PREFIX}{label}"))
                    .label(button_label(label))
                    .style(serenity::ButtonStyle::Secondary)
            })
            .collect();

        inline_buttons
            .chunks(MAX_BUTTONS_PER_ROW)
            .chain(menu_buttons.chunks(MAX_BUTTONS_PER_ROW))
            .map(|row| serenity::CreateActionRow::Buttons(row.to_vec()))
            .collect()
    }
}

fn button_label(label: &str) -> String {
    label.chars().take(MAX_LABEL_LEN).collect()
}

/// Splits text into chunks of at most [`MAX_CONTENT_LEN`] characters, preferring line
/// breaks. Always returns at least one chunk.
fn split_content(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > MAX_CONTENT_LEN && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > MAX_CONTENT_LEN {
            let chars: Vec<char> = line.chars().collect();
            chunks.extend(chars.chunks(MAX_CONTENT_LEN).map(|piece| piece.iter().collect()));
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Lays a reply out over as many messages as Discord's limits require.
///
/// The menu keyboard rides on the last text chunk so navigation (cancel, main menu) is
/// always present; inline buttons fill that message's remaining rows and then continue
/// in follow-up messages.
fn layout_reply(reply: &Reply) -> Vec<OutgoingMessage<'_>> {
    let mut messages: Vec<OutgoingMessage<'_>> = split_content(&reply.text)
        .into_iter()
        .map(OutgoingMessage::text)
        .collect();

    let menu: Vec<&'static str> = reply.keyboard.rows().into_iter().flatten().collect();
    let menu_rows = menu.len().div_ceil(MAX_BUTTONS_PER_ROW);
    let first_capacity = MAX_ROWS.saturating_sub(menu_rows) * MAX_BUTTONS_PER_ROW;
    let (first, rest) = reply.inline.split_at(first_capacity.min(reply.inline.len()));

    if let Some(last) = messages.last_mut() {
        last.menu = menu;
        last.inline = first.iter().collect();
    }
    for page in rest.chunks(MAX_ROWS * MAX_BUTTONS_PER_ROW) {
        let mut message = OutgoingMessage::text(MORE_OPTIONS.to_string());
        message.inline = page.iter().collect();
        messages.push(message);
    }

    messages
}

/// Maps a button custom id back to the event it stands for.
fn event_from_component(sender: String, custom_id: &str) -> InboundEvent {
    match custom_id.strip_prefix(MENU_PREFIX) {
        Some(label) => InboundEvent::text(sender, label),
        None => InboundEvent::callback(sender, custom_id),
    }
}

async fn send_reply(
    ctx: &serenity::Context,
    channel: serenity::ChannelId,
    reply: &Reply,
) -> Result<()> {
    for message in layout_reply(reply) {
        let outgoing = serenity::CreateMessage::new()
            .content(message.content.clone())
            .components(message.components());
        channel.send_message(&ctx.http, outgoing).await?;
    }
    Ok(())
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("Logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::Message { new_message } => {
            // Conversations happen in DMs only
            if new_message.author.bot || new_message.guild_id.is_some() {
                return Ok(());
            }
            let inbound =
                InboundEvent::text(new_message.author.id.to_string(), new_message.content.clone());
            if let Some(reply) = data.dispatch(inbound).await {
                send_reply(ctx, new_message.channel_id, &reply).await?;
            }
        }
        serenity::FullEvent::InteractionCreate { interaction } => {
            let Some(component) = interaction.as_message_component() else {
                return Ok(());
            };
            component
                .create_response(&ctx.http, serenity::CreateInteractionResponse::Acknowledge)
                .await?;

            debug!(custom_id = %component.data.custom_id, "Button pressed");
            let inbound =
                event_from_component(component.user.id.to_string(), &component.data.custom_id);
            if let Some(reply) = data.dispatch(inbound).await {
                send_reply(ctx, component.channel_id, &reply).await?;
            }
        }
        _ => {}
    }
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error}", ctx.command().name);
            if let Err(e) = ctx.say("❌ Something went wrong. Please try again.").await {
                error!("Failed to send error message: {e}");
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!("Error handling {}: {error}", event.snake_case_name());
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Connects to Discord and serves conversations until the client stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![start()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))
        .map_err(Error::from)
}
