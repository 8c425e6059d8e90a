use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::pairing::{LeaveOutcome, PairingOutcome, PairingRegistry, UserId};
use crate::telegram::{Message, SendError, Update};

/// Relayable content, tagged once at the ingestion boundary so the relay
/// switches over a closed set instead of probing optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    Text(String),
    Sticker {
        file_id: String,
    },
    Photo {
        file_id: String,
        caption: Option<String>,
    },
    Document {
        file_id: String,
        caption: Option<String>,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Event {
    Command(Command),
    Content(ChatMessage),
    /// A message kind we do not relay (voice, video, location, ...).
    Unsupported,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Start,
    Help,
    Chat,
    Leave,
    Unknown,
}

/// Everything the dispatcher sends out goes through here, so tests can
/// record sends instead of hitting the network.
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn send_notice(&self, to: UserId, text: &str) -> Result<(), SendError>;
    async fn send_content(&self, to: UserId, message: &ChatMessage) -> Result<(), SendError>;
}

pub mod notice {
    pub const WELCOME: &str =
        "👋 Welcome to Anonymous Chat Bot!\nType /chat to find a partner.";
    pub const HELP: &str =
        "Available commands:\n/start - welcome\n/help - this list\n/chat - find a partner\n/leave - leave the chat or queue";
    pub const CONNECTED: &str = "You are connected to a partner. Say hi!";
    pub const WAITING: &str = "Looking for a chat partner, hold on...";
    pub const ALREADY_PAIRED: &str = "You are already in a chat. Use /leave first.";
    pub const ALREADY_WAITING: &str = "You are already in the queue, hold on...";
    pub const PARTNER_LEFT: &str = "Your partner left the chat. Type /chat to find a new one.";
    pub const YOU_LEFT: &str = "You left the chat.";
    pub const LEFT_QUEUE: &str = "You left the queue.";
    pub const NOT_IN_CHAT: &str = "You are not in a chat or queue.";
    pub const UNPAIRED: &str = "You are not in a chat. Type /chat to find a partner.";
    pub const UNSUPPORTED: &str =
        "Sorry, only text, stickers, photos and documents can be relayed.";
}

/// Turns inbound updates into registry calls and outbound sends.
pub struct Dispatcher {
    registry: PairingRegistry,
    outbound: Arc<dyn Outbound>,
}

impl Dispatcher {
    pub fn new(registry: PairingRegistry, outbound: Arc<dyn Outbound>) -> Self {
        Self { registry, outbound }
    }

    pub async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            debug!(update_id = update.update_id, "update without message, skipping");
            return;
        };

        let Some((sender, event)) = classify(message) else {
            warn!(
                update_id = update.update_id,
                "message without a usable sender, dropping"
            );
            return;
        };

        match event {
            Event::Command(command) => self.handle_command(sender, command).await,
            Event::Content(content) => self.relay(sender, content).await,
            Event::Unsupported => self.notify(sender, notice::UNSUPPORTED).await,
        }
    }

    async fn handle_command(&self, sender: UserId, command: Command) {
        match command {
            Command::Start => self.notify(sender, notice::WELCOME).await,
            Command::Help | Command::Unknown => self.notify(sender, notice::HELP).await,
            Command::Chat => match self.registry.request_pairing(sender) {
                PairingOutcome::Paired { partner } => {
                    // two independent sends; a failed notice never
                    // rolls the pairing back
                    self.notify(sender, notice::CONNECTED).await;
                    self.notify(partner, notice::CONNECTED).await;
                }
                PairingOutcome::Queued => self.notify(sender, notice::WAITING).await,
                PairingOutcome::AlreadyPaired => {
                    self.notify(sender, notice::ALREADY_PAIRED).await
                }
                PairingOutcome::AlreadyWaiting => {
                    self.notify(sender, notice::ALREADY_WAITING).await
                }
            },
            Command::Leave => match self.registry.leave(sender) {
                LeaveOutcome::WasPaired { partner } => {
                    self.notify(partner, notice::PARTNER_LEFT).await;
                    self.notify(sender, notice::YOU_LEFT).await;
                }
                LeaveOutcome::WasWaiting => self.notify(sender, notice::LEFT_QUEUE).await,
                LeaveOutcome::Idle => self.notify(sender, notice::NOT_IN_CHAT).await,
            },
        }
    }

    async fn relay(&self, sender: UserId, content: ChatMessage) {
        // copy the partner id out; the registry lock must not span the send
        let Some(partner) = self.registry.partner_of(sender) else {
            self.notify(sender, notice::UNPAIRED).await;
            return;
        };

        if let Err(err) = self.outbound.send_content(partner, &content).await {
            warn!(to = partner, error = %err, "relaying message failed");
        }
    }

    /// Best-effort system message; delivery failure is logged and swallowed.
    async fn notify(&self, to: UserId, text: &str) {
        if let Err(err) = self.outbound.send_notice(to, text).await {
            warn!(to, error = %err, "sending notice failed");
        }
    }
}

/// Extract the sender and a classified event from a raw message.
/// Returns None for messages without a human sender.
fn classify(message: Message) -> Option<(UserId, Event)> {
    let from = message.from?;
    if from.is_bot {
        return None;
    }
    let sender = from.id;

    if let Some(text) = message.text {
        if let Some(stripped) = text.strip_prefix('/') {
            let name = stripped
                .split_whitespace()
                .next()
                .unwrap_or("")
                // commands may carry a bot mention: /chat@SomeBot
                .split('@')
                .next()
                .unwrap_or("");
            let command = match name {
                "start" => Command::Start,
                "help" => Command::Help,
                "chat" => Command::Chat,
                "leave" => Command::Leave,
                _ => Command::Unknown,
            };
            return Some((sender, Event::Command(command)));
        }
        return Some((sender, Event::Content(ChatMessage::Text(text))));
    }

    if let Some(sticker) = message.sticker {
        return Some((
            sender,
            Event::Content(ChatMessage::Sticker {
                file_id: sticker.file_id,
            }),
        ));
    }

    if let Some(sizes) = message.photo {
        // Telegram lists sizes smallest first; forward the largest
        if let Some(best) = sizes.into_iter().next_back() {
            return Some((
                sender,
                Event::Content(ChatMessage::Photo {
                    file_id: best.file_id,
                    caption: message.caption,
                }),
            ));
        }
        return Some((sender, Event::Unsupported));
    }

    if let Some(document) = message.document {
        return Some((
            sender,
            Event::Content(ChatMessage::Document {
                file_id: document.file_id,
                caption: message.caption,
            }),
        ));
    }

    Some((sender, Event::Unsupported))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn classifies_commands_and_strips_mention() {
        let (sender, event) = classify(message(serde_json::json!({
            "message_id": 1,
            "from": {"id": 5, "is_bot": false, "first_name": "A"},
            "chat": {"id": 5, "type": "private"},
            "text": "/chat@HushPairBot"
        })))
        .unwrap();

        assert_eq!(sender, 5);
        assert_eq!(event, Event::Command(Command::Chat));
    }

    #[test]
    fn unknown_command_is_not_content() {
        let (_, event) = classify(message(serde_json::json!({
            "message_id": 1,
            "from": {"id": 5, "is_bot": false, "first_name": "A"},
            "chat": {"id": 5, "type": "private"},
            "text": "/frobnicate now"
        })))
        .unwrap();

        assert_eq!(event, Event::Command(Command::Unknown));
    }

    #[test]
    fn classifies_text_as_content() {
        let (_, event) = classify(message(serde_json::json!({
            "message_id": 1,
            "from": {"id": 5, "is_bot": false, "first_name": "A"},
            "chat": {"id": 5, "type": "private"},
            "text": "hello there"
        })))
        .unwrap();

        assert_eq!(
            event,
            Event::Content(ChatMessage::Text("hello there".into()))
        );
    }

    #[test]
    fn photo_keeps_largest_size_and_caption() {
        let (_, event) = classify(message(serde_json::json!({
            "message_id": 1,
            "from": {"id": 5, "is_bot": false, "first_name": "A"},
            "chat": {"id": 5, "type": "private"},
            "photo": [{"file_id": "s"}, {"file_id": "m"}, {"file_id": "l"}],
            "caption": "sunset"
        })))
        .unwrap();

        assert_eq!(
            event,
            Event::Content(ChatMessage::Photo {
                file_id: "l".into(),
                caption: Some("sunset".into()),
            })
        );
    }

    #[test]
    fn message_from_bot_is_dropped() {
        let classified = classify(message(serde_json::json!({
            "message_id": 1,
            "from": {"id": 5, "is_bot": true, "first_name": "B"},
            "chat": {"id": 5, "type": "private"},
            "text": "beep"
        })));

        assert!(classified.is_none());
    }

    #[test]
    fn voice_message_is_unsupported() {
        let (_, event) = classify(message(serde_json::json!({
            "message_id": 1,
            "from": {"id": 5, "is_bot": false, "first_name": "A"},
            "chat": {"id": 5, "type": "private"},
            "voice": {"file_id": "v", "duration": 3}
        })))
        .unwrap();

        assert_eq!(event, Event::Unsupported);
    }
}
