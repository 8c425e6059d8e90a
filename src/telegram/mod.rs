mod bot;
mod types;

pub use bot::{Bot, SendError};
pub use types::{Chat, Document, Message, PhotoSize, Sticker, Update, User};
