//! chatdialog - windowed dialogs for chat bots
//!
//! Windows are built from widgets: text, buttons, media, reply prompts and
//! scrolling text that pages itself to fit a message. The dialog runtime
//! renders the current window per session, routes button presses and typed
//! messages to widgets, and decides whether each render edits the message
//! on screen or sends a new one. Delivery is left to a `Transport`.

pub mod config;
pub mod context;
pub mod data;
pub mod dialog;
pub mod error;
pub mod event;
pub mod media;
pub mod pager;
pub mod paginate;
pub mod paths;
pub mod transport;
pub mod when;
pub mod widgets;
pub mod window;

pub use config::DialogConfig;
pub use context::{ContextStore, MemoryContextStore, SessionContext, SessionId};
pub use data::Data;
pub use dialog::Dialog;
pub use error::{DialogError, Result, TransportError};
pub use event::{CallbackQuery, Event, InboundMessage, MessageId, RenderContext, ShowMode};
pub use transport::{Delivered, Transport};
pub use when::{When, Whenable};
pub use window::{RenderDecision, RenderMode, ReplyMarkup, Window};
