#![deny(unsafe_code)]

//! Assistant message reveal and attachment disclosure for the fibra chat panel.
//!
//! A [`ConversationView`] owns one [`MessageView`] per message. Freshly produced assistant
//! answers reveal one character per tick, then wait a short grace delay before their
//! attachments become eligible for disclosure. Attachments stay hidden until the user answers
//! the disclosure prompt.

pub mod attachments;
pub mod clipboard;
pub mod conversation;
pub mod disclosure;
pub mod freshness;
pub mod message;
pub mod scroll;
pub mod session;
pub mod timer;
pub mod video;
pub mod view;

pub use attachments::{
    AttachmentGroups, AttachmentPayload, FiberCard, GroupKind, ImageAttachment, VideoAttachment,
};
pub use clipboard::{Clipboard, ClipboardError, CopyFeedback, CopyIndicator};
pub use conversation::ConversationView;
pub use disclosure::{
    Consent, DisclosedItem, DisclosedSection, Disclosure, DisclosureGate, DisclosurePrompt,
    ImageSource,
};
pub use freshness::AnimationLedger;
pub use message::{Message, MessageId, MessageIdentity, Role};
pub use scroll::{ScrollManager, ScrollSync};
pub use session::{RevealMode, RevealSession, RevealState, RevealStep};
pub use timer::{RevealKey, RevealSignal, RevealSignalKind, RevealTimer, RevealTiming};
pub use video::{extract_video_id, resolve_thumbnail};
pub use view::{MessageRender, MessageView};
