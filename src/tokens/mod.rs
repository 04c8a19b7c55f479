//! Token model and tokenization sync.
//!
//! The external tokenizer reports a [`TokenStream`] for the serialized value.
//! [`TokenSync`] decides when to ask for one, and [`layout_chips`] turns the
//! decoded [`Token`]s into inline chip spans.

mod chips;
mod stream;
mod sync;

pub use chips::{chip_at, layout_chips, Chip};
pub use stream::{Token, TokenKind, TokenStream, START_OFFSET_INDEX, TUPLE_LEN};
pub use sync::{RefreshReason, RequestMeta, Resolution, TokenSync};
