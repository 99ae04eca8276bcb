//! Expression Module - binding expressions (`Hello {{name|titlecase}}!`)
//!
//! - `expression`: `Expression`, `Segment`, ids and in-place edits
//! - `codec`: two-state scanner (parse) and serializer, parse cache
//! - `render`: field lookup + formatter application for previews
//!
//! Data flow:
//! ```text
//! raw string ──parse──► Expression ──serialize──► raw string
//!                           │
//!                  edits (append/update/remove/move)
//!                           │
//!                           ▼
//!              render(values | catalog samples) ──► display string
//! ```

mod codec;
mod expression;
mod render;

pub use codec::{parse, parse_with, serialize, serialize_with, Codec, Syntax};
pub use expression::{Expression, Segment, SegmentId, SegmentKind, SegmentUpdate};
pub use render::{preview, render, ValueLookup};
