//! Format Module - value-to-string transforms
//!
//! - `formatter`: formatter ids, categories, type-based filtering
//! - `engine`: `FormatterEngine` and the `format` entry point
//! - `locale`: static per-locale rules (separators, months, clock)
//! - `value`: stringification, numeric coercion, type inference
//! - `number` / `date`: the rendering primitives
//!
//! ```text
//! raw Value ──► FormatterId::from_id ──► numeric / dated / string path
//!                     │ unknown                     │ input doesn't fit
//!                     ▼                             ▼
//!              stringify(value) ◄──────────────────┘
//! ```

mod date;
mod engine;
mod formatter;
mod locale;
mod number;
mod value;

pub use date::parse_value as parse_date;
pub use engine::{format, FormatterEngine};
pub use formatter::{formatters_for, FormatterCategory, FormatterId};
pub use locale::{Currency, Locale, LocaleRules};
pub use value::{as_number, infer_type_from_value, preview, sample_value, stringify};
