//! Format - シリアライズ形式の登録と content negotiation

pub mod content_type;
pub mod negotiate;
pub mod registry;

pub use self::content_type::ContentType;
pub use self::negotiate::{MediaRange, negotiate, negotiate_decoder, parse_media_ranges};
pub use self::registry::FormatRegistry;
