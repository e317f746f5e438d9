use chrono::{DateTime, Local};
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::models::NotificationEvent;

pub const EMOJI_ALERT: &str = "🚨";
pub const EMOJI_DATE: &str = "📅";
pub const EMOJI_PLACE: &str = "📍";
pub const EMOJI_LINK: &str = "🔗";
pub const EMOJI_CLOCK: &str = "🕒";

/// Render an event as Telegram HTML. Every interpolated value is escaped.
pub fn format_message(
    event: &NotificationEvent,
    locality: &str,
    category: &str,
    detected_at: DateTime<Local>,
) -> String {
    let lines = [
        format!("{} <b>{}</b> slot available", EMOJI_ALERT, encode_text(&event.entity)),
        format!("{} Earliest: <b>{}</b>", EMOJI_DATE, encode_text(&event.status)),
        format!("{} {} / {}", EMOJI_PLACE, encode_text(locality), encode_text(category)),
        format!(
            "{} <a href=\"{}\">Open listing</a>",
            EMOJI_LINK,
            encode_double_quoted_attribute(&event.source_url)
        ),
        format!("{} Detected: {}", EMOJI_CLOCK, detected_at.format("%Y-%m-%d %H:%M:%S")),
    ];
    lines.join("\n")
}
