//! Periodic data refresh.

use std::time::Duration;

use iced::Subscription;

use crate::message::Message;

/// Emit [`Message::Refresh`] every `period`.
pub fn refresh_subscription(period: Duration) -> Subscription<Message> {
    iced::time::every(period.max(Duration::from_millis(100))).map(|_| Message::Refresh)
}
