/// A slot alert waiting to be delivered. Built by the detector, consumed by the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub entity: String,
    pub status: String,
    pub source_url: String,
}
