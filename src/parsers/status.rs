pub const DEFAULT_UNAVAILABLE: &str = "No availability";
pub const DEFAULT_WAITLIST: &str = "Waitlist Open";

/// The two fixed listing texts that mean "no slot to act on". Matched exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinels {
    pub unavailable: String,
    pub waitlist: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            unavailable: DEFAULT_UNAVAILABLE.to_string(),
            waitlist: DEFAULT_WAITLIST.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Empty,
    Unavailable,
    Waitlist,
    Actionable,
}

impl StatusClass {
    pub fn is_actionable(self) -> bool {
        self == StatusClass::Actionable
    }
}

impl Sentinels {
    pub fn classify(&self, status: &str) -> StatusClass {
        if status.is_empty() {
            StatusClass::Empty
        } else if status == self.unavailable {
            StatusClass::Unavailable
        } else if status == self.waitlist {
            StatusClass::Waitlist
        } else {
            StatusClass::Actionable
        }
    }
}
