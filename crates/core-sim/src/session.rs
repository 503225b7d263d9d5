use serde::{Deserialize, Serialize};

/// Trading window within a day. Morning runs before night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionLabel {
    Morning,
    Night,
}

impl SessionLabel {
    pub const IN_DAY_ORDER: [SessionLabel; 2] = [Self::Morning, Self::Night];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Night => "night",
        }
    }
}
