pub mod translator;

use std::sync::LazyLock;

use regex::Regex;

pub use translator::{Classification, FaultTranslator};

#[expect(
    clippy::expect_used,
    reason = "patterns are string literals; a bad one is a build-time defect"
)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("fault pattern must compile")
}

static EXPECTED_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"invalid input syntax for integer: ([^\[]*)"));
static COLUMN_DOES_NOT_EXIST: LazyLock<Regex> =
    LazyLock::new(|| compile(r"column ([^.]+\.[^\s]+) does not exist"));
static PERMISSION_OBJECT_ID: LazyLock<Regex> = LazyLock::new(|| compile(r"object_id=([0-9]+)"));
static CAMPAIGN_ID_FROM_CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"campaign id: ([^,]+),"));

/// Extractors for structured fragments of free-text fault strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumIter, strum_macros::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FaultPattern {
    /// Offending literal of a failed integer coercion.
    ExpectedInteger,
    /// `table.column` of an unknown-column SQL error.
    ColumnDoesNotExist,
    /// Numeric object id of a permission-denied fault. Not used for reclassification.
    PermissionObjectId,
    /// Campaign id embedded in caller-built context, not in the fault text.
    CampaignIdFromContext,
}

impl FaultPattern {
    fn regex(self) -> &'static Regex {
        match self {
            Self::ExpectedInteger => &*EXPECTED_INTEGER,
            Self::ColumnDoesNotExist => &*COLUMN_DOES_NOT_EXIST,
            Self::PermissionObjectId => &*PERMISSION_OBJECT_ID,
            Self::CampaignIdFromContext => &*CAMPAIGN_ID_FROM_CONTEXT,
        }
    }

    /// First capture of the pattern's group in `text`, if it matches at all.
    pub fn capture(self, text: &str) -> Option<&str> {
        self.regex()
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}
