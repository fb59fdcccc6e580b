use std::fmt;

/// A failed remote call, already discriminated by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    /// Connection or protocol-level failure. No fault code is available.
    Transport {
        /// HTTP status reported by the transport, if any.
        status: Option<u16>,
        /// Transport's own description of the failure.
        reason: String,
    },
    /// The service answered with an XML-RPC fault.
    Fault(Fault),
}

/// An XML-RPC fault as raised by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fault {
    /// `faultCode`, absent when the failure was raised client-side by the RPC layer.
    pub code: Option<i64>,
    /// `faultString`; may be empty.
    pub fault_string: String,
    /// Generic failure message, used when `fault_string` is empty.
    pub message: String,
}

impl Fault {
    pub fn new(code: i64, fault_string: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            fault_string: fault_string.into(),
            message: String::new(),
        }
    }

    /// A fault without a code, e.g. a marshalling error raised before the request left.
    pub fn uncoded(message: impl Into<String>) -> Self {
        Self {
            code: None,
            fault_string: String::new(),
            message: message.into(),
        }
    }

    /// Text inspected by the translator: `fault_string`, or the generic message when empty.
    pub fn text(&self) -> &str {
        if self.fault_string.is_empty() {
            &self.message
        } else {
            &self.fault_string
        }
    }
}

impl From<Fault> for RemoteFailure {
    fn from(fault: Fault) -> Self {
        Self::Fault(fault)
    }
}

/// Caller- or extraction-supplied context merged into a message template.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AdditionalInformation {
    Text(String),
    /// Ordered values; rendered comma-separated, strings without quotes.
    Values(Vec<serde_json::Value>),
}

impl AdditionalInformation {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Values(v) => v.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Values(_) => None,
        }
    }
}

impl fmt::Display for AdditionalInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Values(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match value {
                        serde_json::Value::String(s) => f.write_str(s)?,
                        other => write!(f, "{other}")?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<String> for AdditionalInformation {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for AdditionalInformation {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<serde_json::Value>> for AdditionalInformation {
    fn from(values: Vec<serde_json::Value>) -> Self {
        Self::Values(values)
    }
}
