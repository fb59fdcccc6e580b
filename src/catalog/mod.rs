//! The closed set of error codes the client can report and their message templates.
//!
//! Codes come from four authorities that never overlap:
//!
//! | Range            | Authority    | Meaning                                         |
//! |------------------|--------------|-------------------------------------------------|
//! | 200              | `Undeclared` | catch-all remote fault, reclassified if possible |
//! | 101-401          | `Declared`   | published MessageFocus fault codes              |
//! | -32768..=-32000  | `Protocol`   | XML-RPC specification fault codes               |
//! | 4096-8192        | `Client`     | faults raised by this client                    |
//!
//! The code numbers and template strings are part of the public contract.

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::error::Error;
use crate::types::AdditionalInformation;

/// Slot in a template that is replaced by the rendered additional information.
pub const PLACEHOLDER: &str = "%s";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::EnumIter,
)]
#[serde(into = "i64", try_from = "i64")]
#[repr(i32)]
pub enum ErrorCode {
    RequestNotProcessed = 200,

    SystemUnavailable = 101,
    SystemDisabled = 102,
    MalformedRequest = 201,
    UnknownNamespace = 202,
    UnknownMethod = 203,
    InvalidArgument = 204,
    FieldNotModifiable = 205,
    InvalidOption = 206,
    ObjectNotFound = 207,
    PermissionDenied = 208,
    UserNotFound = 209,
    UnrecognisedEncoding = 210,
    InvalidCoreTableField = 211,
    InvalidContactEmail = 214,
    AuthenticationRequired = 301,
    NotAuthorised = 302,
    OverQuota = 303,
    TooManyRequests = 304,
    AccountDisabled = 305,
    AuthorizationFailed = 401,

    ParseNotWellFormed = -32700,
    ParseUnsupportedEncoding = -32701,
    ParseInvalidCharacter = -32702,
    InvalidXmlRpc = -32600,
    MethodNotFound = -32601,
    InvalidMethodParameters = -32602,
    InternalXmlRpcError = -32603,
    ApplicationError = -32500,
    SystemError = -32400,
    TransportError = -32300,

    Unknown = 4096,
    InvalidIntegerSyntax = 4101,
    ColumnDoesNotExist = 4201,
    MissingEmailField = 4301,
    InvalidCoreTableId = 4401,
    InvalidListId = 4402,
    InvalidContactId = 4403,
    InvalidEmailAddress = 4404,
    InvalidFtpAddress = 4405,
    MissingParameters = 4499,
    CampaignNotPublished = 4501,
    NotAuthenticated = 5101,
    CannotMarshalNone = 5102,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum CodeAuthority {
    Undeclared,
    Declared,
    Protocol,
    Client,
}

impl ErrorCode {
    pub fn code(self) -> i64 {
        i64::from(self as i32)
    }

    /// Look up the catalog entry for a raw numeric code.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::iter().find(|c| c.code() == code)
    }

    pub fn authority(self) -> CodeAuthority {
        match self.code() {
            200 => CodeAuthority::Undeclared,
            -32768..=-32000 => CodeAuthority::Protocol,
            4096..=8192 => CodeAuthority::Client,
            _ => CodeAuthority::Declared,
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            Self::RequestNotProcessed => "Request could not be processed. %s.",

            Self::SystemUnavailable => {
                "System temporarily unavailable.You may wish to repeat your request again later."
            }
            Self::SystemDisabled => "The system is currently disabled.",
            Self::MalformedRequest => "Request was malformed or not understood.",
            Self::UnknownNamespace => "The namespace you called a method on does not exist.",
            Self::UnknownMethod => "The method you called does not exist.",
            Self::InvalidArgument => {
                "Argument invalid or of incorrect type, e.g. you have passed a String where a Struct is expected."
            }
            Self::FieldNotModifiable => {
                "Operation cannot be performed on this field, e.g. you are trying to update an object ID"
            }
            Self::InvalidOption => {
                "Unknown or invalid option, e.g. incorrect pagination parameters."
            }
            Self::ObjectNotFound => "Object not found. %s.",
            Self::PermissionDenied => {
                "Permission denied for object. The object may exist but cannot be accessed by the API user."
            }
            Self::UserNotFound => "No user found with that email address",
            Self::UnrecognisedEncoding => {
                "The character encoding for your import data is not recognised by MessageFocus."
            }
            Self::InvalidCoreTableField => "A core table field name is not valid.",
            Self::InvalidContactEmail => "Invalid contact email.",
            Self::AuthenticationRequired => "You must be authenticated to use this resource.",
            Self::NotAuthorised => "You are not authorised to perform that operation.",
            Self::OverQuota => "Your account is over quota.",
            Self::TooManyRequests => "Your account is making requests too frequently.",
            Self::AccountDisabled => "Your account is currently disabled.",
            Self::AuthorizationFailed => "Authorization failed. Please check your credentials",

            Self::ParseNotWellFormed => "Parse error. Not well formed.",
            Self::ParseUnsupportedEncoding => "Parse error. Unsupported encoding.",
            Self::ParseInvalidCharacter => "Parse error. Invalid character for encoding.",
            Self::InvalidXmlRpc => {
                "Server error. Invalid XML-RPC. Not conforming to specification."
            }
            Self::MethodNotFound => "Server error. Requested method not found.",
            Self::InvalidMethodParameters => "Server error. Invalid method parameters.",
            Self::InternalXmlRpcError => "Server error. Internal XML-RPC error.",
            Self::ApplicationError => "Application error.",
            Self::SystemError => "System error.",
            Self::TransportError => "Transport error.",

            Self::Unknown => {
                "Unknown error. Did not recognise fault code or error message. %s."
            }
            Self::InvalidIntegerSyntax => "Invalid input syntax for integer. %s.",
            Self::ColumnDoesNotExist => "Column does not exist. %s.",
            Self::MissingEmailField => "Missing email field. %s.",
            Self::InvalidCoreTableId => "Invalid core table id. %s.",
            Self::InvalidListId => "Invalid list id. %s.",
            Self::InvalidContactId => "Invalid contact id. %s.",
            Self::InvalidEmailAddress => "Invalid email address. %s.",
            Self::InvalidFtpAddress => "Invalid ftp address. %s.",
            Self::MissingParameters => "Missing necessary input parameters. %s.",
            Self::CampaignNotPublished => "Campaign has not been published. %s.",
            Self::NotAuthenticated => "Not authenticated. %s.",
            Self::CannotMarshalNone => "Cannot pass None values unless enabled in xmlrpclib.",
        }
    }

    pub fn has_placeholder(self) -> bool {
        self.template().contains(PLACEHOLDER)
    }
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<i64> for ErrorCode {
    type Error = Error;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(Error::UnknownCode { code })
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One translated failure: a stable code plus the rendered human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ErrorRecord {
    pub code: ErrorCode,
    pub message: String,
}

/// Render the catalog message for `code`.
///
/// Context is substituted into the first placeholder when the template has one
/// and the context is non-empty; otherwise it is ignored.
pub fn render(code: ErrorCode, info: Option<&AdditionalInformation>) -> ErrorRecord {
    let template = code.template();
    let message = match info {
        Some(info) if !info.is_empty() && code.has_placeholder() => {
            template.replacen(PLACEHOLDER, &info.to_string(), 1)
        }
        _ => template.to_string(),
    };
    ErrorRecord { code, message }
}
