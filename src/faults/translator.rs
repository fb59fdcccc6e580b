use tracing::{debug, warn};

use crate::catalog::{ErrorCode, ErrorRecord, render};
use crate::faults::FaultPattern;
use crate::types::{AdditionalInformation, Fault, RemoteFailure};

/// Outcome of classifying a failure, before the message is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub code: ErrorCode,
    pub additional_information: Option<AdditionalInformation>,
}

impl Classification {
    pub fn render(&self) -> ErrorRecord {
        render(self.code, self.additional_information.as_ref())
    }
}

/// Turns raised remote failures into catalog error records.
///
/// Holds the connection identity (organisation and username) reported for
/// transport failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultTranslator {
    organisation: String,
    username: String,
}

impl FaultTranslator {
    pub fn new(organisation: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            organisation: organisation.into(),
            username: username.into(),
        }
    }

    pub fn translate(
        &self,
        failure: &RemoteFailure,
        context: Option<AdditionalInformation>,
    ) -> ErrorRecord {
        self.classify(failure, context).render()
    }

    pub fn classify(
        &self,
        failure: &RemoteFailure,
        context: Option<AdditionalInformation>,
    ) -> Classification {
        match failure {
            RemoteFailure::Transport { status, reason } => {
                debug!(?status, %reason, "transport failure reported as not authenticated");
                Classification {
                    code: ErrorCode::NotAuthenticated,
                    additional_information: Some(self.identity()),
                }
            }
            RemoteFailure::Fault(fault) => classify_fault(fault, context),
        }
    }

    fn identity(&self) -> AdditionalInformation {
        AdditionalInformation::Text(format!(
            "Organisation: {}, username: {}",
            self.organisation, self.username
        ))
    }
}

fn is_blank(info: Option<&AdditionalInformation>) -> bool {
    info.is_none_or(AdditionalInformation::is_empty)
}

fn campaign_id(info: Option<&AdditionalInformation>) -> Option<AdditionalInformation> {
    let text = info?.to_string();
    FaultPattern::CampaignIdFromContext
        .capture(&text)
        .map(|id| AdditionalInformation::Text(format!("Campaign id: {id}")))
}

fn catalog_code(raw: Option<i64>) -> Option<ErrorCode> {
    // faultCode 0 carries no information.
    let raw = raw.filter(|c| *c != 0)?;
    let code = ErrorCode::from_code(raw);
    if code.is_none() {
        warn!(fault_code = raw, "fault code has no catalog entry");
    }
    code
}

fn classify_fault(fault: &Fault, context: Option<AdditionalInformation>) -> Classification {
    let text = fault.text();
    let mut code = catalog_code(fault.code);
    let mut info = context;

    if code == Some(ErrorCode::RequestNotProcessed) {
        if text.contains("invalid input syntax for integer") {
            code = Some(ErrorCode::InvalidIntegerSyntax);
            if let Some(value) = FaultPattern::ExpectedInteger.capture(text) {
                info = Some(AdditionalInformation::Text(format!(
                    "Input value: {}",
                    value.trim_end_matches(' ')
                )));
            }
        } else if text.contains("column") && text.contains("does not exist") {
            code = Some(ErrorCode::ColumnDoesNotExist);
            if let Some(column) = FaultPattern::ColumnDoesNotExist.capture(text) {
                info = Some(AdditionalInformation::Text(format!("Column name: {column}")));
            }
        } else if text.contains("Campaign has not been published") {
            code = Some(ErrorCode::CampaignNotPublished);
            if let Some(campaign) = campaign_id(info.as_ref()) {
                info = Some(campaign);
            }
        }
        if is_blank(info.as_ref()) {
            info = Some(AdditionalInformation::Text(text.to_string()));
        }
        debug!(?code, "reclassified undeclared fault 200");
    }

    // 208 is also raised for campaigns that do not exist.
    if code == Some(ErrorCode::PermissionDenied) && text.contains("object_name=campaign") {
        code = Some(ErrorCode::ObjectNotFound);
        if let Some(campaign) = campaign_id(info.as_ref()) {
            info = Some(campaign);
        }
        debug!("reclassified campaign permission fault 208 as 207");
    }

    let code = code.unwrap_or_else(|| {
        if fault.message.contains("cannot marshal None") {
            ErrorCode::CannotMarshalNone
        } else {
            ErrorCode::Unknown
        }
    });

    if matches!(code, ErrorCode::RequestNotProcessed | ErrorCode::Unknown) {
        info = Some(AdditionalInformation::Text(text.to_string()));
    }

    Classification {
        code,
        additional_information: info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> FaultTranslator {
        FaultTranslator::new("acme", "api-user")
    }

    fn fault(code: i64, text: &str) -> RemoteFailure {
        RemoteFailure::Fault(Fault::new(code, text))
    }

    fn lcg_next(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        *state
    }

    #[test]
    fn integer_syntax_is_reclassified_with_input_value() {
        let failure = fault(
            200,
            "ERROR:  invalid input syntax for integer: 'abc' [for Statement \"SELECT 1\"]",
        );
        let classification = translator().classify(&failure, None);
        assert_eq!(classification.code, ErrorCode::InvalidIntegerSyntax);
        assert_eq!(
            classification.additional_information,
            Some(AdditionalInformation::from("Input value: 'abc'"))
        );
        assert_eq!(
            classification.render().message,
            "Invalid input syntax for integer. Input value: 'abc'."
        );
    }

    #[test]
    fn unknown_column_is_reclassified_with_column_name() {
        let failure = fault(200, "ERROR:  column core_3.emial does not exist LINE 1");
        let record = translator().translate(&failure, Some("Core table id: 3".into()));
        assert_eq!(record.code, ErrorCode::ColumnDoesNotExist);
        assert_eq!(
            record.message,
            "Column does not exist. Column name: core_3.emial."
        );
    }

    #[test]
    fn unknown_column_without_match_keeps_caller_context() {
        let failure = fault(200, "the column you asked for does not exist");
        let record = translator().translate(&failure, Some("Core table id: 3".into()));
        assert_eq!(record.code, ErrorCode::ColumnDoesNotExist);
        assert_eq!(record.message, "Column does not exist. Core table id: 3.");
    }

    #[test]
    fn unpublished_campaign_extracts_id_from_context() {
        let failure = fault(200, "Campaign has not been published");
        let context = "Core table id: 1, campaign id: 42, email_address: a@b.co, transaction data: {}";
        let record = translator().translate(&failure, Some(context.into()));
        assert_eq!(record.code, ErrorCode::CampaignNotPublished);
        assert_eq!(
            record.message,
            "Campaign has not been published. Campaign id: 42."
        );
    }

    #[test]
    fn unpublished_campaign_without_context_dumps_fault_text() {
        let failure = fault(200, "Campaign has not been published");
        let classification = translator().classify(&failure, None);
        assert_eq!(classification.code, ErrorCode::CampaignNotPublished);
        assert_eq!(
            classification.additional_information,
            Some(AdditionalInformation::from("Campaign has not been published"))
        );
    }

    #[test]
    fn unrecognised_200_always_surfaces_raw_text() {
        let failure = fault(200, "Perl module exploded at line 12");
        let record = translator().translate(&failure, Some("Contact id: 5".into()));
        assert_eq!(record.code, ErrorCode::RequestNotProcessed);
        assert_eq!(
            record.message,
            "Request could not be processed. Perl module exploded at line 12."
        );
    }

    #[test]
    fn campaign_permission_fault_becomes_object_not_found() {
        let failure = fault(
            208,
            "Permission denied: object_name=campaign object_id=77",
        );
        let context = "Core table id: 1, campaign id: 77, email_address: None, transaction data: {}";
        let record = translator().translate(&failure, Some(context.into()));
        assert_eq!(record.code, ErrorCode::ObjectNotFound);
        assert_eq!(record.message, "Object not found. Campaign id: 77.");
    }

    #[test]
    fn non_campaign_permission_fault_is_kept() {
        let failure = fault(208, "Permission denied: object_name=list object_id=9");
        let record = translator().translate(&failure, Some("List id: 9".into()));
        assert_eq!(record.code, ErrorCode::PermissionDenied);
        assert_eq!(record.message, ErrorCode::PermissionDenied.template());
    }

    #[test]
    fn transport_failure_is_not_authenticated_regardless_of_context() {
        let failure = RemoteFailure::Transport {
            status: Some(401),
            reason: "Unauthorized".to_string(),
        };
        let record = translator().translate(&failure, Some("campaign id: 1,".into()));
        assert_eq!(record.code, ErrorCode::NotAuthenticated);
        assert_eq!(
            record.message,
            "Not authenticated. Organisation: acme, username: api-user."
        );
        assert_eq!(translator().translate(&failure, None), record);
    }

    #[test]
    fn missing_code_marshal_none() {
        let failure = RemoteFailure::Fault(Fault::uncoded("cannot marshal None unless allow_none is enabled"));
        let record = translator().translate(&failure, None);
        assert_eq!(record.code, ErrorCode::CannotMarshalNone);
        assert_eq!(record.message, ErrorCode::CannotMarshalNone.template());
    }

    #[test]
    fn missing_code_falls_back_to_unknown_with_text() {
        let failure = RemoteFailure::Fault(Fault::uncoded("connection reset by peer"));
        let record = translator().translate(&failure, Some("Contact id: 1".into()));
        assert_eq!(record.code, ErrorCode::Unknown);
        assert_eq!(
            record.message,
            "Unknown error. Did not recognise fault code or error message. connection reset by peer."
        );
    }

    #[test]
    fn zero_and_uncatalogued_codes_are_treated_as_missing() {
        let zero = fault(0, "whatever");
        assert_eq!(translator().translate(&zero, None).code, ErrorCode::Unknown);

        let uncatalogued = fault(999, "brand new fault");
        let record = translator().translate(&uncatalogued, None);
        assert_eq!(record.code, ErrorCode::Unknown);
        assert!(record.message.ends_with("brand new fault."));
    }

    #[test]
    fn declared_code_passes_through_with_context() {
        let failure = fault(207, "Object not found");
        let record = translator().translate(&failure, Some("Contact id: 12".into()));
        assert_eq!(record.code, ErrorCode::ObjectNotFound);
        assert_eq!(record.message, "Object not found. Contact id: 12.");
    }

    #[test]
    fn empty_fault_string_uses_generic_message() {
        let failure = RemoteFailure::Fault(Fault {
            code: Some(200),
            fault_string: String::new(),
            message: "invalid input syntax for integer: 12x".to_string(),
        });
        let classification = translator().classify(&failure, None);
        assert_eq!(classification.code, ErrorCode::InvalidIntegerSyntax);
        assert_eq!(
            classification.additional_information,
            Some(AdditionalInformation::from("Input value: 12x"))
        );
    }

    #[test]
    fn translation_is_deterministic_for_randomized_inputs() {
        let codes = [0, 101, 200, 207, 208, 301, 999, -32700];
        let texts = [
            "invalid input syntax for integer: 'x'",
            "column a.b does not exist",
            "Campaign has not been published",
            "object_name=campaign object_id=3",
            "",
            "random failure",
        ];
        let contexts = [None, Some("campaign id: 9, x"), Some(""), Some("Contact id: 3")];
        let mut seed = 0x5EED_u64;

        for _ in 0..5_000 {
            let code = codes[(lcg_next(&mut seed) % codes.len() as u64) as usize];
            let text = texts[(lcg_next(&mut seed) % texts.len() as u64) as usize];
            let context = contexts[(lcg_next(&mut seed) % contexts.len() as u64) as usize];
            let failure = fault(code, text);

            let first = translator().translate(&failure, context.map(Into::into));
            let second = translator().translate(&failure, context.map(Into::into));
            assert_eq!(first, second);
            assert!(!first.message.is_empty());
            if matches!(first.code, ErrorCode::RequestNotProcessed | ErrorCode::Unknown)
                && !text.is_empty()
            {
                assert!(first.message.contains(text), "{first:?} lost {text:?}");
            }
        }
    }
}
