pub mod config;
pub mod contact;

use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog::{ErrorCode, ErrorRecord, render};
use crate::envelope::{ASSOCIATION_OUTCOMES, Envelope, IMPORT_OUTCOMES, interpret_reply};
use crate::faults::FaultTranslator;
use crate::filter::{TABLE_FILTER, filter_results};
use crate::types::{AdditionalInformation, RemoteFailure};

use config::ClientConfig;
use contact::{
    CallConfirmation, ContactConfirmation, LaunchReference, check_email, check_id,
    clean_contact_data, invalid_input,
};

/// Performs XML-RPC calls against the MessageFocus API.
///
/// Implementations discriminate their own failures into [`RemoteFailure`].
pub trait Transport {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RemoteFailure>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RemoteFailure> {
        (**self).call(method, params)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RemoteFailure> {
        (**self).call(method, params)
    }
}

fn envelope<T>(body: impl FnOnce() -> Result<Vec<T>, ErrorRecord>) -> Envelope<T> {
    body().into()
}

fn unexpected_reply(reply: &Value) -> ErrorRecord {
    tracing::warn!(%reply, "unexpected remote reply shape");
    render(
        ErrorCode::Unknown,
        Some(&AdditionalInformation::Values(vec![reply.clone()])),
    )
}

fn into_rows(reply: Value) -> Vec<Value> {
    match reply {
        Value::Array(rows) => rows,
        other => vec![other],
    }
}

pub struct MessageFocusClient<T> {
    config: ClientConfig,
    translator: FaultTranslator,
    transport: T,
}

impl<T: Transport> MessageFocusClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let translator = config.translator();
        Self {
            config,
            translator,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn translator(&self) -> &FaultTranslator {
        &self.translator
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call(
        &self,
        method: &str,
        params: Vec<Value>,
        context: Option<String>,
    ) -> Result<Value, ErrorRecord> {
        debug!(method, "remote call");
        self.transport.call(method, params).map_err(|failure| {
            let record = self
                .translator
                .translate(&failure, context.map(AdditionalInformation::Text));
            debug!(method, code = %record.code, "remote call failed");
            record
        })
    }

    /// Add a contact to a core table. Data-table fields are prefixed with the
    /// table id, e.g. `"2.field_name"`. An existing contact with the same email
    /// is reported as added with its existing id.
    pub fn add_contact_to_core_table(
        &self,
        core_table_id: i64,
        contact_data: &Map<String, Value>,
    ) -> Envelope<ContactConfirmation> {
        envelope(|| {
            let Some(email) = contact_data.get("email") else {
                let fields: Vec<&str> = contact_data.keys().map(String::as_str).collect();
                return Err(render(
                    ErrorCode::MissingEmailField,
                    Some(&AdditionalInformation::Text(format!(
                        "Saw fields: {}",
                        fields.join(", ")
                    ))),
                ));
            };
            if !email.as_str().is_some_and(contact::is_email_shaped) {
                return Err(render(
                    ErrorCode::InvalidEmailAddress,
                    Some(&AdditionalInformation::Text(format!("Field value: {email}"))),
                ));
            }
            check_id(core_table_id, ErrorCode::InvalidCoreTableId)?;

            let cleaned = clean_contact_data(contact_data);
            let context = format!(
                "Core table id: {core_table_id}, contact data: {}",
                Value::Object(cleaned.clone())
            );
            let reply = self.call(
                "contact.create",
                vec![Value::from(core_table_id), Value::Object(cleaned)],
                Some(context),
            )?;
            let contact_id = reply.as_i64().ok_or_else(|| unexpected_reply(&reply))?;
            Ok(vec![ContactConfirmation {
                message: "Added".to_string(),
                contact_id,
            }])
        })
    }

    /// Associate an existing contact with a list.
    pub fn associate_contact_with_list(
        &self,
        contact_id: i64,
        list_id: i64,
    ) -> Envelope<ContactConfirmation> {
        envelope(|| {
            check_id(list_id, ErrorCode::InvalidListId)?;
            let reply = self.call(
                "contact.addList",
                vec![Value::from(contact_id), Value::from(list_id)],
                Some(format!("Contact id: {contact_id}, list id: {list_id}")),
            )?;
            let message = interpret_reply(&reply, ASSOCIATION_OUTCOMES)?;
            Ok(vec![ContactConfirmation {
                message: message.to_string(),
                contact_id,
            }])
        })
    }

    /// Ensure the contact exists in the core table, then associate it with the list.
    pub fn add_contact_to_list(
        &self,
        core_table_id: i64,
        list_id: i64,
        contact_data: &Map<String, Value>,
    ) -> Envelope<ContactConfirmation> {
        self.add_contact_to_core_table(core_table_id, contact_data)
            .and_then_first(|added| self.associate_contact_with_list(added.contact_id, list_id))
    }

    /// Request a batched import of a data file reachable over FTP.
    pub fn import_contacts(
        &self,
        core_table_id: i64,
        list_id: i64,
        data_file_url: &str,
        csv_column_map: &Map<String, Value>,
        notification_email_address: Option<&str>,
    ) -> Envelope<CallConfirmation> {
        envelope(|| {
            check_id(core_table_id, ErrorCode::InvalidCoreTableId)?;
            check_id(list_id, ErrorCode::InvalidListId)?;
            if !data_file_url.contains("ftp") {
                return Err(invalid_input(ErrorCode::InvalidFtpAddress, data_file_url));
            }

            let mut options = serde_json::json!({
                "list_id": list_id,
                "dedupe_type": "overwrite",
                "field_map": csv_column_map,
                "delete_after_import": false,
            });
            if let Some(notify) = notification_email_address.filter(|n| !n.is_empty()) {
                options["notify_user"] = Value::from(notify);
            }

            let fields: Vec<&str> = csv_column_map.keys().map(String::as_str).collect();
            let context = format!(
                "Core table id: {core_table_id}, list id: {list_id}, data file url: {data_file_url}, attempting to map fields: [{}], notifying: {}",
                fields.join(", "),
                notification_email_address.unwrap_or("nobody")
            );
            let reply = self.call(
                "contact.import",
                vec![
                    Value::from(core_table_id),
                    Value::from(data_file_url),
                    options,
                ],
                Some(context),
            )?;
            let message = interpret_reply(&reply, IMPORT_OUTCOMES)?;
            Ok(vec![CallConfirmation {
                message: message.to_string(),
                value: reply,
            }])
        })
    }

    /// Core table record of a contact.
    pub fn get_core_data_for_contact_id(&self, contact_id: i64) -> Envelope<Value> {
        envelope(|| {
            check_id(contact_id, ErrorCode::InvalidContactId)?;
            let reply = self.call(
                "contact.get",
                vec![Value::from(contact_id)],
                Some(format!("Contact id: {contact_id}")),
            )?;
            Ok(vec![reply])
        })
    }

    /// Core table records matching an email address; an empty search is
    /// reported as object not found.
    pub fn get_core_data_for_email_address(
        &self,
        core_table_id: i64,
        email_address: &str,
    ) -> Envelope<Value> {
        envelope(|| self.search_by_email(core_table_id, email_address))
    }

    fn search_by_email(
        &self,
        core_table_id: i64,
        email_address: &str,
    ) -> Result<Vec<Value>, ErrorRecord> {
        check_id(core_table_id, ErrorCode::InvalidCoreTableId)?;
        check_email(email_address)?;
        let reply = self.call(
            "contact.search",
            vec![
                Value::from(core_table_id),
                serde_json::json!({ "email": email_address }),
            ],
            Some(format!(
                "Core table id: {core_table_id}, email address: {email_address}"
            )),
        )?;
        let Value::Array(rows) = reply else {
            return Err(unexpected_reply(&reply));
        };
        if rows.is_empty() {
            return Err(render(
                ErrorCode::ObjectNotFound,
                Some(&AdditionalInformation::Text(format!(
                    "Email address: {email_address}"
                ))),
            ));
        }
        Ok(rows)
    }

    fn lists_of(&self, contact_id: i64, context: String) -> Result<Vec<Value>, ErrorRecord> {
        let reply = self.call("contact.lists", vec![Value::from(contact_id)], Some(context))?;
        Ok(into_rows(reply))
    }

    /// Ids of the lists a contact belongs to.
    pub fn get_lists_for_contact_id(&self, contact_id: i64) -> Envelope<Value> {
        envelope(|| {
            check_id(contact_id, ErrorCode::InvalidContactId)?;
            self.lists_of(contact_id, format!("Contact id: {contact_id}"))
        })
    }

    /// Ids of the lists of the first contact matching an email address.
    pub fn get_lists_for_email_address(
        &self,
        core_table_id: i64,
        email_address: &str,
    ) -> Envelope<Value> {
        self.get_core_data_for_email_address(core_table_id, email_address)
            .and_then_first(|contact| {
                envelope(|| {
                    let id = contact.get("id").unwrap_or(&Value::Null);
                    let contact_id = id
                        .as_i64()
                        .ok_or_else(|| invalid_input(ErrorCode::InvalidContactId, id))?;
                    self.lists_of(
                        contact_id,
                        format!("Core table id: {core_table_id}, email address: {email_address}"),
                    )
                })
            })
    }

    fn all_filtered(&self, method: &str) -> Envelope<Value> {
        envelope(|| {
            let reply = self.call(method, Vec::new(), None)?;
            Ok(into_rows(filter_results(&reply, &TABLE_FILTER)))
        })
    }

    /// `{id, name}` of every core table.
    pub fn get_core_tables(&self) -> Envelope<Value> {
        self.all_filtered("coreTable.all")
    }

    /// `{id, name}` of every data table.
    pub fn get_data_tables(&self) -> Envelope<Value> {
        self.all_filtered("dataTable.all")
    }

    /// `{id, name}` of every contact list.
    pub fn get_lists(&self) -> Envelope<Value> {
        self.all_filtered("list.all")
    }

    /// Send a campaign to a single contact, identified by id or, failing that,
    /// by email address within the core table.
    pub fn transactional(
        &self,
        core_table_id: i64,
        campaign_id: i64,
        contact_id: Option<i64>,
        email_address: Option<&str>,
        transaction_data: &Map<String, Value>,
        launch_reference: Option<&LaunchReference>,
    ) -> Envelope<CallConfirmation> {
        let contact_id = contact_id.filter(|id| *id != 0);
        let email_address = email_address.filter(|e| !e.is_empty());

        let resolved = match (contact_id, email_address) {
            (None, None) => {
                return Envelope::local_failure(
                    ErrorCode::MissingParameters,
                    "Input values: contact id none, email_address none - must provide one",
                );
            }
            (Some(id), _) => Envelope::single(Value::from(id)),
            (None, Some(email)) => self
                .get_core_data_for_email_address(core_table_id, email)
                .map(|contact| contact.get("id").cloned().unwrap_or(Value::Null)),
        };

        resolved.and_then_first(|id| {
            envelope(|| {
                let contact_id = id
                    .as_i64()
                    .ok_or_else(|| invalid_input(ErrorCode::InvalidContactId, &id))?;
                check_id(contact_id, ErrorCode::InvalidContactId)?;

                let cleaned = clean_contact_data(transaction_data);
                let context = format!(
                    "Core table id: {core_table_id}, campaign id: {campaign_id}, email_address: {}, transaction data: {}",
                    email_address.unwrap_or("none"),
                    Value::Object(cleaned.clone())
                );
                let reply = self.call(
                    "contact.transactional",
                    vec![
                        Value::from(contact_id),
                        Value::from(campaign_id),
                        Value::Object(cleaned),
                        LaunchReference::to_options(launch_reference),
                    ],
                    Some(context),
                )?;
                Ok(vec![CallConfirmation {
                    message: "Sent".to_string(),
                    value: reply,
                }])
            })
        })
    }
}
