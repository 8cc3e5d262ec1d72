//! Inquiry form submission
//!
//! Flow: validate -> mark the submit button pending -> hand the inquiry to an
//! [`InquiryBackend`] -> notify -> restore the button. The button is restored
//! by a scope guard, so it happens exactly once even if the submission future
//! is dropped half-way.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::constants;
use crate::error::{Result, SiteError};
use crate::notify::NotificationCenter;

/// Phone number: optional leading `+`, digits with spaces or dashes between
static RE_PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]*[0-9]$").unwrap());

/// A form field as described by the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            required,
        }
    }
}

/// Fields of the stock inquiry form
pub fn default_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("name", true),
        FieldSpec::new("phone", true),
        FieldSpec::new("message", false),
    ]
}

/// Submitted field values, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inquiry {
    pub fields: BTreeMap<String, String>,
}

impl Inquiry {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Map Persian and Arabic-Indic digits to ASCII
pub fn normalize_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            _ => c,
        })
        .collect()
}

/// Whether `input` looks like a phone number
pub fn is_valid_phone(input: &str) -> bool {
    let normalized = normalize_digits(input.trim());
    if !RE_PHONE.is_match(&normalized) {
        return false;
    }
    let digits = normalized.chars().filter(char::is_ascii_digit).count();
    constants::inquiry::PHONE_DIGITS.contains(&digits)
}

#[derive(Debug, Clone)]
struct Field {
    spec: FieldSpec,
    value: String,
}

/// Current form contents
#[derive(Debug, Clone)]
pub struct InquiryForm {
    fields: Vec<Field>,
}

impl InquiryForm {
    pub fn new(specs: Vec<FieldSpec>) -> Self {
        Self {
            fields: specs
                .into_iter()
                .map(|spec| Field {
                    spec,
                    value: String::new(),
                })
                .collect(),
        }
    }

    /// Input event. Unknown field names are ignored.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|f| f.spec.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.spec.name == name)
            .map(|f| f.value.as_str())
    }

    /// Names of fields that block submission
    pub fn invalid_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| {
                let value = f.value.trim();
                if value.is_empty() {
                    return f.spec.required;
                }
                f.spec.name == "phone" && !is_valid_phone(value)
            })
            .map(|f| f.spec.name.clone())
            .collect()
    }

    /// Collect trimmed values, or fail naming every invalid field
    pub fn validate(&self) -> Result<Inquiry> {
        let invalid = self.invalid_fields();
        if !invalid.is_empty() {
            return Err(SiteError::ValidationFailed(invalid));
        }
        let fields = self
            .fields
            .iter()
            .map(|f| {
                let value = f.value.trim();
                let value = if f.spec.name == "phone" {
                    normalize_digits(value)
                } else {
                    value.to_string()
                };
                (f.spec.name.clone(), value)
            })
            .collect();
        Ok(Inquiry { fields })
    }

    /// Form reset
    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|f| f.value.is_empty())
    }
}

/// Submit button state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmitControl {
    Idle { label: String },
    Pending { original_label: String },
}

impl SubmitControl {
    pub fn new(label: impl Into<String>) -> Self {
        SubmitControl::Idle {
            label: label.into(),
        }
    }

    /// Idle -> Pending. Fails if already pending.
    fn begin(&mut self) -> Result<()> {
        match self {
            SubmitControl::Idle { label } => {
                *self = SubmitControl::Pending {
                    original_label: std::mem::take(label),
                };
                Ok(())
            }
            SubmitControl::Pending { .. } => Err(SiteError::SubmissionInFlight),
        }
    }

    /// Pending -> Idle with the original label
    fn restore(&mut self) {
        if let SubmitControl::Pending { original_label } = self {
            *self = SubmitControl::Idle {
                label: std::mem::take(original_label),
            };
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SubmitControl::Idle { label } => label,
            SubmitControl::Pending { .. } => constants::inquiry::PENDING_LABEL,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, SubmitControl::Pending { .. })
    }
}

/// Where inquiries go
#[async_trait]
pub trait InquiryBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    async fn submit(&self, inquiry: &Inquiry) -> Result<()>;
}

/// Local stand-in for the real endpoint: waits, then succeeds (or fails)
#[derive(Debug)]
pub struct SimulatedBackend {
    delay: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(constants::inquiry::SIMULATED_DELAY, false)
    }
}

impl SimulatedBackend {
    pub fn new(delay: Duration, fail: bool) -> Self {
        Self {
            delay,
            fail,
            calls: AtomicUsize::new(0),
        }
    }

    /// Backend that always fails after `delay`
    pub fn failing(delay: Duration) -> Self {
        Self::new(delay, true)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InquiryBackend for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn submit(&self, _inquiry: &Inquiry) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(SiteError::SubmissionFailed("simulated failure".into()));
        }
        Ok(())
    }
}

/// Posts the inquiry as JSON to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpBackend {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl InquiryBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, inquiry: &Inquiry) -> Result<()> {
        debug!(endpoint = %self.endpoint, "posting inquiry");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&inquiry.fields)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        let reason = format!("HTTP {}: {}", status.as_u16(), body.trim());
        if status.is_client_error() {
            Err(SiteError::SubmissionRejected(reason))
        } else {
            Err(SiteError::SubmissionFailed(reason))
        }
    }
}

/// Result of an attempted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Backend accepted the inquiry; form cleared
    Sent { notification: u64 },
    /// Backend failed; form kept so the user can correct or resend it
    Failed {
        notification: u64,
        reason: String,
        /// Resending unchanged may succeed
        retryable: bool,
    },
}

/// Form plus submit button
#[derive(Debug, Clone)]
pub struct InquiryHandler {
    form: InquiryForm,
    control: SubmitControl,
    /// Fields flagged by the last validation attempt
    errors: Vec<String>,
}

impl InquiryHandler {
    pub fn new(fields: Vec<FieldSpec>, submit_label: impl Into<String>) -> Self {
        Self {
            form: InquiryForm::new(fields),
            control: SubmitControl::new(submit_label),
            errors: Vec::new(),
        }
    }

    /// Validate and mark the control pending. On validation failure the
    /// control is left untouched.
    pub fn begin(&mut self) -> Result<Inquiry> {
        if self.control.is_disabled() {
            return Err(SiteError::SubmissionInFlight);
        }
        match self.form.validate() {
            Ok(inquiry) => {
                self.errors.clear();
                self.control.begin()?;
                Ok(inquiry)
            }
            Err(SiteError::ValidationFailed(fields)) => {
                debug!(?fields, "inquiry rejected by validation");
                self.errors = fields.clone();
                Err(SiteError::ValidationFailed(fields))
            }
            Err(e) => Err(e),
        }
    }

    /// Settle a submission started with [`InquiryHandler::begin`]: restore
    /// the control, then clear the form and notify on the backend's result.
    pub fn finish(&mut self, result: Result<()>, notices: &NotificationCenter) -> SubmitOutcome {
        self.control.restore();
        match result {
            Ok(()) => {
                self.form.clear();
                let notification = notices.success(constants::inquiry::SUCCESS_MESSAGE);
                info!("inquiry submitted");
                SubmitOutcome::Sent { notification }
            }
            Err(e) => {
                let retryable = e.is_retryable();
                warn!(error = %e, retryable, "inquiry submission failed");
                let message = if retryable {
                    constants::inquiry::ERROR_MESSAGE
                } else {
                    constants::inquiry::REJECTED_MESSAGE
                };
                let notification = notices.error(message);
                SubmitOutcome::Failed {
                    notification,
                    reason: e.to_string(),
                    retryable,
                }
            }
        }
    }

    /// Validate, submit and settle in one call
    ///
    /// Validation errors are returned as `Err` and never reach the backend.
    /// Backend failures are reported through a notification and returned as
    /// [`SubmitOutcome::Failed`]. The control is restored even if this
    /// future is dropped while the backend is still working.
    pub async fn submit(
        &mut self,
        backend: &dyn InquiryBackend,
        notices: &NotificationCenter,
    ) -> Result<SubmitOutcome> {
        let inquiry = self.begin()?;
        info!(backend = backend.name(), "submitting inquiry");

        let result = {
            let _restore = scopeguard::guard(&mut self.control, |control| control.restore());
            backend.submit(&inquiry).await
        };
        Ok(self.finish(result, notices))
    }

    pub fn form(&self) -> &InquiryForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut InquiryForm {
        &mut self.form
    }

    pub fn control(&self) -> &SubmitControl {
        &self.control
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> InquiryHandler {
        InquiryHandler::new(default_fields(), "Send")
    }

    fn fill(h: &mut InquiryHandler) {
        h.form_mut().set("name", "Sara");
        h.form_mut().set("phone", "۰۹۱۲ ۳۴۵ ۶۷۸۹");
        h.form_mut().set("message", "Walnut dining table");
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("09123456789"));
        assert!(is_valid_phone("+98 912 345 6789"));
        assert!(is_valid_phone("۰۹۱۲۳۴۵۶۷۸۹"));
        assert!(is_valid_phone("٠٩١٢-٣٤٥-٦٧٨٩"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me"));
        assert!(!is_valid_phone("0912-"));
    }

    #[test]
    fn test_normalize_digits() {
        assert_eq!(normalize_digits("۱۲۳"), "123");
        assert_eq!(normalize_digits("٤٥٦x"), "456x");
    }

    #[test]
    fn test_validation_names_every_bad_field() {
        let mut h = handler();
        h.form_mut().set("phone", "abc");
        let err = h.form().validate().unwrap_err();
        match err {
            SiteError::ValidationFailed(fields) => assert_eq!(fields, vec!["name", "phone"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_optional_fields_may_be_blank() {
        let mut h = handler();
        h.form_mut().set("name", "Ali");
        h.form_mut().set("phone", "09121112233");
        let inquiry = h.form().validate().unwrap();
        assert_eq!(inquiry.get("message"), Some(""));
    }

    #[test]
    fn test_whitespace_only_required_field_is_empty() {
        let mut h = handler();
        fill(&mut h);
        h.form_mut().set("name", "   ");
        assert_eq!(h.form().invalid_fields(), vec!["name"]);
    }

    #[test]
    fn test_unknown_field_ignored() {
        let mut h = handler();
        assert!(!h.form_mut().set("fax", "123"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_required_field_never_reaches_backend() {
        let backend = SimulatedBackend::default();
        let notices = NotificationCenter::new();
        let mut h = handler();
        h.form_mut().set("phone", "09123456789");

        let err = h.submit(&backend, &notices).await.unwrap_err();
        assert!(matches!(err, SiteError::ValidationFailed(_)));
        assert_eq!(backend.calls(), 0);
        assert_eq!(h.control(), &SubmitControl::new("Send"));
        assert_eq!(h.errors(), ["name"]);
        assert!(notices.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_clears_form_and_restores_control() {
        let backend = SimulatedBackend::default();
        let notices = NotificationCenter::new();
        let mut h = handler();
        fill(&mut h);

        let outcome = h.submit(&backend, &notices).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Sent { .. }));
        assert_eq!(backend.calls(), 1);
        assert!(h.form().is_empty());
        assert_eq!(h.control().label(), "Send");
        assert!(!h.control().is_disabled());

        let shown = notices.list();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].kind, crate::notify::NotificationKind::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_form_and_restores_control() {
        let backend = SimulatedBackend::failing(Duration::from_millis(10));
        let notices = NotificationCenter::new();
        let mut h = handler();
        fill(&mut h);

        let outcome = h.submit(&backend, &notices).await.unwrap();
        assert!(matches!(
            outcome,
            SubmitOutcome::Failed {
                retryable: true,
                ..
            }
        ));
        assert_eq!(h.form().value("name"), Some("Sara"));
        assert_eq!(h.control(), &SubmitControl::new("Send"));
        assert_eq!(
            notices.list()[0].kind,
            crate::notify::NotificationKind::Error
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_control_restored_when_submission_is_dropped() {
        let backend = SimulatedBackend::default();
        let notices = NotificationCenter::new();
        let mut h = handler();
        fill(&mut h);

        let cancelled = tokio::time::timeout(
            Duration::from_millis(100),
            h.submit(&backend, &notices),
        )
        .await;
        assert!(cancelled.is_err());
        assert_eq!(h.control(), &SubmitControl::new("Send"));
        assert_eq!(h.form().value("name"), Some("Sara"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_is_not_retryable() {
        let notices = NotificationCenter::new();
        let mut h = handler();
        fill(&mut h);
        h.begin().unwrap();

        let outcome = h.finish(
            Err(SiteError::SubmissionRejected("HTTP 422: bad phone".into())),
            &notices,
        );
        let SubmitOutcome::Failed {
            notification,
            retryable,
            ..
        } = outcome
        else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(!retryable);
        assert_eq!(
            notices.get(notification).unwrap().message,
            constants::inquiry::REJECTED_MESSAGE
        );
        assert!(!h.control().is_disabled());
        assert_eq!(h.form().value("name"), Some("Sara"));
    }

    #[test]
    fn test_begin_twice_is_in_flight() {
        let mut h = handler();
        fill(&mut h);
        let inquiry = h.begin().unwrap();
        assert_eq!(inquiry.get("phone"), Some("0912 345 6789"));
        assert_eq!(h.control().label(), constants::inquiry::PENDING_LABEL);
        assert!(h.control().is_disabled());
        assert!(matches!(h.begin(), Err(SiteError::SubmissionInFlight)));
    }
}
