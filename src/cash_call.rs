//! Core cash call record types and the create-input builder
use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, TimeZone, Utc};

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CashCallStatus {
    #[n(0)]
    Draft,
    #[n(1)]
    UnderReview,
    #[n(2)]
    Approved,
    #[n(3)]
    Rejected,
    #[n(4)]
    Paid,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd)]
pub enum Currency {
    #[n(0)]
    USD,
    #[n(1)]
    GBP,
    #[n(2)]
    EUR,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd)]
pub enum Priority {
    #[n(0)]
    Low,
    #[n(1)]
    Normal,
    #[n(2)]
    High,
    #[n(3)]
    Urgent,
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Eq, PartialEq)]
pub enum AffiliateStatus {
    #[n(0)]
    Active,
    #[n(1)]
    Suspended,
}

#[derive(Debug, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl<T: TimeZone> PartialEq for TimeStamp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: TimeZone> Eq for TimeStamp<T> {}

impl<T: TimeZone> PartialOrd for TimeStamp<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TimeZone> Ord for TimeStamp<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
    pub fn new_with(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .unwrap()
            .into()
    }
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for TimeStamp<Utc> {
    fn default() -> Self {
        Self::new()
    }
}

/// A funding request raised by an affiliate against the parent organization.
///
/// Records are keyed in the store by `id`. The audit fields (`created_by`,
/// `created_at`, `approved_by`, `approved_at`, `updated_at`) are only ever
/// written through [`crate::audit`]; callers never supply them directly.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Eq, PartialEq)]
pub struct CashCall {
    #[n(0)]
    pub id: String, // uuid7, bech32 encoded with a "call_" prefix
    #[n(1)]
    pub call_number: String, // unique, immutable human-facing reference
    #[n(2)]
    pub affiliate_id: String,
    #[n(3)]
    pub amount_requested: u64, // minor units, always > 0
    #[n(4)]
    pub currency: Currency,
    #[n(5)]
    pub priority: Priority,
    #[n(6)]
    pub status: CashCallStatus,
    #[n(7)]
    pub created_by: String,
    #[n(8)]
    pub created_at: TimeStamp<Utc>,
    #[n(9)]
    pub approved_by: Option<String>,
    #[n(10)]
    pub approved_at: Option<TimeStamp<Utc>>,
    #[n(11)]
    pub updated_at: TimeStamp<Utc>,
}

/// A subsidiary/partner company that can own cash calls. The affiliate to
/// cash-call relationship is derived by scanning, never stored back here.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Eq, PartialEq)]
pub struct Affiliate {
    #[n(0)]
    pub id: String, // uuid7, bech32 encoded with an "aff_" prefix
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub company_code: String,
    #[n(3)]
    pub status: AffiliateStatus,
}

// used for constructing create requests
#[derive(Debug, Default, Clone)]
pub struct CashCallDraft {
    pub affiliate_id: Option<String>,
    pub amount_requested: u64,
    pub currency: Option<Currency>,
    pub priority: Option<Priority>,
    pub initial_status: Option<CashCallStatus>,
}

impl CashCallStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Paid)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::UnderReview => "Under Review",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Paid => "Paid",
        }
    }

    // single lookup for the presentation layer; screens must not keep
    // their own copies of this mapping
    pub fn color(&self) -> &'static str {
        match self {
            Self::Draft => "gray",
            Self::UnderReview => "amber",
            Self::Approved => "green",
            Self::Rejected => "red",
            Self::Paid => "blue",
        }
    }
}

impl std::fmt::Display for CashCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
        };
        f.write_str(name)
    }
}

impl CashCallDraft {
    /// Construct a new builder object, this becomes the basis for a draft
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_affiliate_id(mut self, affiliate_id: impl Into<String>) -> Self {
        self.affiliate_id = Some(affiliate_id.into());
        self
    }
    pub fn set_amount_requested(mut self, amount: u64) -> Self {
        self.amount_requested = amount;
        self
    }
    pub fn set_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }
    pub fn set_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
    /// Submit on create; the only alternative to the default `Draft`.
    pub fn set_initial_status(mut self, status: CashCallStatus) -> Self {
        self.initial_status = Some(status);
        self
    }

    // Field checks shared by every create path. Ownership of affiliate_id is
    // the mutation guard's concern, not the builder's, so it is not checked
    // here.
    pub fn validate(&self) -> EngineResult<()> {
        if self.amount_requested == 0 {
            return Err(EngineError::Validation(
                "amount requested must be greater than zero".into(),
            ));
        }
        if self.currency.is_none() {
            return Err(EngineError::Validation("currency is not set".into()));
        }
        match self.initial_status {
            None | Some(CashCallStatus::Draft) | Some(CashCallStatus::UnderReview) => Ok(()),
            Some(other) => Err(EngineError::Validation(format!(
                "a cash call cannot be created in status {other}"
            ))),
        }
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_encoding() {
        let original = TimeStamp::new();

        let encoding = minicbor::to_vec(&original).unwrap();
        let decode: TimeStamp<Utc> = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decode);
    }

    #[test]
    fn draft_rejects_zero_amount() {
        let draft = CashCallDraft::new()
            .set_affiliate_id("aff_1xyz")
            .set_currency(Currency::USD);

        assert!(matches!(draft.validate(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn draft_rejects_privileged_initial_status() {
        let draft = CashCallDraft::new()
            .set_affiliate_id("aff_1xyz")
            .set_amount_requested(50_000)
            .set_currency(Currency::EUR)
            .set_initial_status(CashCallStatus::Approved);

        assert!(matches!(draft.validate(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn draft_accepts_submit_on_create() {
        let draft = CashCallDraft::new()
            .set_affiliate_id("aff_1xyz")
            .set_amount_requested(50_000)
            .set_currency(Currency::EUR)
            .set_initial_status(CashCallStatus::UnderReview);

        assert!(draft.validate().is_ok());
    }

    #[test]
    fn terminal_statuses() {
        assert!(CashCallStatus::Rejected.is_terminal());
        assert!(CashCallStatus::Paid.is_terminal());
        assert!(!CashCallStatus::Approved.is_terminal());
    }
}
