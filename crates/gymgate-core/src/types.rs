use crate::{Result, constants::MAX_QUALITY, error::Error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tenant (gym account) identifier.
///
/// All templates, members, and attendance records are partitioned by tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a new tenant id with validation.
    ///
    /// The id is trimmed before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidTenantId` if the id is empty or not ASCII.
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidTenantId("must not be empty".to_string()));
        }
        if !id.is_ascii() {
            return Err(Error::InvalidTenantId(format!("must be ASCII, got '{id}'")));
        }
        Ok(TenantId(id.to_string()))
    }

    /// Get the tenant id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TenantId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TenantId::new(s)
    }
}

/// Member identifier within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create a new member id with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidMemberId` if the id is empty or not ASCII.
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidMemberId("must not be empty".to_string()));
        }
        if !id.is_ascii() {
            return Err(Error::InvalidMemberId(format!("must be ASCII, got '{id}'")));
        }
        Ok(MemberId(id.to_string()))
    }

    /// Get the member id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MemberId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MemberId::new(s)
    }
}

/// Capture quality score (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(u8);

impl Quality {
    /// Create a quality score with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidQuality` if the score exceeds 100.
    pub fn new(score: u8) -> Result<Self> {
        if score > MAX_QUALITY {
            return Err(Error::InvalidQuality(score));
        }
        Ok(Quality(score))
    }

    /// Get the raw score as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Match confidence, normalized to 0.0-1.0. Higher is a stronger match.
///
/// Reader firmwares disagree on the scale: some report 0-1, some 0-100.
/// [`Confidence::from_raw`] accepts both and normalizes to the unit interval.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Create a confidence value already in the unit interval.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfidence` if the value is not in 0.0-1.0
    /// or is not finite.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidConfidence(value));
        }
        Ok(Confidence(value))
    }

    /// Normalize a raw reader score to the unit interval.
    ///
    /// Values in (1.0, 100.0] are treated as percentages.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfidence` for negative, non-finite, or
    /// out-of-range values.
    pub fn from_raw(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidConfidence(value));
        }
        if value <= 1.0 {
            Confidence::new(value)
        } else if value <= 100.0 {
            Confidence::new(value / 100.0)
        } else {
            Err(Error::InvalidConfidence(value))
        }
    }

    /// Get the normalized value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Text-encoded biometric template payload.
///
/// Opaque to this subsystem: the reader service produces it at enrollment and
/// consumes it at match time. Immutable once stored; re-enrollment supersedes
/// the previous template, never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateData(String);

impl TemplateData {
    /// Create a template payload with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidTemplate` if the payload is empty or contains
    /// non-ASCII characters (the wire encoding is text-encoded binary).
    pub fn new(encoded: &str) -> Result<Self> {
        if encoded.is_empty() {
            return Err(Error::InvalidTemplate("must not be empty".to_string()));
        }
        if !encoded.is_ascii() {
            return Err(Error::InvalidTemplate("must be ASCII-encoded".to_string()));
        }
        Ok(TemplateData(encoded.to_string()))
    }

    /// Get the encoded payload as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encoded payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TemplateData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Payloads are large and uninteresting; show size only.
        write!(f, "<template {} bytes>", self.0.len())
    }
}

/// Connection lifecycle state of the reader link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    /// No socket open. The initial and terminal state.
    Disconnected,
    /// TCP connect in progress.
    Connecting,
    /// Socket open and usable.
    Connected,
}

impl LinkState {
    /// Returns `true` if the link is connected.
    #[inline]
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, LinkState::Connected)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinkState::Disconnected => write!(f, "disconnected"),
            LinkState::Connecting => write!(f, "connecting"),
            LinkState::Connected => write!(f, "connected"),
        }
    }
}

/// Outcome of a single successful match, produced once per verification
/// attempt. Not persisted; only its consequence (an attendance record) is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub member_id: MemberId,
    /// Display name as reported by the reader service, when it carries one.
    pub member_name: Option<String>,
    pub confidence: Confidence,
}

/// How an attendance event was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceMethod {
    Fingerprint,
}

impl fmt::Display for AttendanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttendanceMethod::Fingerprint => write!(f, "fingerprint"),
        }
    }
}

/// An attendance event awaiting its append. Carries only what the client
/// knows; the store assigns id and timestamp at write time, so front-desk
/// clock skew never leaks into the persisted history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    pub member_id: MemberId,
    pub member_name: String,
    pub method: AttendanceMethod,
}

impl NewAttendance {
    /// A fingerprint check-in for the given member.
    #[must_use]
    pub fn fingerprint(member_id: MemberId, member_name: String) -> Self {
        Self {
            member_id,
            member_name,
            method: AttendanceMethod::Fingerprint,
        }
    }
}

/// Append-only attendance event as persisted by the remote store, created
/// exactly once per successful verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub member_id: MemberId,
    pub member_name: String,
    pub method: AttendanceMethod,
    pub timestamp: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Materialize a pending event into a persisted record, assigning the id
    /// and the server-side timestamp. For store implementations; callers
    /// receive the record back from `append_attendance`.
    #[must_use]
    pub fn assign(new: NewAttendance) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id: new.member_id,
            member_name: new.member_name,
            method: new.method,
            timestamp: Utc::now(),
        }
    }
}

/// Summary of one template sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub success: bool,
    /// Templates pushed to the reader service.
    pub count: usize,
    pub error: Option<String>,
}

impl SyncResult {
    /// A completed run that pushed `count` templates.
    #[must_use]
    pub fn completed(count: usize) -> Self {
        Self {
            success: true,
            count,
            error: None,
        }
    }

    /// A run that did not complete. Previous counters stay untouched.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            error: Some(error.into()),
        }
    }
}
