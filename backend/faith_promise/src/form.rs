//! Pledge form data model.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::currency;

/// The fields of the pledge form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    FaithPromise,
    PaymentMethod,
    ProofOfTransfer,
}

impl Field {
    /// Fields forced to touched on every submit attempt.
    pub const REQUIRED: [Field; 3] = [Field::FullName, Field::FaithPromise, Field::PaymentMethod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::FaithPromise => "faithPromise",
            Self::PaymentMethod => "paymentMethod",
            Self::ProofOfTransfer => "proofOfTransfer",
        }
    }

    /// Form label shown next to the input.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FullName => "Nama Lengkap",
            Self::FaithPromise => "Janji Iman",
            Self::PaymentMethod => "Metode Pembayaran",
            Self::ProofOfTransfer => "Bukti Transfer",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    /// Accepts the camelCase field name or a short alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fullname" | "name" => Ok(Self::FullName),
            "faithpromise" | "amount" => Ok(Self::FaithPromise),
            "paymentmethod" | "method" => Ok(Self::PaymentMethod),
            "proofoftransfer" | "proof" => Ok(Self::ProofOfTransfer),
            other => Err(format!("unknown field: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Transfer => "Transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "transfer" => Ok(Self::Transfer),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

/// Digit-only amount string. Only constructible through
/// [`currency::to_canonical`], so formatting never leaks into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CanonicalAmount(String);

impl CanonicalAmount {
    pub fn from_input(raw: &str) -> Self {
        Self(currency::to_canonical(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The digits without leading zeros, or `None` when empty.
    pub fn normalized(&self) -> Option<&str> {
        currency::normalize(&self.0)
    }

    pub fn is_positive(&self) -> bool {
        currency::is_positive(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Opaque reference to a user-selected proof-of-transfer file. The file is
/// never opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(PathBuf);

impl FileRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Last path component, for display.
    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub full_name: String,
    pub faith_promise: CanonicalAmount,
    pub payment_method: Option<PaymentMethod>,
    pub proof_of_transfer: Option<FileRef>,
}

/// A single-field write into [`FormData`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    FullName(String),
    FaithPromise(CanonicalAmount),
    PaymentMethod(Option<PaymentMethod>),
    ProofOfTransfer(Option<FileRef>),
}

impl FieldUpdate {
    pub fn field(&self) -> Field {
        match self {
            Self::FullName(_) => Field::FullName,
            Self::FaithPromise(_) => Field::FaithPromise,
            Self::PaymentMethod(_) => Field::PaymentMethod,
            Self::ProofOfTransfer(_) => Field::ProofOfTransfer,
        }
    }

    pub(crate) fn apply(self, data: &mut FormData) {
        match self {
            Self::FullName(v) => data.full_name = v,
            Self::FaithPromise(v) => data.faith_promise = v,
            Self::PaymentMethod(v) => data.payment_method = v,
            Self::ProofOfTransfer(v) => data.proof_of_transfer = v,
        }
    }
}

/// A completed pledge as handed to a submission sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeRecord {
    pub full_name: String,
    /// Amount as digits with leading zeros dropped. Not bounded to any
    /// machine integer width.
    pub faith_promise: String,
    pub payment_method: PaymentMethod,
    pub proof_of_transfer: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl PledgeRecord {
    /// Build a record from a form snapshot. Returns `None` unless the amount
    /// is positive and a payment method is set; callers validate first.
    ///
    /// A proof attached while the method was Transfer is only carried over
    /// if the method is still Transfer.
    pub fn from_form(data: &FormData, submitted_at: DateTime<Utc>) -> Option<Self> {
        let payment_method = data.payment_method?;
        if !data.faith_promise.is_positive() {
            return None;
        }
        let faith_promise = data.faith_promise.normalized()?.to_string();
        let proof_of_transfer = match payment_method {
            PaymentMethod::Transfer => data
                .proof_of_transfer
                .as_ref()
                .map(|f| f.path().display().to_string()),
            PaymentMethod::Cash => None,
        };
        Some(Self {
            full_name: data.full_name.trim().to_string(),
            faith_promise,
            payment_method,
            proof_of_transfer,
            submitted_at,
        })
    }
}
