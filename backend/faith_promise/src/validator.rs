//! Pure form validation: snapshot in, error map out.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::currency;
use crate::form::{Field, FormData};

pub const FULL_NAME_REQUIRED: &str = "Nama Lengkap wajib diisi.";
pub const FAITH_PROMISE_INVALID: &str = "Janji Iman harus dalam format IDR yang valid.";
pub const PAYMENT_METHOD_REQUIRED: &str = "Metode Pembayaran wajib dipilih.";

/// Field name to error message. Always rebuilt from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<Field, &'static str>);

impl ErrorMap {
    /// The validity flag: true iff no field has an error.
    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().map(|(f, m)| (*f, *m))
    }

    /// Keep only the entries whose field passes `keep`.
    pub fn filtered(&self, mut keep: impl FnMut(Field) -> bool) -> ErrorMap {
        ErrorMap(
            self.0
                .iter()
                .filter(|(f, _)| keep(**f))
                .map(|(f, m)| (*f, *m))
                .collect(),
        )
    }
}

/// Run every rule against `data`. Rules never short-circuit each other.
///
/// `proofOfTransfer` has no rule, whatever the payment method.
pub fn validate(data: &FormData) -> ErrorMap {
    let mut errors = BTreeMap::new();

    if data.full_name.trim().is_empty() {
        errors.insert(Field::FullName, FULL_NAME_REQUIRED);
    }

    let digits = currency::to_canonical(data.faith_promise.as_str());
    if !currency::is_positive(&digits) {
        errors.insert(Field::FaithPromise, FAITH_PROMISE_INVALID);
    }

    if data.payment_method.is_none() {
        errors.insert(Field::PaymentMethod, PAYMENT_METHOD_REQUIRED);
    }

    ErrorMap(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{CanonicalAmount, FileRef, PaymentMethod};

    fn filled() -> FormData {
        FormData {
            full_name: "Budi".into(),
            faith_promise: CanonicalAmount::from_input("100000"),
            payment_method: Some(PaymentMethod::Cash),
            proof_of_transfer: None,
        }
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = validate(&FormData::default());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::FullName), Some(FULL_NAME_REQUIRED));
        assert_eq!(errors.get(Field::FaithPromise), Some(FAITH_PROMISE_INVALID));
        assert_eq!(errors.get(Field::PaymentMethod), Some(PAYMENT_METHOD_REQUIRED));
        assert!(!errors.is_valid());
    }

    #[test]
    fn filled_form_is_valid() {
        let errors = validate(&filled());
        assert!(errors.is_empty());
        assert!(errors.is_valid());
    }

    #[test]
    fn whitespace_name_is_an_error() {
        for name in ["", " ", "\t\n "] {
            let data = FormData {
                full_name: name.into(),
                ..filled()
            };
            assert!(validate(&data).contains(Field::FullName), "{name:?}");
        }
        let data = FormData {
            full_name: " x ".into(),
            ..filled()
        };
        assert!(!validate(&data).contains(Field::FullName));
    }

    #[test]
    fn zero_and_empty_amounts_are_errors() {
        for raw in ["", "0", "000", "IDR 0.000"] {
            let data = FormData {
                faith_promise: CanonicalAmount::from_input(raw),
                ..filled()
            };
            assert!(validate(&data).contains(Field::FaithPromise), "{raw:?}");
        }
    }

    #[test]
    fn amounts_of_any_length_are_accepted() {
        for raw in ["18446744073709551616", "99999999999999999999999", "IDR 1.234.567.890.123.456.789.012.345"] {
            let data = FormData {
                faith_promise: CanonicalAmount::from_input(raw),
                ..filled()
            };
            assert!(validate(&data).is_valid(), "{raw:?}");
        }
    }

    #[test]
    fn transfer_without_proof_is_valid() {
        let data = FormData {
            payment_method: Some(PaymentMethod::Transfer),
            ..filled()
        };
        assert!(validate(&data).is_valid());

        let with_proof = FormData {
            proof_of_transfer: Some(FileRef::new("bukti.pdf")),
            ..data
        };
        assert!(validate(&with_proof).is_valid());
    }

    #[test]
    fn validity_matches_error_map() {
        let names = ["", "Budi"];
        let amounts = ["", "0", "100.000"];
        let methods = [None, Some(PaymentMethod::Cash), Some(PaymentMethod::Transfer)];
        for name in names {
            for amount in amounts {
                for method in methods {
                    let data = FormData {
                        full_name: name.into(),
                        faith_promise: CanonicalAmount::from_input(amount),
                        payment_method: method,
                        proof_of_transfer: None,
                    };
                    let errors = validate(&data);
                    assert_eq!(errors.is_valid(), errors.iter().count() == 0);
                }
            }
        }
    }

    #[test]
    fn filtered_keeps_selected_fields() {
        let errors = validate(&FormData::default());
        let shown = errors.filtered(|f| f == Field::FullName);
        assert_eq!(shown.len(), 1);
        assert!(shown.contains(Field::FullName));
    }
}
