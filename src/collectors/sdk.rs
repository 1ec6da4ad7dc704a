//! Helpers shared by the AWS SDK backed collectors.
//!
//! SDK getters return either plain or optional values depending on whether the
//! service model marks a member as required. The traits here normalise both
//! shapes into owned optional values.

use aws_sdk_kafka::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_kafka::primitives::DateTime as SdkDateTime;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

use super::{CollectorError, ErrorKind};

pub(crate) trait OwnedText {
    fn owned_text(self) -> Option<String>;
}

impl<T: AsRef<str> + ?Sized> OwnedText for &T {
    fn owned_text(self) -> Option<String> {
        Some(self.as_ref().to_string())
    }
}

impl<T: AsRef<str> + ?Sized> OwnedText for Option<&T> {
    fn owned_text(self) -> Option<String> {
        self.map(|v| v.as_ref().to_string())
    }
}

pub(crate) trait Optional<T> {
    fn optional(self) -> Option<T>;
}

impl<T> Optional<T> for Option<T> {
    fn optional(self) -> Option<T> {
        self
    }
}

macro_rules! impl_optional {
    ($($t:ty),*) => {
        $(
            impl Optional<$t> for $t {
                fn optional(self) -> Option<$t> {
                    Some(self)
                }
            }
        )*
    };
}

impl_optional!(i32, i64, f64, bool);

pub(crate) trait Timestamp {
    fn timestamp(self) -> Option<DateTime<Utc>>;
}

impl Timestamp for &SdkDateTime {
    fn timestamp(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.secs(), self.subsec_nanos())
    }
}

impl Timestamp for Option<&SdkDateTime> {
    fn timestamp(self) -> Option<DateTime<Utc>> {
        self.and_then(|t| t.timestamp())
    }
}

pub(crate) trait StringMap {
    fn to_sorted(self) -> BTreeMap<String, String>;
}

impl StringMap for &HashMap<String, String> {
    fn to_sorted(self) -> BTreeMap<String, String> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl StringMap for Option<&HashMap<String, String>> {
    fn to_sorted(self) -> BTreeMap<String, String> {
        self.map(|m| m.to_sorted()).unwrap_or_default()
    }
}

/// Empty cursors are treated the same as missing ones
pub(crate) fn next_token(token: Option<&str>) -> Option<String> {
    token.filter(|t| !t.is_empty()).map(str::to_string)
}

/// Converts an SDK failure into a typed collector error
pub(crate) fn sdk_error<E>(operation: &str, err: E) -> CollectorError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let code = err.code().map(str::to_string);
    let message = format!("{}: {}", operation, DisplayErrorContext(&err));
    let kind = match code.as_deref() {
        Some("NotFoundException") | Some("ResourceNotFoundException") => ErrorKind::NotFound,
        Some("ForbiddenException") | Some("UnauthorizedException") | Some("AccessDeniedException") => {
            ErrorKind::AccessDenied
        }
        Some("TooManyRequestsException") | Some("ThrottlingException") | Some("RequestLimitExceeded") => {
            ErrorKind::Throttled
        }
        _ => ErrorKind::from_message(&message),
    };
    CollectorError::new(kind, message)
}
