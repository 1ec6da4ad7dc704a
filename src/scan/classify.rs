use tracing::{debug, warn};

use super::types::ScanWarning;
use super::ScanError;
use crate::collectors::{CollectorError, CollectorResult, ErrorKind};

/// How a collaborator failure affects the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Fatal,
    /// Absorbed silently, the step yields its empty value
    BenignEmpty,
    /// Absorbed with a recorded warning, the step yields its empty value
    BenignEmptyWithWarning,
}

pub fn classify(err: &CollectorError) -> Classification {
    match err.kind {
        ErrorKind::NotFound => Classification::BenignEmpty,
        ErrorKind::UnsupportedOnServerless
        | ErrorKind::VpcConnectivityUnsupported
        | ErrorKind::SecurityDisabled => Classification::BenignEmptyWithWarning,
        _ => Classification::Fatal,
    }
}

/// Benign classes a call site is willing to absorb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Absorb {
    pub not_found: bool,
    pub unsupported: bool,
}

impl Absorb {
    pub const NOTHING: Absorb = Absorb {
        not_found: false,
        unsupported: false,
    };
    pub const NOT_FOUND: Absorb = Absorb {
        not_found: true,
        unsupported: false,
    };
    pub const UNSUPPORTED: Absorb = Absorb {
        not_found: false,
        unsupported: true,
    };

    fn tolerates(&self, classification: Classification) -> bool {
        match classification {
            Classification::Fatal => false,
            Classification::BenignEmpty => self.not_found,
            Classification::BenignEmptyWithWarning => self.unsupported,
        }
    }
}

/// Resolves one step's result against its tolerance.
///
/// Absorbed failures yield `T::default()`; anything else becomes a
/// `ScanError::Collector` carrying `context`.
pub fn absorb<T: Default>(
    result: CollectorResult<T>,
    tolerance: Absorb,
    step: &str,
    context: &str,
    warnings: &mut Vec<ScanWarning>,
) -> Result<T, ScanError> {
    let err = match result {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let classification = classify(&err);
    if !tolerance.tolerates(classification) {
        return Err(ScanError::collector(context, err));
    }

    match classification {
        Classification::BenignEmptyWithWarning => {
            warn!("{}: {}", step, err);
            warnings.push(ScanWarning {
                step: step.to_string(),
                message: err.to_string(),
            });
        }
        _ => debug!("{}: absorbed {} ({})", step, err.kind, err),
    }

    Ok(T::default())
}
