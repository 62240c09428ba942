//! Human label remapping policy.
//!
//! Raw human labels are 3-valued: 0 = no match, 1 = match, 2 = "either".
//! Governance decision: 2 counts as a negative for primary metrics, so a
//! judge that predicts 1 on an "either" pair takes a false positive, not an
//! ambiguity bucket. The remap must be applied exactly once, at ingestion;
//! no downstream consumer may see a raw label.

/// Raw label: the pair is not a match.
pub const LABEL_NO_MATCH: u8 = 0;
/// Raw label: the pair is a match.
pub const LABEL_MATCH: u8 = 1;
/// Raw label: the adjudicator accepted either verdict.
pub const LABEL_EITHER: u8 = 2;

/// A human label outside the `{0, 1, 2}` domain.
///
/// The offending record must be excluded from the aligned set (and counted
/// in diagnostics) rather than coerced to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLabelError {
    /// The out-of-domain raw value.
    pub raw: u8,
}

impl std::fmt::Display for InvalidLabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "human label {} outside domain {{0, 1, 2}}", self.raw)
    }
}

impl std::error::Error for InvalidLabelError {}

/// Remap a raw 3-valued human label to binary ground truth.
///
/// Returns `1` iff `raw == 1`; `0` for `raw` in `{0, 2}`; an error for
/// anything else.
pub fn remap_label(raw: u8) -> Result<u8, InvalidLabelError> {
    match raw {
        LABEL_MATCH => Ok(1),
        LABEL_NO_MATCH | LABEL_EITHER => Ok(0),
        other => Err(InvalidLabelError { raw: other }),
    }
}
