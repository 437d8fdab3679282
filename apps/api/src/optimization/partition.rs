//! Response Partitioner: splits a raw generator answer at the evaluation marker.
//!
//! - marker absent → everything is primary (trimmed), secondary is empty
//! - marker present → text before the first occurrence is primary; the marker and
//!   everything after it (later markers included, verbatim) is secondary
//!
//! Both halves are trimmed and borrowed from the input. A missing marker is a valid
//! answer (no evaluation supplied), never an error.

/// The two halves of a generator answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition<'a> {
    /// Rewritten resume text, rendered into the document.
    pub primary: &'a str,
    /// Evaluation text returned to the caller, starting with the marker.
    pub secondary: &'a str,
}

impl Partition<'_> {
    pub fn has_evaluation(&self) -> bool {
        !self.secondary.is_empty()
    }
}

/// Splits `raw` on the first occurrence of `marker`. An empty marker never matches.
pub fn partition<'a>(raw: &'a str, marker: &str) -> Partition<'a> {
    let boundary = if marker.is_empty() {
        None
    } else {
        raw.find(marker)
    };

    match boundary {
        Some(idx) => Partition {
            primary: raw[..idx].trim(),
            secondary: raw[idx..].trim(),
        },
        None => Partition {
            primary: raw.trim(),
            secondary: "",
        },
    }
}
