//! Case identifiers and the ranges they are generated from.

use std::fmt;

use crate::error::PollError;

/// Default number of digits after the prefix.
pub const DEFAULT_ID_WIDTH: usize = 10;

/// A case identifier: prefix followed by a zero-padded sequence number.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(prefix: &str, number: u64, width: usize) -> Self {
        Self(format!("{}{:0width$}", prefix, number, width = width))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A validated, dense range of identifiers.
///
/// Iteration is lazy and can be restarted any number of times; every pass
/// yields the same `count` identifiers in increasing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierRange {
    prefix: String,
    start: u64,
    count: u64,
    width: usize,
}

impl IdentifierRange {
    /// Validate and build a range.
    ///
    /// Takes signed inputs so that negative values coming from the command
    /// line are rejected here rather than wrapped.
    pub fn new(prefix: &str, start: i64, count: i64, width: usize) -> Result<Self, PollError> {
        if prefix.is_empty() {
            return Err(PollError::InvalidRange("prefix must not be empty".into()));
        }
        if start < 0 {
            return Err(PollError::InvalidRange(format!(
                "start must be non-negative, got {}",
                start
            )));
        }
        if count <= 0 {
            return Err(PollError::InvalidRange(format!(
                "count must be positive, got {}",
                count
            )));
        }
        if width == 0 || width > 19 {
            return Err(PollError::InvalidRange(format!(
                "width must be between 1 and 19, got {}",
                width
            )));
        }

        let (start, count) = (start as u64, count as u64);
        let last = start
            .checked_add(count - 1)
            .ok_or_else(|| PollError::InvalidRange("range overflows".into()))?;
        // width <= 19 keeps 10^width within u64
        if last >= 10u64.pow(width as u32) {
            return Err(PollError::InvalidRange(format!(
                "last number {} does not fit in {} digits",
                last, width
            )));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            start,
            count,
            width,
        })
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Identifier at `offset` from the start, if inside the range.
    pub fn get(&self, offset: usize) -> Option<Identifier> {
        (offset < self.len())
            .then(|| Identifier::new(&self.prefix, self.start + offset as u64, self.width))
    }

    pub fn iter(&self) -> impl Iterator<Item = Identifier> + Clone + '_ {
        (0..self.count).map(move |i| Identifier::new(&self.prefix, self.start + i, self.width))
    }

    /// Identifiers in `[from, from + len)`, clipped to the end of the range.
    pub fn slice(&self, from: usize, len: usize) -> Vec<Identifier> {
        (from..from.saturating_add(len).min(self.len()))
            .filter_map(|offset| self.get(offset))
            .collect()
    }
}
