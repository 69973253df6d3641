//! Opaque offsets into the global source space owned by [`crate::SourceManager`].

/// A compact offset into the process-wide source space.
///
/// Offset `0` is reserved and denotes an invalid location. Locations are
/// only meaningful relative to a particular [`crate::SourceManager`]; they
/// carry no file identity of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation(u32);

impl SourceLocation {
    pub const INVALID: SourceLocation = SourceLocation(0);

    pub fn new(offset: u32) -> Self {
        SourceLocation(offset)
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    pub fn is_invalid(self) -> bool {
        !self.is_valid()
    }

    pub fn offset(self) -> u32 {
        self.0
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        SourceLocation::INVALID
    }
}

/// An inclusive/exclusive pair of [`SourceLocation`]s spanning a syntactic
/// construct. `begin` is the first byte of the construct; `end` is the
/// first byte past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceRange {
    begin: SourceLocation,
    end: SourceLocation,
}

impl SourceRange {
    pub fn new(begin: SourceLocation, end: SourceLocation) -> Self {
        SourceRange { begin, end }
    }

    /// A range covering a single location (used for point diagnostics).
    pub fn point(loc: SourceLocation) -> Self {
        SourceRange { begin: loc, end: loc }
    }

    pub fn begin(self) -> SourceLocation {
        self.begin
    }

    pub fn end(self) -> SourceLocation {
        self.end
    }

    pub fn is_valid(self) -> bool {
        self.begin.is_valid() && self.end.is_valid()
    }

    pub fn is_invalid(self) -> bool {
        !self.is_valid()
    }

    /// Merge two ranges into the smallest range covering both.
    pub fn merge(self, other: SourceRange) -> SourceRange {
        let begin = std::cmp::min(self.begin, other.begin);
        let end = std::cmp::max(self.end, other.end);
        SourceRange::new(begin, end)
    }
}

impl Default for SourceRange {
    fn default() -> Self {
        SourceRange::new(SourceLocation::INVALID, SourceLocation::INVALID)
    }
}
