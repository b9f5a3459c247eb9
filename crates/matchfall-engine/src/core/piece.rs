use serde::{Deserialize, Serialize};

/// Category of a piece (its color or symbol).
///
/// Kinds are zero-based indices into the configured kind set. Each kind has a
/// single-character form, `'A'` for index 0, `'B'` for index 1, and so on,
/// which is used for layouts, text rendering and serialization.
///
/// # Example
///
/// ```
/// use matchfall_engine::PieceKind;
///
/// let kind = PieceKind::from_char('C').unwrap();
/// assert_eq!(kind.index(), 2);
/// assert_eq!(kind.as_char(), 'C');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceKind(u8);

impl PieceKind {
    /// Upper bound on the number of kinds (one per letter).
    pub const MAX_KINDS: u8 = 26;

    /// Creates a kind from its index, or `None` if `index >= MAX_KINDS`.
    #[must_use]
    pub const fn try_new(index: u8) -> Option<Self> {
        if index < Self::MAX_KINDS {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Creates a kind from an index already known to be in range.
    pub(crate) const fn new(index: u8) -> Self {
        assert!(index < Self::MAX_KINDS);
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns every kind of a set of `num_kinds` kinds, in index order.
    pub fn all(num_kinds: u8) -> impl Iterator<Item = PieceKind> {
        (0..num_kinds.min(Self::MAX_KINDS)).map(PieceKind)
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        (b'A' + self.0) as char
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        if c.is_ascii_uppercase() {
            Some(Self(c as u8 - b'A'))
        } else {
            None
        }
    }
}

impl Serialize for PieceKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_char(self.as_char())
    }
}

impl<'de> Deserialize<'de> for PieceKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let c = char::deserialize(deserializer)?;
        PieceKind::from_char(c)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid piece kind: {c:?}")))
    }
}

/// Identity of a piece, unique within one board for the board's lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display, Serialize, Deserialize,
)]
#[display("#{_0}")]
#[serde(transparent)]
pub struct PieceId(u64);

impl PieceId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A piece occupying a grid cell.
///
/// The identity persists while the piece falls; the kind never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
}

impl Piece {
    pub(crate) const fn new(id: PieceId, kind: PieceKind) -> Self {
        Self { id, kind }
    }

    #[must_use]
    pub const fn id(self) -> PieceId {
        self.id
    }

    #[must_use]
    pub const fn kind(self) -> PieceKind {
        self.kind
    }
}
