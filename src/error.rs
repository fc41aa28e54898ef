use thiserror::Error;

/// Every failure the crate can report.
///
/// Graph-shape errors ([`Cycle`](Error::Cycle), [`MultiEdge`](Error::MultiEdge),
/// [`ExceededMaxOutDegree`](Error::ExceededMaxOutDegree)) are consumed by the
/// dictionary's construction retry loop; callers of [`Dict::create`](crate::Dict::create)
/// only ever see [`ConstructionFailed`](Error::ConstructionFailed) once the
/// retry budget is exhausted. [`BadKey`](Error::BadKey) and
/// [`BadPadding`](Error::BadPadding) are ordinary query outcomes, not faults.
#[derive(Debug, Error)]
pub enum Error {
    /// Radix below 2, or its bit width does not fit the digest; or a row
    /// would exceed the digest length.
    #[error("parameters out of range for a 512-bit digest")]
    BadParams,

    /// Rejection sampling found no digest chunk inside the hash range.
    #[error("no digest chunk fell within the hash range")]
    NoUniformValue,

    /// Filter bit length and hasher radix disagree.
    #[error("filter bit length does not match the hasher radix")]
    ParamsMismatch,

    /// A graph node's adjacency list would grow past the out-degree cap.
    #[error("graph node out-degree exceeded the cap")]
    ExceededMaxOutDegree,

    /// The hash graph contains a self-loop or a cycle.
    #[error("hash graph contains a cycle")]
    Cycle,

    /// The hash graph contains a repeated edge.
    #[error("hash graph contains a multi-edge")]
    MultiEdge,

    /// More items than table rows.
    #[error("item count must be smaller than the table length")]
    TooManyItems,

    /// A value is longer than the dictionary's `max_value_bytes`.
    #[error("value exceeds the maximum value length")]
    LongValue,

    /// No simple acyclic hash graph was found within the retry budget.
    #[error("no simple acyclic hash graph found within the retry budget")]
    ConstructionFailed,

    /// The key is not stored in the dictionary (or collided with a
    /// bounded-probability false match).
    #[error("key not found")]
    BadKey,

    /// The recovered row had malformed value padding.
    #[error("malformed value padding")]
    BadPadding,

    #[cfg(feature = "serde")]
    #[error("serialization error: {0}")]
    Serde(#[from] Box<bincode::ErrorKind>),
}
