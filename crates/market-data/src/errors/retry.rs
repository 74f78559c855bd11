/// Classification for retry policy.
///
/// | Class | Behavior |
/// |-------|----------|
/// | `Never` | Propagate immediately; retrying cannot help. |
/// | `WithBackoff` | Retry after an exponential backoff wait. |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - invalid input, cancellation, or an exhausted budget.
    Never,

    /// Retry with exponential backoff - network failures, non-success HTTP
    /// statuses, and malformed payloads, which are usually transient on
    /// this provider.
    WithBackoff,
}
