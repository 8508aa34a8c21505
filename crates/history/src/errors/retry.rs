/// Classification for retry policy.
///
/// This layer never retries on its own. The class tells the caller what a
/// retry could achieve.
///
/// | Class | Retry the same call? |
/// |-------|----------------------|
/// | `Never` | No, the request itself must change |
/// | `Transient` | At the caller's discretion, the source may recover |
/// | `Aborted` | Only if the caller still wants the result |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Malformed or unsupported request, or missing metadata.
    Never,

    /// The history source failed. Any retry policy belongs to the provider
    /// implementation or the caller.
    Transient,

    /// The caller's cancellation or timeout fired.
    Aborted,
}
