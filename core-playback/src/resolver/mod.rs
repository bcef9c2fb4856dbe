//! Stream resolution strategies.
//!
//! - [`RemoteApiResolver`]: HTTP lookup, the primary strategy
//! - [`SubprocessResolver`]: external tool, used once after an engine failure
//! - [`ResolverChain`]: routes a [`ResolveAttempt`](crate::ResolveAttempt)
//!   to one of the above

mod chain;
mod remote;
mod subprocess;

pub use chain::ResolverChain;
pub use remote::RemoteApiResolver;
pub use subprocess::SubprocessResolver;
