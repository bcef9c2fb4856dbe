//! Dispatch between the primary and fallback resolvers.

use crate::error::ErrorKind;
use crate::media::MediaReference;
use crate::traits::{ResolutionOutcome, ResolveAttempt, StreamResolver};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// The resolver handed to the controller.
///
/// `Primary` goes to the remote lookup, `Fallback` to the external tool.
/// Local references never reach either and yield `NoStreamFound`.
pub struct ResolverChain {
    primary: Arc<dyn StreamResolver>,
    fallback: Option<Arc<dyn StreamResolver>>,
}

impl ResolverChain {
    pub fn new(primary: Arc<dyn StreamResolver>, fallback: Arc<dyn StreamResolver>) -> Self {
        Self {
            primary,
            fallback: Some(fallback),
        }
    }

    /// A chain whose fallback attempts always fail with
    /// `SubprocessUnavailable`.
    pub fn primary_only(primary: Arc<dyn StreamResolver>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[async_trait]
impl StreamResolver for ResolverChain {
    async fn resolve(&self, reference: &MediaReference, attempt: ResolveAttempt) -> ResolutionOutcome {
        if !reference.is_remote() {
            debug!(source = reference.source(), "Local reference needs no resolution");
            return ResolutionOutcome::failed(ErrorKind::NoStreamFound);
        }

        match attempt {
            ResolveAttempt::Primary => self.primary.resolve(reference, attempt).await,
            ResolveAttempt::Fallback => match &self.fallback {
                Some(fallback) => fallback.resolve(reference, attempt).await,
                None => ResolutionOutcome::failed(ErrorKind::SubprocessUnavailable),
            },
        }
    }
}
