use std::sync::Arc;

use tracing::debug;

use service::auth::{domain::Principal, TokenService};
use service::errors::ServiceError;
use service::resource::{CrudRepository, Resource, ScopedRepository};

use crate::observability::TOKENS_REISSUED_TOTAL;
use crate::upstream::Upstream;

/// Binds an upstream to the bearer to forward for the current caller.
///
/// With `reissue` set, every downstream call gets a freshly minted token
/// for the verified principal; otherwise the caller's token is forwarded.
pub struct Dispatcher<R: Resource> {
    upstream: Arc<dyn Upstream<R>>,
    tokens: TokenService,
    reissue: bool,
}

impl<R: Resource> Dispatcher<R> {
    pub fn new(upstream: Arc<dyn Upstream<R>>, tokens: TokenService, reissue: bool) -> Self {
        Self { upstream, tokens, reissue }
    }
}

impl<R: Resource> ScopedRepository<R> for Dispatcher<R> {
    fn scoped(&self, principal: &Principal, bearer: &str) -> Result<Arc<dyn CrudRepository<R>>, ServiceError> {
        let token = if self.reissue {
            TOKENS_REISSUED_TOTAL.inc();
            self.tokens.issue(principal)?
        } else {
            bearer.to_string()
        };
        debug!(resource = R::NAME, user_id = %principal.id, reissued = self.reissue, "dispatching downstream");
        Ok(self.upstream.bind(token))
    }
}
