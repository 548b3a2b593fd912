//! API client context shared by every screen.
//!
//! # Design
//! - One collection client, and therefore one query cache, per app boot.
//! - Auth calls borrow the client's transport instead of building their own.

use crate::config::ConsoleConfig;
use crate::services::client::CollectionClient;
use crate::services::http::GlooTransport;
use std::rc::Rc;

/// Shared client and configuration.
#[derive(Clone)]
pub(crate) struct ApiCtx {
    /// Singleton collection client.
    pub client: Rc<CollectionClient<GlooTransport>>,
    /// Resolved configuration.
    pub config: Rc<ConsoleConfig>,
}

impl ApiCtx {
    pub(crate) fn new(config: ConsoleConfig) -> Self {
        let transport = GlooTransport::new(config.api_base_url.clone());
        Self {
            client: Rc::new(CollectionClient::new(transport, config.cache)),
            config: Rc::new(config),
        }
    }
}

impl PartialEq for ApiCtx {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.client, &other.client)
    }
}
