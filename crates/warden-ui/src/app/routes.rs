//! Routing definitions for the console.
use crate::features::collections::catalog::CollectionKind;
use yew_router::prelude::*;

#[derive(Clone, Routable, PartialEq, Eq, Debug)]
pub(crate) enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/forgot-password")]
    ForgotPassword,
    #[at("/manage/:slug")]
    Collection { slug: String },
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl Route {
    pub(crate) fn collection(kind: CollectionKind) -> Self {
        Self::Collection {
            slug: kind.slug().to_string(),
        }
    }
}
