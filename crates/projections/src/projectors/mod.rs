//! One projector per aggregate.

pub mod order;
pub mod post;
pub mod product;
pub mod supplier;
pub mod user;

use std::sync::Arc;

use analytics_store::AnalyticsStore;

pub use order::OrderProjector;
pub use post::PostProjector;
pub use product::ProductProjector;
pub use supplier::SupplierProjector;
pub use user::UserProjector;

use crate::projector::{HandlerMap, Projector};

/// Handlers for every registered event type, all writing to `store`.
pub fn all_handlers<S>(store: S) -> HandlerMap
where
    S: AnalyticsStore + Clone + 'static,
{
    let mut handlers = HandlerMap::new();
    handlers.extend(Arc::new(UserProjector::new(store.clone())).handlers());
    handlers.extend(Arc::new(SupplierProjector::new(store.clone())).handlers());
    handlers.extend(Arc::new(ProductProjector::new(store.clone())).handlers());
    handlers.extend(Arc::new(OrderProjector::new(store.clone())).handlers());
    handlers.extend(Arc::new(PostProjector::new(store)).handlers());
    handlers
}
