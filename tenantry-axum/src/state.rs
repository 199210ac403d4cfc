use std::sync::Arc;

use tenantry_core::{PartitionResolver, TenantryApp};

/// Router state: the app plus the resolver that picks each request's
/// partition for the routes it is attached to.
pub struct TenantryAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: TenantryApp<R, P>,
    pub resolver: Arc<dyn PartitionResolver>,
}

impl<R, P> Clone for TenantryAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R, P> TenantryAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub fn new(app: TenantryApp<R, P>, resolver: Arc<dyn PartitionResolver>) -> Self {
        Self { app, resolver }
    }
}
