use std::sync::Arc;

use axum::handler::Handler;
use axum::http::{HeaderValue, Request};
use axum::routing::get;
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tenantry_core::{PartitionResolver, PublicResolver, TenantryApp, TenantryService};
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::params::FromRestParams;
use crate::rest;
use crate::TenantryAxumState;

/// Fresh `x-request-id` for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

pub struct AxumApp<R, P = ()>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    pub app: TenantryApp<R, P>,
    pub router: Router<()>,
    resolver: Arc<dyn PartitionResolver>,
}

impl<R, P> Clone for AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: self.app.clone(),
            router: self.router.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R, P> AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    /// Until [`with_resolver`](Self::with_resolver) is called every route
    /// resolves to the public partition.
    pub fn new(app: TenantryApp<R, P>) -> Self {
        Self {
            app,
            router: Router::new(),
            resolver: Arc::new(PublicResolver),
        }
    }

    /// Resolver used by services mounted after this call.
    pub fn with_resolver(mut self, resolver: Arc<dyn PartitionResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    pub fn use_get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + 'static,
        T: 'static,
    {
        let router = Router::new().route("/", get(handler));
        self.use_router(path, router)
    }

    /// Register `service` as `path` without its leading slash and mount its
    /// REST routes there, resolved by the current resolver.
    pub fn use_service(self, path: &'static str, service: Arc<dyn TenantryService<R, P>>) -> Self
    where
        R: Serialize + DeserializeOwned,
        P: FromRestParams,
    {
        let resolver = Arc::clone(&self.resolver);
        self.register_and_mount(path, service, resolver)
    }

    /// Like [`use_service`](Self::use_service), but always against the
    /// public partition whatever the host.
    pub fn use_public_service(self, path: &'static str, service: Arc<dyn TenantryService<R, P>>) -> Self
    where
        R: Serialize + DeserializeOwned,
        P: FromRestParams,
    {
        self.register_and_mount(path, service, Arc::new(PublicResolver))
    }

    /// Mount an already registered service at another path, e.g.
    /// `/client/{domain}/members`. Path parameters become resolver selectors.
    pub fn mount(mut self, path: &str, service_name: &str) -> Self
    where
        R: Serialize + DeserializeOwned,
        P: FromRestParams,
    {
        let state = TenantryAxumState::new(self.app.clone(), Arc::clone(&self.resolver));
        let router = rest::service_router(Arc::new(service_name.to_string()), state);
        self.router = self.router.nest(path, router);
        self
    }

    fn register_and_mount(
        mut self,
        path: &'static str,
        service: Arc<dyn TenantryService<R, P>>,
        resolver: Arc<dyn PartitionResolver>,
    ) -> Self
    where
        R: Serialize + DeserializeOwned,
        P: FromRestParams,
    {
        let name = path.trim_start_matches('/');
        self.app.register_service(name, service);

        let state = TenantryAxumState::new(self.app.clone(), resolver);
        let router = rest::service_router(Arc::new(name.to_string()), state);

        self.router = self.router.nest(path, router);
        self
    }

    /// The final router: request ids set and propagated, every request traced.
    pub fn into_router(self) -> Router<()> {
        self.router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = ?listener.local_addr()?, "listening");
        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

pub fn axum<R, P>(app: TenantryApp<R, P>) -> AxumApp<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + Clone + 'static,
{
    AxumApp::new(app)
}
