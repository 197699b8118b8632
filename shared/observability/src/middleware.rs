//! Request logging middleware.
//!
//! Every request gets a [`TraceContext`] stored in its extensions, runs inside
//! an `http_request` span and is logged on completion with its status and
//! duration. The request id is echoed back in `x-request-id`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    time::Instant,
};
use tracing::{error, info, span, warn, Instrument, Level};

use crate::trace_context::{TraceContext, REQUEST_ID_HEADER};

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name for log attribution
    pub service_name: String,
    /// Path prefixes that are served without logging
    pub exclude_paths: Vec<String>,
    /// Threshold in ms for slow request warnings
    pub slow_request_threshold_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "subscription-service".to_string(),
            exclude_paths: vec!["/health".to_string()],
            slow_request_threshold_ms: 1000,
        }
    }
}

impl ObservabilityConfig {
    pub fn for_service(name: impl Into<String>) -> Self {
        Self {
            service_name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct ObservabilityMiddleware {
    config: ObservabilityConfig,
}

impl ObservabilityMiddleware {
    pub fn new(config: ObservabilityConfig) -> Self {
        Self { config }
    }

    pub fn for_service(name: impl Into<String>) -> Self {
        Self::new(ObservabilityConfig::for_service(name))
    }
}

impl<S, B> Transform<S, ServiceRequest> for ObservabilityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ObservabilityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ObservabilityMiddlewareService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct ObservabilityMiddlewareService<S> {
    service: Rc<S>,
    config: ObservabilityConfig,
}

impl<S, B> Service<ServiceRequest> for ObservabilityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let config = self.config.clone();
        let service = self.service.clone();

        Box::pin(async move {
            let path = req.path().to_string();
            let method = req.method().to_string();

            if config.exclude_paths.iter().any(|p| path.starts_with(p)) {
                return service.call(req).await;
            }

            let trace_ctx = TraceContext::from_request(req.request());
            req.extensions_mut().insert(trace_ctx.clone());

            let request_span = span!(
                Level::INFO,
                "http_request",
                trace_id = %trace_ctx.trace_id,
                span_id = %trace_ctx.span_id,
                method = %method,
                path = %path,
                service = %config.service_name,
            );

            let start = Instant::now();
            let result = service.call(req).instrument(request_span).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(mut res) => {
                    let status_code = res.status().as_u16();

                    if let Ok(value) = HeaderValue::from_str(&trace_ctx.request_id) {
                        res.headers_mut()
                            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                    }

                    if status_code >= 500 {
                        error!(
                            trace_id = %trace_ctx.trace_id,
                            status = status_code,
                            duration_ms = duration_ms,
                            "← {} {} {} {}ms",
                            method, path, status_code, duration_ms
                        );
                    } else if status_code >= 400 {
                        warn!(
                            trace_id = %trace_ctx.trace_id,
                            status = status_code,
                            duration_ms = duration_ms,
                            "← {} {} {} {}ms",
                            method, path, status_code, duration_ms
                        );
                    } else if duration_ms > config.slow_request_threshold_ms {
                        warn!(
                            trace_id = %trace_ctx.trace_id,
                            status = status_code,
                            duration_ms = duration_ms,
                            "← SLOW {} {} {} {}ms",
                            method, path, status_code, duration_ms
                        );
                    } else {
                        info!(
                            trace_id = %trace_ctx.trace_id,
                            status = status_code,
                            duration_ms = duration_ms,
                            "← {} {} {} {}ms",
                            method, path, status_code, duration_ms
                        );
                    }

                    Ok(res)
                }
                Err(e) => {
                    error!(
                        trace_id = %trace_ctx.trace_id,
                        duration_ms = duration_ms,
                        error = %e,
                        "← {} {} ERROR {}ms: {}",
                        method, path, duration_ms, e
                    );
                    Err(e)
                }
            }
        })
    }
}

/// Helper to create observability middleware for a service
pub fn observability(service_name: impl Into<String>) -> ObservabilityMiddleware {
    ObservabilityMiddleware::for_service(service_name)
}
