//! Dispatch strategy resolution.
//!
//! One strategy is bound per plugin construction and shared read-only by
//! every request afterwards. Misconfiguration never escapes as an error: it
//! degrades to a log-only strategy, because a broken telemetry plugin must
//! not stop the host server from starting.

use crate::config::OgdConfig;
use crate::transport::{CallFailure, CallOptions, Transport, TransportError};
use std::sync::Arc;

/// Tag identifying the bound dispatch strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Reporting is explicitly disabled.
    NoOp,
    /// Transport construction failed; intended calls are logged, never sent.
    Degraded,
    /// Fully operational.
    Live,
}

/// The bound reporting behavior, chosen once by [`resolve`].
///
/// All variants expose the same [`send`](Dispatch::send) signature; callers
/// never need to know which one is bound.
pub enum Dispatch {
    /// Resolves immediately without any side effect.
    NoOp,
    /// Logs what it would have sent, then resolves.
    Degraded,
    /// Forwards the call verbatim to the transport.
    Live(Arc<dyn Transport>),
}

impl Dispatch {
    /// Which strategy is bound.
    pub fn mode(&self) -> DispatchMode {
        match self {
            Dispatch::NoOp => DispatchMode::NoOp,
            Dispatch::Degraded => DispatchMode::Degraded,
            Dispatch::Live(_) => DispatchMode::Live,
        }
    }

    /// Send one call description via the bound strategy.
    ///
    /// `NoOp` and `Degraded` always resolve `Ok(())`; `Live` returns the
    /// transport's result unchanged, including its failure behavior.
    pub async fn send(&self, options: CallOptions) -> Result<(), Box<dyn CallFailure>> {
        match self {
            Dispatch::NoOp => Ok(()),
            Dispatch::Degraded => {
                let body = serde_json::to_string(&options.body)
                    .unwrap_or_else(|_| "<unserializable>".to_string());
                tracing::warn!(
                    method = %options.method,
                    path = %options.path,
                    %body,
                    "OGD transport is not properly configured; this is the request it would have made"
                );
                Ok(())
            }
            Dispatch::Live(transport) => transport.call(options).await,
        }
    }
}

/// Choose the dispatch strategy for a configuration. Runs exactly once per
/// plugin construction and never fails.
///
/// - Disabled configuration binds [`Dispatch::NoOp`] without ever touching
///   the network configuration.
/// - Incomplete configuration or a failing `make_transport` binds
///   [`Dispatch::Degraded`] after logging the problem.
/// - Otherwise binds [`Dispatch::Live`] around the constructed transport.
pub fn resolve<F>(config: &OgdConfig, make_transport: F) -> Dispatch
where
    F: FnOnce(&str) -> Result<Arc<dyn Transport>, TransportError>,
{
    if config.is_disabled() {
        return Dispatch::NoOp;
    }

    if let Err(error) = config.validate() {
        tracing::warn!(%error, "failed to configure the OGD plugin");
        return Dispatch::Degraded;
    }

    match make_transport(&config.ogd_ingress_url) {
        Ok(transport) => Dispatch::Live(transport),
        Err(error) => {
            tracing::warn!(%error, "failed to instantiate the OGD transport");
            Dispatch::Degraded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::CallMethod;
    use async_trait::async_trait;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn call(&self, _options: CallOptions) -> Result<(), Box<dyn CallFailure>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn options() -> CallOptions {
        CallOptions {
            method: CallMethod::Post,
            path: "/sdk/graphql".to_string(),
            body: json!({ "graphql": {} }),
        }
    }

    #[test]
    fn test_disabled_config_skips_transport_construction() {
        let touched = Rc::new(Cell::new(false));
        let flag = touched.clone();
        let dispatch = resolve(
            &OgdConfig::new("https://collector.example/", "abc123").disable(true),
            move |_| {
                flag.set(true);
                Ok(Arc::new(CountingTransport {
                    calls: AtomicUsize::new(0),
                }) as Arc<dyn Transport>)
            },
        );
        assert_eq!(dispatch.mode(), DispatchMode::NoOp);
        assert!(!touched.get());
    }

    #[test]
    fn test_disable_keyword_token_binds_noop() {
        let dispatch = resolve(
            &OgdConfig::new("https://collector.example/", "Disabled"),
            |_| unreachable!("transport must not be constructed"),
        );
        assert_eq!(dispatch.mode(), DispatchMode::NoOp);
    }

    #[test]
    fn test_incomplete_config_binds_degraded() {
        let dispatch = resolve(&OgdConfig::new("https://collector.example/", ""), |_| {
            unreachable!("transport must not be constructed")
        });
        assert_eq!(dispatch.mode(), DispatchMode::Degraded);
    }

    #[test]
    fn test_failing_factory_binds_degraded() {
        let dispatch = resolve(&OgdConfig::new("not a url", "abc123"), |url| {
            Err(TransportError::InvalidUrl {
                url: url.to_string(),
                reason: "relative URL without a base".to_string(),
            })
        });
        assert_eq!(dispatch.mode(), DispatchMode::Degraded);
    }

    #[test]
    fn test_valid_config_binds_live() {
        let dispatch = resolve(&OgdConfig::new("https://collector.example/", "abc123"), |_| {
            Ok(Arc::new(CountingTransport {
                calls: AtomicUsize::new(0),
            }) as Arc<dyn Transport>)
        });
        assert_eq!(dispatch.mode(), DispatchMode::Live);
    }

    #[tokio::test]
    async fn test_noop_and_degraded_resolve_ok() {
        assert!(Dispatch::NoOp.send(options()).await.is_ok());
        assert!(Dispatch::Degraded.send(options()).await.is_ok());
    }

    #[tokio::test]
    async fn test_live_forwards_to_transport() {
        let transport = Arc::new(CountingTransport {
            calls: AtomicUsize::new(0),
        });
        let dispatch = Dispatch::Live(transport.clone());
        dispatch.send(options()).await.unwrap();
        dispatch.send(options()).await.unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }
}
