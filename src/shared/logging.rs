/// Initialize tracing for host applications and examples.
///
/// Honors `RUST_LOG`; defaults to debug for this crate and info elsewhere.
pub fn init() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farmlog=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
