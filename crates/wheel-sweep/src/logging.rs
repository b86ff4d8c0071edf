use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wheel_core::{ErrorInfo, WheelError};

/// Installs a global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str, json: bool) -> Result<(), WheelError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = if json {
        subscriber.with(fmt::layer().json()).try_init()
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init()
    };
    installed.map_err(|err| {
        WheelError::Config(
            ErrorInfo::new("logging-init", format!("failed to init logging: {err}"))
                .with_hint("a global subscriber may already be installed"),
        )
    })
}
