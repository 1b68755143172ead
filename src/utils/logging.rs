pub fn setup_console_log() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // try_init: tests may race to install the subscriber.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(filter)
        .try_init();
}
