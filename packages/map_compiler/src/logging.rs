//! Global logging system.

use std::{
    env,
    io,
    panic,
};
use backtrace::Backtrace;
use tracing_subscriber::{
    fmt::{
        self,
        time::uptime,
    },
    prelude::*,
    Registry,
    EnvFilter,
};


/// Default logging environment filter. Our crates are debug, everything else is warn.
const DEFAULT_FILTER: &'static str = "warn,map_node=debug,map_geom=debug,map_compiler=debug,mapc=debug";

/// Initializes a `tracing` logging backend which outputs to stderr, keeping stdout free for
/// reports. Accepts ecosystem-standard `RUST_LOG` env filters, which are applied on top of the
/// defaults.
pub fn init_logging() {
    let format = fmt::format()
        .compact()
        .with_timer(uptime())
        .with_line_number(true);
    let stderr_log = fmt::layer()
        .event_format(format)
        .with_writer(io::stderr);

    let mut filter = DEFAULT_FILTER.to_owned();
    if let Ok(env_filter) = env::var(EnvFilter::DEFAULT_ENV) {
        filter.push(',');
        filter.push_str(&env_filter);
    }

    let subscriber = Registry::default()
        .with(EnvFilter::new(filter))
        .with(stderr_log);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // already installed, which happens when called twice from tests
        return;
    }
    debug!("installed log subscriber");

    // make panic messages and backtrace go through logging system
    panic::set_hook(Box::new(|info| {
        error!("{}", info);
        if env::var("RUST_BACKTRACE").map(|val| val == "1").unwrap_or(true) {
            error!("{:?}", Backtrace::new());
        }
    }));
    trace!("installed custom panic hook");
}
