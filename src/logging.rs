//! ログ初期化

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` があればそれを使い、なければ `pallet_tracker=info`（verbose なら debug）
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "pallet_tracker=debug,info"
    } else {
        "pallet_tracker=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}
