// macros: This module contains macros for registering metrics with the
//         registry.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Register an Info metric with the Registry
#[macro_export]
macro_rules! register_info_with_registry {
    // Single info metric with specified labels.
    ($NAME:expr, $HELP:expr, $LABELS:expr, $REGISTRY:ident $(,)?) => {{
        use prometheus_client::metrics::info::Info;

        let info = Info::new($LABELS);

        $REGISTRY.register($NAME, $HELP, info);
    }};
}
