mod settings;

pub use settings::{ExternalIpGetterConfig, Settings, DEFAULT_INTERVAL_SECONDS};
