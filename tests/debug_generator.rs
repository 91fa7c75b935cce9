use federated_session::{DebugSessionTokenGenerator, SessionTokenGenerator};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;

struct WarningCollector {
    warnings: Mutex<Vec<String>>,
}

impl Log for WarningCollector {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            self.warnings
                .lock()
                .unwrap()
                .push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static COLLECTOR: WarningCollector = WarningCollector {
    warnings: Mutex::new(Vec::new()),
};

fn production_warnings() -> usize {
    COLLECTOR
        .warnings
        .lock()
        .unwrap()
        .iter()
        .filter(|warning| warning.contains("do not use this in production"))
        .count()
}

/// Every way of building the counter generator flags it as unfit for production.
#[test]
fn test_every_constructor_warns() {
    log::set_logger(&COLLECTOR).unwrap();
    log::set_max_level(LevelFilter::Warn);

    let by_default = DebugSessionTokenGenerator::default();
    assert_eq!(production_warnings(), 1);
    let by_new = DebugSessionTokenGenerator::new();
    assert_eq!(production_warnings(), 2);
    let by_index = DebugSessionTokenGenerator::starting_at(5);
    assert_eq!(production_warnings(), 3);

    assert_eq!(by_default.generate_token(), DebugSessionTokenGenerator::token_at(0));
    assert_eq!(by_new.generate_token(), DebugSessionTokenGenerator::token_at(0));
    assert_eq!(by_index.generate_token(), DebugSessionTokenGenerator::token_at(5));
    // Formatting a token does not build a generator.
    assert_eq!(production_warnings(), 3);
}
