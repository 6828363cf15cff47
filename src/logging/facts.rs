use log::Level;
use serde_json::Value;

/// Receiver of one structured fact per commit-protocol step.
///
/// Events: `temp.create`, `file.sync`, `rename`, `dir.sync`, `commit`, `abort`.
pub trait FactsEmitter: Send + Sync {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Default emitter: forwards facts to the `log` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacts;

impl FactsEmitter for LogFacts {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        let level = match decision {
            "success" => Level::Debug,
            _ => Level::Warn,
        };
        log::log!(target: "posixfs", level, "{subsystem}.{event} {decision} {fields}");
    }
}

/// Emitter that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFacts;

impl FactsEmitter for NullFacts {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}
