// Typed emission of commit-protocol facts.
//
// Every fact carries a minimal envelope: `schema_version`, `step`, `target`, `durable`.
use crate::constants::FACTS_SUBSYSTEM;
use crate::logging::FactsEmitter;
use serde_json::{json, Value};
use std::path::Path;

pub(crate) const SCHEMA_VERSION: i64 = 1;

/// Protocol step a fact reports on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    TempCreate,
    FileSync,
    Rename,
    DirSync,
    Commit,
    Abort,
}

impl Step {
    #[must_use]
    pub fn as_event(&self) -> &'static str {
        match self {
            Step::TempCreate => "temp.create",
            Step::FileSync => "file.sync",
            Step::Rename => "rename",
            Step::DirSync => "dir.sync",
            Step::Commit => "commit",
            Step::Abort => "abort",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Per-writer context shared by all facts of one write.
pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub target: &'a Path,
    pub durable: bool,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(facts: &'a dyn FactsEmitter, target: &'a Path, durable: bool) -> Self {
        Self {
            facts,
            target,
            durable,
        }
    }

    pub(crate) fn step(&self, step: Step) -> EventBuilder<'_> {
        EventBuilder::new(self, step)
    }
}

pub(crate) struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    step: Step,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, step: Step) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("step".to_string(), json!(step.as_event()));
        Self { ctx, step, fields }
    }

    pub(crate) fn path(mut self, path: &Path) -> Self {
        self.fields
            .insert("path".into(), json!(path.display().to_string()));
        self
    }

    pub(crate) fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub(crate) fn error(self, err: &dyn std::fmt::Display) -> Self {
        self.field("error", json!(err.to_string()))
    }

    pub(crate) fn emit(self, decision: Decision) {
        let mut fields = Value::Object(self.fields);
        if let Some(obj) = fields.as_object_mut() {
            obj.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
            obj.entry("target")
                .or_insert(json!(self.ctx.target.display().to_string()));
            obj.entry("durable").or_insert(json!(self.ctx.durable));
            obj.entry("decision").or_insert(json!(decision.as_str()));
        }
        self.ctx
            .facts
            .emit(FACTS_SUBSYSTEM, self.step.as_event(), decision.as_str(), fields);
    }

    pub(crate) fn emit_success(self) {
        self.emit(Decision::Success);
    }
    pub(crate) fn emit_failure(self) {
        self.emit(Decision::Failure);
    }
    pub(crate) fn emit_warn(self) {
        self.emit(Decision::Warn);
    }
}
