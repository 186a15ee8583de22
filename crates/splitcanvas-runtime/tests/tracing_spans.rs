#![forbid(unsafe_code)]

//! Session span and event coverage.
//!
//! Run:
//!   cargo test -p splitcanvas-runtime --test tracing_spans
//!   cargo test -p splitcanvas-runtime --test tracing_spans --features tracing

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use splitcanvas_layout::{NodeId, SplitAxis, SplitRequest};
use splitcanvas_runtime::{EditorSession, MemoryStorage};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
    parent_name: Option<String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
    parent_span_name: Option<String>,
}

#[derive(Clone, Default)]
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl Capture {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().expect("span lock").clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().expect("event lock").clone()
    }

    fn span_named(&self, name: &str) -> Option<CapturedSpan> {
        self.spans().into_iter().find(|span| span.name == name)
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let parent_name = ctx
            .current_span()
            .id()
            .and_then(|pid| ctx.span(pid))
            .map(|span_ref| span_ref.name().to_string());
        self.spans.lock().expect("span lock").push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
            parent_name,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());
        self.events.lock().expect("event lock").push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields: visitor.0.into_iter().collect(),
            parent_span_name,
        });
    }
}

fn with_captured<F>(f: F) -> Capture
where
    F: FnOnce(),
{
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture
}

fn place(session: &mut EditorSession<MemoryStorage>, label: &str) {
    session.split(SplitRequest::new(
        NodeId::root(),
        SplitAxis::Horizontal,
        label,
    ));
}

#[test]
fn apply_runs_in_session_span_with_command_fields() {
    let capture = with_captured(|| {
        let mut session = EditorSession::new(MemoryStorage::new());
        place(&mut session, "Camera");
        place(&mut session, "Traces");
    });

    let span = capture
        .span_named("splitcanvas.session.apply")
        .expect("apply span");
    assert_eq!(span.parent_name, None);
    assert_eq!(span.fields.get("op").map(String::as_str), Some("split"));
    assert_eq!(span.fields.get("target").map(String::as_str), Some("root"));

    let finished = capture
        .events()
        .into_iter()
        .rev()
        .find(|event| event.message == "command finished")
        .expect("completion event");
    assert_eq!(finished.fields.get("nodes").map(String::as_str), Some("3"));
    assert_eq!(finished.fields.get("depth").map(String::as_str), Some("2"));
    assert_eq!(finished.level, tracing::Level::DEBUG);
    assert_eq!(
        finished.parent_span_name.as_deref(),
        Some("splitcanvas.session.apply")
    );
}

#[test]
fn unknown_target_logs_a_warning() {
    let capture = with_captured(|| {
        let mut session = EditorSession::new(MemoryStorage::new());
        session.delete(NodeId::new("ghost"));
    });

    let warnings: Vec<CapturedEvent> = capture
        .events()
        .into_iter()
        .filter(|event| event.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert_eq!(
        warnings[0].parent_span_name.as_deref(),
        Some("splitcanvas.session.apply")
    );
}

#[test]
fn history_and_persistence_actions_have_spans() {
    let capture = with_captured(|| {
        let mut session = EditorSession::new(MemoryStorage::new());
        place(&mut session, "Camera");
        session.undo();
        session.redo();
        session.save().expect("save");
        session.save_template("One").expect("template");
        session.reset().expect("reset");
        session.restore().expect("restore");
    });

    for name in [
        "splitcanvas.session.undo",
        "splitcanvas.session.redo",
        "splitcanvas.session.save",
        "splitcanvas.session.save_template",
        "splitcanvas.session.reset",
        "splitcanvas.session.restore",
    ] {
        assert!(capture.span_named(name).is_some(), "missing span {name}");
    }
}

#[cfg(feature = "tracing")]
#[test]
fn layout_spans_nest_under_session_apply() {
    let capture = with_captured(|| {
        let mut session = EditorSession::new(MemoryStorage::new());
        place(&mut session, "Camera");
        place(&mut session, "Traces");
        session.delete(NodeId::root());
    });

    for name in ["splitcanvas.layout.split", "splitcanvas.layout.delete"] {
        let span = capture.span_named(name).expect("layout span");
        assert_eq!(
            span.parent_name.as_deref(),
            Some("splitcanvas.session.apply"),
            "{name} should be a child of the session span"
        );
    }
}
