//! Structured log output of the menu engine, captured with a subscriber
//! layer.

use std::sync::{Arc, Mutex};

use cascade_core::event::Interaction;
use cascade_harness::Harness;
use cascade_menu::LOG_TARGET;
use cascade_menu::event::MenuInput;
use cascade_menu::item_tree::MenuEntry;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    target: String,
    message: String,
    fields: Vec<(String, String)>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    spans: Arc<Mutex<Vec<String>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.spans
            .lock()
            .unwrap()
            .push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields: visitor.0,
        });
    }
}

struct Captured {
    events: Vec<CapturedEvent>,
    spans: Vec<String>,
}

impl Captured {
    fn menu_events(&self, level: Level) -> Vec<&CapturedEvent> {
        self.events
            .iter()
            .filter(|e| e.level == level && e.target == LOG_TARGET)
            .collect()
    }
}

fn with_captured_tracing<F: FnOnce()>(f: F) -> Captured {
    let layer = EventCapture::default();
    let events = layer.events.clone();
    let spans = layer.spans.clone();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let events = events.lock().unwrap().clone();
    let spans = spans.lock().unwrap().clone();
    Captured { events, spans }
}

fn items() -> Vec<MenuEntry> {
    vec![
        MenuEntry::item("Edit")
            .id("edit")
            .submenu(vec![MenuEntry::item("Undo").id("undo")]),
        MenuEntry::item("Help").id("help"),
    ]
}

#[test]
fn open_and_close_run_inside_spans() {
    let captured = with_captured_tracing(|| {
        let mut h = Harness::new(&items()).expect("harness");
        h.open_settled(Interaction::Pointer);
        h.session.close(true, false);
    });
    assert!(captured.spans.iter().any(|s| s == "menu.open"));
    assert!(captured.spans.iter().any(|s| s == "menu.close"));
    let debug = captured.menu_events(Level::DEBUG);
    assert!(debug.iter().any(|e| e.message == "menu opening"));
    assert!(debug.iter().any(|e| e.message == "menu closing"));
}

#[test]
fn missing_anchor_on_open_warns() {
    let captured = with_captured_tracing(|| {
        let mut h = Harness::new(&items()).expect("harness");
        h.surface_mut().anchor = None;
        h.session.open(Interaction::Pointer);
    });
    let warns = captured.menu_events(Level::WARN);
    assert_eq!(warns.len(), 1);
    assert!(warns[0].message.contains("anchor missing"));
}

#[test]
fn anchor_lost_while_open_warns_with_phase() {
    let captured = with_captured_tracing(|| {
        let mut h = Harness::new(&items()).expect("harness");
        h.open_settled(Interaction::Pointer);
        h.surface_mut().anchor = None;
        h.session.handle_input(MenuInput::Resize);
    });
    let warns = captured.menu_events(Level::WARN);
    assert_eq!(warns.len(), 1);
    assert!(warns[0].message.contains("force-closing"));
    assert_eq!(warns[0].field("phase"), Some("Open"));
}

#[test]
fn ignored_race_is_logged_at_debug_with_reason() {
    let captured = with_captured_tracing(|| {
        let mut h = Harness::new(&items()).expect("harness");
        h.open_settled(Interaction::Pointer);
        h.click_item(0, "edit");
        h.click_item(0, "edit");
    });
    let debug = captured.menu_events(Level::DEBUG);
    let ignored: Vec<_> = debug
        .iter()
        .filter(|e| e.message == "submenu click ignored")
        .collect();
    assert_eq!(ignored.len(), 1);
    assert_eq!(ignored[0].field("reason"), Some("submenu_opening"));
    assert_eq!(ignored[0].field("level"), Some("1"));
    assert!(captured.menu_events(Level::WARN).is_empty());
}

#[test]
fn submenu_lifecycle_is_logged() {
    let captured = with_captured_tracing(|| {
        let mut h = Harness::new(&items()).expect("harness");
        h.open_settled(Interaction::Pointer);
        h.hover_item(0, "edit");
        h.advance(100);
        h.settle_submenu();
        h.click_item(0, "edit");
    });
    let messages: Vec<&str> = captured
        .menu_events(Level::DEBUG)
        .into_iter()
        .map(|e| e.message.as_str())
        .filter(|m| m.starts_with("submenu"))
        .collect();
    assert_eq!(messages, vec!["submenu opening", "submenu open", "submenu closing"]);
}
