//! Integration tests for event fan-out: ordering, strict sends, the model
//! layering rule and reentrant sends during delivery.

use kestrel_mvc::{App, Context, Controller, DataBag, Envelope, Model, Notification, Sponsor, View};
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Event = Envelope<i64>;
type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// A view type per `ID`, so several can be registered side by side.
struct Listener<const ID: u8> {
    log: Log,
    kinds: Vec<&'static str>,
}

impl<const ID: u8> Listener<ID> {
    fn new(log: &Log, kinds: &[&'static str]) -> Self {
        Self {
            log: Rc::clone(log),
            kinds: kinds.to_vec(),
        }
    }
}

impl<const ID: u8> View<Event> for Listener<ID> {
    fn event_interests(&self) -> Vec<Cow<'static, str>> {
        self.kinds.iter().map(|k| Cow::Borrowed(*k)).collect()
    }

    fn handle_event(&self, event: &Event, _sponsor: &Sponsor, _ctx: &Context<'_, Event>) {
        self.log.borrow_mut().push(format!("v{ID}:{}", event.kind()));
    }
}

struct Recorder {
    log: Log,
}

impl Controller<Event> for Recorder {
    fn execute(&self, event: &Event, _sponsor: &Sponsor, _ctx: &Context<'_, Event>) {
        self.log.borrow_mut().push(format!("c:{}", event.kind()));
    }
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_views_notified_in_subscription_order() {
    let app = App::<Event>::new();
    let log = new_log();
    app.register_view_with(|| Listener::<1>::new(&log, &["x"]), None).unwrap();
    app.register_view_with(|| Listener::<2>::new(&log, &["x", "y"]), None).unwrap();
    app.register_view_with(|| Listener::<3>::new(&log, &["y"]), None).unwrap();

    assert_eq!(app.notify(&Envelope::new("x", 0), &Sponsor::External), 2);
    assert_eq!(app.notify(&Envelope::new("y", 0), &Sponsor::External), 2);
    assert_eq!(entries(&log), ["v1:x", "v2:x", "v2:y", "v3:y"]);
}

#[test]
fn test_repeated_interest_subscribes_once() {
    let app = App::<Event>::new();
    let log = new_log();
    app.register_view_with(|| Listener::<1>::new(&log, &["x", "x", "y", "x"]), None)
        .unwrap();

    assert_eq!(app.views().subscribers("x").len(), 1);
    assert_eq!(app.views().interests::<Listener<1>>().len(), 2);

    app.notify(&Envelope::new("x", 0), &Sponsor::External);
    assert_eq!(entries(&log), ["v1:x"]);
}

#[test]
fn test_interests_are_fixed_until_refreshed() {
    struct Shifty {
        kinds: RefCell<Vec<&'static str>>,
        hits: Cell<u32>,
    }

    impl View<Event> for Shifty {
        fn event_interests(&self) -> Vec<Cow<'static, str>> {
            self.kinds.borrow().iter().map(|k| Cow::Borrowed(*k)).collect()
        }

        fn handle_event(&self, _event: &Event, _sponsor: &Sponsor, _ctx: &Context<'_, Event>) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    let app = App::<Event>::new();
    let log = new_log();
    let shifty = app
        .register_view_with(
            || Shifty {
                kinds: RefCell::new(vec!["a", "b"]),
                hits: Cell::new(0),
            },
            None,
        )
        .unwrap();
    app.register_view_with(|| Listener::<1>::new(&log, &["b", "c"]), None).unwrap();

    *shifty.kinds.borrow_mut() = vec!["b", "c"];
    assert_eq!(app.notify(&Envelope::new("c", 0), &Sponsor::External), 1);
    assert_eq!(shifty.hits.get(), 0);

    assert!(app.refresh_interests::<Shifty>());
    assert_eq!(app.notify(&Envelope::new("a", 0), &Sponsor::External), 0);
    assert_eq!(app.notify(&Envelope::new("c", 0), &Sponsor::External), 2);
    assert_eq!(shifty.hits.get(), 1);

    // `b` was kept, so Shifty stays ahead of Listener<1>; `c` was new, so it goes last.
    let b: Vec<&str> = app.views().subscribers("b").iter().map(|t| t.short_name()).collect();
    assert_eq!(b, ["Shifty", "Listener<1>"]);
    let c: Vec<&str> = app.views().subscribers("c").iter().map(|t| t.short_name()).collect();
    assert_eq!(c, ["Listener<1>", "Shifty"]);
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn test_view_send_reaches_controller_first() {
    let app = App::<Event>::new();
    let log = new_log();
    app.register_controller_with("x", || Recorder { log: Rc::clone(&log) }).unwrap();
    app.register_view_with(|| Listener::<1>::new(&log, &["x"]), None).unwrap();

    app.view_context::<Listener<1>>().unwrap().send_event(Envelope::new("x", 0));
    assert_eq!(entries(&log), ["c:x", "v1:x"]);
}

#[test]
fn test_controller_send_reaches_views_first() {
    let app = App::<Event>::new();
    let log = new_log();
    app.register_controller_with("x", || Recorder { log: Rc::clone(&log) }).unwrap();
    app.register_view_with(|| Listener::<1>::new(&log, &["x"]), None).unwrap();

    app.controller_context("x").unwrap().send_event(Envelope::new("x", 0));
    assert_eq!(entries(&log), ["v1:x", "c:x"]);
}

#[test]
fn test_strict_send_skips_controllers() {
    let app = App::<Event>::new();
    let log = new_log();
    app.register_controller_with("x", || Recorder { log: Rc::clone(&log) }).unwrap();
    app.register_view_with(|| Listener::<1>::new(&log, &["x"]), None).unwrap();

    app.view_context::<Listener<1>>().unwrap().send_event_strict(Envelope::new("x", 0));
    app.controller_context("x").unwrap().send_event_strict(Envelope::new("x", 0));
    app.external_context().send_event_strict(Envelope::new("x", 0));

    assert_eq!(entries(&log), ["v1:x", "v1:x", "v1:x"]);
}

#[test]
fn test_sponsor_is_passed_through() {
    struct Witness {
        seen: RefCell<Vec<Sponsor>>,
    }

    impl View<Event> for Witness {
        fn event_interests(&self) -> Vec<Cow<'static, str>> {
            vec!["x".into()]
        }

        fn handle_event(&self, _event: &Event, sponsor: &Sponsor, ctx: &Context<'_, Event>) {
            assert!(ctx.sponsor().is_view::<Self>());
            self.seen.borrow_mut().push(sponsor.clone());
        }
    }

    let app = App::<Event>::new();
    let witness = app
        .register_view_with(|| Witness { seen: RefCell::new(Vec::new()) }, None)
        .unwrap();
    app.register_controller_with("x", || Recorder { log: new_log() }).unwrap();

    app.send_external(Envelope::new("x", 0));
    app.controller_context("x").unwrap().send_event(Envelope::new("x", 0));

    let seen = witness.seen.borrow();
    assert_eq!(seen[0], Sponsor::External);
    assert!(seen[1].is_controller("x"));
}

// ============================================================================
// Models never address controllers
// ============================================================================

#[derive(Default)]
struct Counter {
    data: DataBag,
}

impl Model<Event> for Counter {
    fn data(&self) -> &DataBag {
        &self.data
    }
}

#[derive(Default)]
struct IncController {
    calls: Cell<u32>,
}

impl Controller<Event> for IncController {
    fn execute(&self, _event: &Event, _sponsor: &Sponsor, _ctx: &Context<'_, Event>) {
        self.calls.set(self.calls.get() + 1);
    }
}

#[derive(Default)]
struct CounterView {
    count: Cell<u32>,
}

impl View<Event> for CounterView {
    fn event_interests(&self) -> Vec<Cow<'static, str>> {
        vec!["inc".into()]
    }

    fn handle_event(&self, _event: &Event, sponsor: &Sponsor, _ctx: &Context<'_, Event>) {
        assert!(sponsor.is_model::<Counter>());
        self.count.set(self.count.get() + 1);
    }
}

#[test]
fn test_model_event_reaches_views_only() {
    let app = App::<Event>::new();
    let counter = app
        .register_model::<Counter>(Some(toml::from_str("count = 0").unwrap()))
        .unwrap();
    let controller = app.register_controller::<IncController>("inc").unwrap();
    let view = app.register_view::<CounterView>(None).unwrap();

    let ctx = app.model_context::<Counter>().unwrap();
    ctx.send_event(Envelope::new("inc", 0));

    assert_eq!(view.count.get(), 1);
    assert_eq!(controller.calls.get(), 0);

    // Strict or not, a model never dispatches.
    ctx.send_event_strict(Envelope::new("inc", 0));
    assert_eq!(view.count.get(), 2);
    assert_eq!(controller.calls.get(), 0);
    assert_eq!(counter.data().get::<i64>("count"), Some(0));
}

// ============================================================================
// Reentrancy
// ============================================================================

/// On "x", sends "y" as itself; the "y" controller removes `Listener<2>`.
struct Trigger {
    log: Log,
}

impl View<Event> for Trigger {
    fn event_interests(&self) -> Vec<Cow<'static, str>> {
        vec!["x".into()]
    }

    fn handle_event(&self, event: &Event, _sponsor: &Sponsor, ctx: &Context<'_, Event>) {
        self.log.borrow_mut().push(format!("trigger:{}", event.kind()));
        ctx.send_event(Envelope::new("y", 0));
    }
}

struct Remover {
    log: Log,
}

impl Controller<Event> for Remover {
    fn execute(&self, _event: &Event, _sponsor: &Sponsor, ctx: &Context<'_, Event>) {
        let removed = ctx.app().remove_view::<Listener<2>>();
        self.log.borrow_mut().push(format!("remove:v2:{removed}"));
    }
}

#[test]
fn test_removal_during_fanout_skips_no_one() {
    let app = App::<Event>::new();
    let log = new_log();
    app.register_view_with(|| Trigger { log: Rc::clone(&log) }, None).unwrap();
    app.register_view_with(|| Listener::<2>::new(&log, &["x"]), None).unwrap();
    app.register_view_with(|| Listener::<3>::new(&log, &["x"]), None).unwrap();
    app.register_controller_with("y", || Remover { log: Rc::clone(&log) }).unwrap();

    assert_eq!(app.notify(&Envelope::new("x", 0), &Sponsor::External), 3);
    assert_eq!(entries(&log), ["trigger:x", "remove:v2:true", "v2:x", "v3:x"]);
    assert!(!app.views().contains::<Listener<2>>());

    // The next fan-out sees the updated subscriber list.
    log.borrow_mut().clear();
    assert_eq!(app.notify(&Envelope::new("x", 0), &Sponsor::External), 2);
    assert_eq!(entries(&log), ["trigger:x", "remove:v2:false", "v3:x"]);
}

/// Registers `Listener<9>` for "x" while "x" is being delivered.
struct Spawner {
    log: Log,
    spawned: Cell<bool>,
}

impl View<Event> for Spawner {
    fn event_interests(&self) -> Vec<Cow<'static, str>> {
        vec!["x".into()]
    }

    fn handle_event(&self, _event: &Event, _sponsor: &Sponsor, ctx: &Context<'_, Event>) {
        if !self.spawned.replace(true) {
            let log = Rc::clone(&self.log);
            ctx.app()
                .register_view_with(move || Listener::<9>::new(&log, &["x"]), None)
                .unwrap();
        }
    }
}

#[test]
fn test_registration_during_fanout_waits_for_next_event() {
    let app = App::<Event>::new();
    let log = new_log();
    app.register_view_with(
        || Spawner {
            log: Rc::clone(&log),
            spawned: Cell::new(false),
        },
        None,
    )
    .unwrap();

    assert_eq!(app.notify(&Envelope::new("x", 0), &Sponsor::External), 1);
    assert!(entries(&log).is_empty());

    assert_eq!(app.notify(&Envelope::new("x", 0), &Sponsor::External), 2);
    assert_eq!(entries(&log), ["v9:x"]);
}

/// Counts down by re-sending its own event through the controller.
#[derive(Default)]
struct Countdown {
    depth: Cell<u32>,
}

impl View<Event> for Countdown {
    fn event_interests(&self) -> Vec<Cow<'static, str>> {
        vec!["tick".into()]
    }

    fn handle_event(&self, event: &Event, _sponsor: &Sponsor, ctx: &Context<'_, Event>) {
        self.depth.set(self.depth.get() + 1);
        let remaining = *event.payload();
        if remaining > 0 {
            ctx.send_event(Envelope::new("tick", remaining - 1));
        }
    }
}

#[test]
fn test_nested_sends_reenter_dispatch() {
    let app = App::<Event>::new();
    let view = app.register_view::<Countdown>(None).unwrap();
    let ticks = app.register_controller::<IncController>("tick").unwrap();

    app.send_external(Envelope::new("tick", 3));

    assert_eq!(view.depth.get(), 4);
    assert_eq!(ticks.calls.get(), 4);
}
