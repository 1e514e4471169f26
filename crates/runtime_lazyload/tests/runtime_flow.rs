use bus::{Bus, LoaderCommand, LoaderEvent};
use core_types::Rect;
use html::dom_utils::{find_node_by_id, has_class, style_property};
use html::{Node, parse_document};
use lazyload::LazyLoadOptions;
use runtime_lazyload::{LoaderSetup, start_lazyload_runtime};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

const PAGE: &str = r#"
    <body>
      <div id="hero" style="height: 500px" data-background-image-url="/hero.jpg"></div>
      <div style="height: 2000px"></div>
      <div id="footer" style="height: 200px" data-background-image-url=""></div>
    </body>
"#;

fn setup(html: &str, options: LazyLoadOptions) -> LoaderSetup {
    LoaderSetup {
        document: parse_document(html),
        options,
        viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
        root_margin: 0.0,
        base_url: None,
        load_images: false,
    }
}

fn next(rx: &Receiver<LoaderEvent>) -> LoaderEvent {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("runtime event")
}

fn shutdown(bus: &Bus) -> Node {
    let (reply, document) = mpsc::channel();
    bus.cmd_tx.send(LoaderCommand::Shutdown { reply }).unwrap();
    document.recv_timeout(Duration::from_secs(5)).unwrap()
}

#[test]
fn scrolling_through_the_page_loads_each_node_then_disconnects() {
    let (bus, cmd_rx) = Bus::new();
    let handle = start_lazyload_runtime(
        setup(PAGE, LazyLoadOptions::default()),
        cmd_rx,
        bus.evt_tx.clone(),
    )
    .unwrap();
    // The hero is on screen from the start and loads without any scroll.
    assert_eq!(
        next(&bus.evt_rx),
        LoaderEvent::Ready {
            tracked: 2,
            started: 1
        }
    );
    let LoaderEvent::NodeLoaded { id: hero, source } = next(&bus.evt_rx) else {
        panic!("expected the hero to load");
    };
    assert_eq!(source, "/hero.jpg");

    // Halfway down nothing new is visible.
    bus.cmd_tx
        .send(LoaderCommand::Scroll {
            viewport: Rect::new(0.0, 1200.0, 800.0, 600.0),
        })
        .unwrap();
    assert_eq!(next(&bus.evt_rx), LoaderEvent::ScrollHandled { started: 0 });

    bus.cmd_tx
        .send(LoaderCommand::Scroll {
            viewport: Rect::new(0.0, 2200.0, 800.0, 600.0),
        })
        .unwrap();
    assert_eq!(next(&bus.evt_rx), LoaderEvent::ScrollHandled { started: 1 });
    let LoaderEvent::NodeLoaded { id: footer, source } = next(&bus.evt_rx) else {
        panic!("expected the footer to load");
    };
    assert_eq!(source, "/static/image.png");
    assert_eq!(next(&bus.evt_rx), LoaderEvent::ObserverDisconnected);

    let document = shutdown(&bus);
    handle.join().unwrap();

    let hero = find_node_by_id(&document, hero).unwrap();
    assert!(has_class(hero, "loaded"));
    assert_eq!(
        style_property(hero, "background-image"),
        Some("url(/hero.jpg),url(/static/image.png)")
    );
    let footer = find_node_by_id(&document, footer).unwrap();
    assert_eq!(
        style_property(footer, "background-image"),
        Some("url(/static/image.png),url(/static/image.png)")
    );
}

#[test]
fn empty_match_reports_disconnect_up_front() {
    let (bus, cmd_rx) = Bus::new();
    let handle = start_lazyload_runtime(
        setup("<p>plain</p>", LazyLoadOptions::default()),
        cmd_rx,
        bus.evt_tx.clone(),
    )
    .unwrap();

    assert_eq!(
        next(&bus.evt_rx),
        LoaderEvent::Ready {
            tracked: 0,
            started: 0
        }
    );
    assert_eq!(next(&bus.evt_rx), LoaderEvent::ObserverDisconnected);
    bus.cmd_tx
        .send(LoaderCommand::Scroll {
            viewport: Rect::new(0.0, 100.0, 800.0, 600.0),
        })
        .unwrap();
    assert_eq!(next(&bus.evt_rx), LoaderEvent::ScrollHandled { started: 0 });
    shutdown(&bus);
    handle.join().unwrap();
}

#[test]
fn invalid_selector_fails_before_spawning() {
    let (bus, cmd_rx) = Bus::new();
    let result = start_lazyload_runtime(
        setup(PAGE, LazyLoadOptions::default().with_selector("[oops")),
        cmd_rx,
        bus.evt_tx.clone(),
    );
    assert!(result.is_err());
}

#[test]
fn runtime_stops_once_the_host_drops_its_command_sender() {
    let (bus, cmd_rx) = Bus::new();
    let handle = start_lazyload_runtime(
        setup(PAGE, LazyLoadOptions::default()),
        cmd_rx,
        bus.evt_tx.clone(),
    )
    .unwrap();
    assert!(matches!(next(&bus.evt_rx), LoaderEvent::Ready { .. }));

    // Keep listening for events; only the command side goes away.
    let Bus { cmd_tx, evt_rx, .. } = bus;
    drop(cmd_tx);

    let deadline = Instant::now() + Duration::from_secs(5);
    while !handle.is_finished() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(
        handle.is_finished(),
        "runtime still running after its command channel closed"
    );
    handle.join().unwrap();
    drop(evt_rx);
}
