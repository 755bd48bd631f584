use term_dock::mode::{ModeArea, ModeManager, StackedBehavior, TopmostBehavior};
use term_dock::{
    Capabilities, DockController, DockEvent, Dockable, EventLog, ExtendedMode, FlapSide, NodeId, Placement,
    Station,
};

struct Desk {
    ctrl: DockController,
    modes: ModeManager,
    center: NodeId,
    south: NodeId,
    screen: NodeId,
}

fn desk(modes: ModeManager) -> Desk {
    let mut ctrl = DockController::new();
    let center = ctrl.add_station(Station::split("center"));
    let south = ctrl.add_station(Station::flap("south", FlapSide::Bottom));
    let screen = ctrl.add_station(Station::screen("screen"));
    for root in [center, south, screen] {
        ctrl.add_root(root).unwrap();
    }
    let mut desk = Desk {
        ctrl,
        modes,
        center,
        south,
        screen,
    };
    let areas = [
        ("center", ExtendedMode::Normal, center),
        ("center-max", ExtendedMode::Maximized, center),
        ("south", ExtendedMode::Minimized, south),
        ("screen", ExtendedMode::Externalized, screen),
    ];
    for (name, mode, station) in areas {
        desk.modes
            .add_area(desk.ctrl.tree(), ModeArea::new(name, mode, station))
            .unwrap();
    }
    desk
}

fn docked(desk: &mut Desk, titles: &[&str]) -> Vec<NodeId> {
    titles
        .iter()
        .map(|title| {
            let node = desk.ctrl.add_dockable(Dockable::text(*title));
            desk.ctrl.drop(desk.center, node).unwrap();
            node
        })
        .collect()
}

#[test]
fn every_mode_round_trip_restores_the_normal_location() {
    let mut desk = desk(ModeManager::with_behavior(Box::new(TopmostBehavior)));
    let nodes = docked(&mut desk, &["a", "b", "c"]);
    let b = nodes[1];
    let home = desk.ctrl.tree().path_of(b);

    for mode in [
        ExtendedMode::Minimized,
        ExtendedMode::Maximized,
        ExtendedMode::Externalized,
    ] {
        assert!(desk.modes.set_mode(&mut desk.ctrl, b, mode, None).unwrap());
        assert_eq!(desk.modes.mode_of(desk.ctrl.tree(), b), mode);
        assert!(desk.modes.set_mode(&mut desk.ctrl, b, ExtendedMode::Normal, None).unwrap());
        assert_eq!(desk.ctrl.tree().path_of(b), home, "after {mode}");
    }
    desk.ctrl.tree().validate().unwrap();
}

#[test]
fn ensure_basic_modes_is_idempotent_and_restorable() {
    let mut desk = desk(ModeManager::with_behavior(Box::new(TopmostBehavior)));
    let nodes = docked(&mut desk, &["a", "b", "c"]);
    let (a, b) = (nodes[0], nodes[1]);
    desk.modes
        .set_mode(&mut desk.ctrl, a, ExtendedMode::Minimized, None)
        .unwrap();
    desk.modes
        .set_mode(&mut desk.ctrl, b, ExtendedMode::Externalized, None)
        .unwrap();

    let forced = desk.modes.ensure_basic_modes(&mut desk.ctrl).unwrap();
    assert_eq!(forced.len(), 2);
    for node in &nodes {
        assert_eq!(desk.modes.mode_of(desk.ctrl.tree(), *node), ExtendedMode::Normal);
    }

    let log = EventLog::new();
    desk.ctrl.add_listener(log.clone());
    let again = desk.modes.ensure_basic_modes(&mut desk.ctrl).unwrap();
    assert!(again.is_empty());
    assert!(log.events().is_empty());

    desk.modes.restore_forced(&mut desk.ctrl, &forced).unwrap();
    assert_eq!(desk.modes.mode_of(desk.ctrl.tree(), a), ExtendedMode::Minimized);
    assert_eq!(desk.modes.mode_of(desk.ctrl.tree(), b), ExtendedMode::Externalized);
    assert_eq!(desk.ctrl.tree().parent(a), Some(desk.south));
    assert_eq!(desk.ctrl.tree().parent(b), Some(desk.screen));
}

#[test]
fn unsupported_mode_is_refused_without_side_effects() {
    let mut desk = desk(ModeManager::new());
    let pinned = desk.ctrl.add_dockable(Dockable::text("pinned").with_capabilities(Capabilities {
        minimizable: false,
        ..Default::default()
    }));
    desk.ctrl.drop(desk.center, pinned).unwrap();
    let log = EventLog::new();
    desk.ctrl.add_listener(log.clone());
    assert!(!desk
        .modes
        .set_mode(&mut desk.ctrl, pinned, ExtendedMode::Minimized, None)
        .unwrap());
    assert_eq!(desk.ctrl.tree().parent(pinned), Some(desk.center));
    assert!(log.events().is_empty());
}

#[test]
fn stacked_behavior_moves_the_whole_stack() {
    let mut desk = desk(ModeManager::with_behavior(Box::new(StackedBehavior)));
    let nodes = docked(&mut desk, &["a"]);
    let a = nodes[0];
    let b = desk.ctrl.add_dockable(Dockable::text("b"));
    let c = desk.ctrl.add_dockable(Dockable::text("c"));
    desk.ctrl.drop_at(desk.center, b, Placement::Combine { target: a }).unwrap();
    desk.ctrl.drop_at(desk.center, c, Placement::Combine { target: a }).unwrap();
    let stack = desk.ctrl.tree().parent(a).unwrap();

    let log = EventLog::new();
    desk.ctrl.add_listener(log.clone());
    assert!(desk.modes.set_mode(&mut desk.ctrl, b, ExtendedMode::Minimized, None).unwrap());
    for node in [a, b, c] {
        assert_eq!(desk.modes.mode_of(desk.ctrl.tree(), node), ExtendedMode::Minimized);
    }
    assert_eq!(desk.ctrl.tree().parent(stack), Some(desk.south));
    let changes = log
        .events()
        .into_iter()
        .filter(|e| matches!(e, DockEvent::ModeChanged { .. }))
        .count();
    assert_eq!(changes, 3);
}

#[test]
fn stacked_behavior_with_one_incapable_tab_moves_only_the_request() {
    let mut desk = desk(ModeManager::with_behavior(Box::new(StackedBehavior)));
    let nodes = docked(&mut desk, &["a"]);
    let a = nodes[0];
    let b = desk.ctrl.add_dockable(Dockable::text("b"));
    let fixed = desk.ctrl.add_dockable(Dockable::text("fixed").with_capabilities(Capabilities {
        minimizable: false,
        ..Default::default()
    }));
    desk.ctrl.drop_at(desk.center, b, Placement::Combine { target: a }).unwrap();
    desk.ctrl
        .drop_at(desk.center, fixed, Placement::Combine { target: a })
        .unwrap();

    assert!(desk.modes.set_mode(&mut desk.ctrl, b, ExtendedMode::Minimized, None).unwrap());
    assert_eq!(desk.modes.mode_of(desk.ctrl.tree(), b), ExtendedMode::Minimized);
    assert_eq!(desk.modes.mode_of(desk.ctrl.tree(), a), ExtendedMode::Normal);
    assert_eq!(desk.modes.mode_of(desk.ctrl.tree(), fixed), ExtendedMode::Normal);
}
