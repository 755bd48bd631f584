use term_dock::layout::{DockLayoutComposition, LayoutData, LayoutInfo, Setting};
use term_dock::mode::{ModeArea, ModeManager, TopmostBehavior};
use term_dock::{DockController, DockFrontend, Dockable, ExtendedMode, NodeId, Placement, Station};

fn outline(composition: &DockLayoutComposition) -> Vec<(usize, String)> {
    composition
        .factory_outline()
        .into_iter()
        .map(|(depth, id)| (depth, id.to_string()))
        .collect()
}

#[test]
fn scenario_a_load_restores_moved_dockable() {
    let mut frontend = DockFrontend::new();
    let left = frontend.controller_mut().add_station(Station::split("left"));
    let right = frontend.controller_mut().add_station(Station::split("right"));
    frontend.add_root("left", left).unwrap();
    frontend.add_root("right", right).unwrap();
    let a = frontend.controller_mut().add_dockable(Dockable::text("A"));
    frontend.add_dockable("A", a).unwrap();
    frontend.controller_mut().drop(left, a).unwrap();
    let original = frontend.controller().tree().path_of(a);
    frontend.save("S1").unwrap();

    frontend
        .controller_mut()
        .move_to(a, right, Placement::Default)
        .unwrap();
    assert_eq!(frontend.controller().tree().parent(a), Some(right));

    frontend.load("S1").unwrap();
    assert_eq!(frontend.controller().tree().parent(a), Some(left));
    assert_eq!(frontend.controller().tree().path_of(a), original);
    assert!(frontend.controller().tree().children(right).is_empty());
    frontend.controller().tree().validate().unwrap();
}

#[test]
fn scenario_b_backup_factory_fills_missing_single() {
    let mut source = DockFrontend::new();
    let main = source.controller_mut().add_station(Station::split("main"));
    source.add_root("main", main).unwrap();
    for id in ["other", "panel-1"] {
        let node = source.controller_mut().add_dockable(Dockable::text(id));
        source.controller_mut().drop(main, node).unwrap();
        source.add_dockable(id, node).unwrap();
    }
    let expected = source
        .controller()
        .tree()
        .path_of(source.node("panel-1").unwrap())
        .map(|(_, path)| path);
    let setting: Setting = source.get_setting(true).unwrap();

    let mut target = DockFrontend::new();
    let main = target.controller_mut().add_station(Station::split("main"));
    target.add_root("main", main).unwrap();
    let other = target.controller_mut().add_dockable(Dockable::text("other"));
    target.add_dockable("other", other).unwrap();
    target.add_backup_factory("panel-1", |id: &str| Some(Dockable::text(format!("{id} (restored)"))));

    target.set_setting(&setting, true).unwrap();
    let panel = target.node("panel-1").unwrap();
    assert!(target.controller().register().is_registered(panel));
    assert!(target.is_shown("panel-1"));
    assert_eq!(
        target.controller().tree().path_of(panel).map(|(_, path)| path),
        expected
    );
    assert_eq!(target.controller().tree().title(panel), Some("panel-1 (restored)"));
}

#[test]
fn scenario_c_topmost_keeps_one_maximized() {
    let mut ctrl = DockController::new();
    let center = ctrl.add_station(Station::split("center"));
    ctrl.add_root(center).unwrap();
    let mut modes = ModeManager::with_behavior(Box::new(TopmostBehavior));
    modes
        .add_area(ctrl.tree(), ModeArea::new("center", ExtendedMode::Normal, center))
        .unwrap();
    modes
        .add_area(ctrl.tree(), ModeArea::new("center-max", ExtendedMode::Maximized, center))
        .unwrap();
    let nodes: Vec<NodeId> = ["A", "B", "C"]
        .into_iter()
        .map(|title| {
            let node = ctrl.add_dockable(Dockable::text(title));
            ctrl.drop(center, node).unwrap();
            node
        })
        .collect();
    let (b, c) = (nodes[1], nodes[2]);

    assert!(modes.set_mode(&mut ctrl, c, ExtendedMode::Maximized, None).unwrap());
    assert_eq!(modes.mode_of(ctrl.tree(), c), ExtendedMode::Maximized);

    assert!(modes.set_mode(&mut ctrl, b, ExtendedMode::Maximized, None).unwrap());
    assert_eq!(modes.mode_of(ctrl.tree(), b), ExtendedMode::Maximized);
    assert_eq!(modes.mode_of(ctrl.tree(), c), ExtendedMode::Normal);
    let maximized = nodes
        .iter()
        .filter(|n| modes.mode_of(ctrl.tree(), **n) == ExtendedMode::Maximized)
        .count();
    assert_eq!(maximized, 1);
    ctrl.tree().validate().unwrap();
}

#[test]
fn scenario_c_holds_across_maximize_areas() {
    let mut ctrl = DockController::new();
    let left = ctrl.add_station(Station::split("left"));
    let right = ctrl.add_station(Station::split("right"));
    ctrl.add_root(left).unwrap();
    ctrl.add_root(right).unwrap();
    let mut modes = ModeManager::with_behavior(Box::new(TopmostBehavior));
    let areas = [
        ("left", ExtendedMode::Normal, left),
        ("left-max", ExtendedMode::Maximized, left),
        ("right", ExtendedMode::Normal, right),
        ("right-max", ExtendedMode::Maximized, right),
    ];
    for (name, mode, station) in areas {
        modes.add_area(ctrl.tree(), ModeArea::new(name, mode, station)).unwrap();
    }
    let mut dock = |title: &str, station: NodeId| {
        let node = ctrl.add_dockable(Dockable::text(title));
        ctrl.drop(station, node).unwrap();
        node
    };
    let a = dock("A", left);
    let b = dock("B", left);
    let c = dock("C", right);
    let d = dock("D", right);
    let c_home = ctrl.tree().path_of(c);

    assert!(modes
        .set_mode(&mut ctrl, c, ExtendedMode::Maximized, Some("right-max"))
        .unwrap());
    assert_eq!(ctrl.tree().station(right).unwrap().fullscreen(), Some(c));

    assert!(modes
        .set_mode(&mut ctrl, b, ExtendedMode::Maximized, Some("left-max"))
        .unwrap());
    assert_eq!(modes.mode_of(ctrl.tree(), b), ExtendedMode::Maximized);
    assert_eq!(modes.mode_of(ctrl.tree(), c), ExtendedMode::Normal);
    assert_eq!(ctrl.tree().station(right).unwrap().fullscreen(), None);
    assert_eq!(ctrl.tree().path_of(c), c_home);
    let maximized = [a, b, c, d]
        .iter()
        .filter(|n| modes.mode_of(ctrl.tree(), **n) == ExtendedMode::Maximized)
        .count();
    assert_eq!(maximized, 1);
    ctrl.tree().validate().unwrap();
}

fn populated(frontend: &mut DockFrontend) -> (NodeId, NodeId) {
    let main = frontend.controller_mut().add_station(Station::split("main"));
    let side = frontend.controller_mut().add_station(Station::stack("side"));
    frontend.add_root("main", main).unwrap();
    frontend.add_root("side", side).unwrap();
    for id in ["editor", "outline", "notes"] {
        let node = frontend.controller_mut().add_dockable(Dockable::text(id));
        frontend.add_dockable(id, node).unwrap();
    }
    (main, side)
}

#[test]
fn scenario_d_binary_setting_reads_back_in_fresh_frontend() {
    let mut source = DockFrontend::new();
    let (main, side) = populated(&mut source);
    let editor = source.node("editor").unwrap();
    let outline_node = source.node("outline").unwrap();
    let notes = source.node("notes").unwrap();
    let scratch = source.controller_mut().add_dockable(Dockable::text("scratch"));
    source.controller_mut().drop(main, editor).unwrap();
    source.controller_mut().drop(main, scratch).unwrap();
    source.controller_mut().drop(side, outline_node).unwrap();
    source.controller_mut().drop(side, notes).unwrap();
    let written = source.get_setting(false).unwrap();
    let bytes = source.to_bytes().unwrap();

    let mut fresh = DockFrontend::new();
    populated(&mut fresh);
    fresh.read_bytes(&bytes).unwrap();
    let read = fresh.get_setting(false).unwrap();

    assert_eq!(
        written.roots.keys().collect::<Vec<_>>(),
        read.roots.keys().collect::<Vec<_>>()
    );
    for (name, composition) in &written.roots {
        assert_eq!(outline(composition), outline(&read.roots[name]), "root {name}");
    }
    let scratch_layout = &read.roots["main"].children[1].layout;
    assert!(matches!(
        scratch_layout,
        LayoutInfo::Data { data: LayoutData::Properties { title, .. }, .. } if title == "scratch"
    ));
}
