use std::collections::BTreeMap;

use indoc::indoc;

use term_dock::layout::{
    BuildContext, ConvertContext, DataReader, DataWriter, DockFactory, LayoutData, LayoutFile, XmlNode,
};
use term_dock::{
    DockFrontend, DockResult, Dockable, FlapSide, LayoutFormat, MissingStrategy, NodeId, Placement, Station,
};

fn frontend_with_layout() -> DockFrontend {
    let mut frontend = DockFrontend::new();
    let main = frontend.controller_mut().add_station(Station::split("main"));
    let south = frontend
        .controller_mut()
        .add_station(Station::flap("south", FlapSide::Bottom));
    frontend.add_root("main", main).unwrap();
    frontend.add_root("south", south).unwrap();
    for id in ["editor", "outline", "notes", "log"] {
        let node = frontend.controller_mut().add_dockable(Dockable::text(id));
        frontend.add_dockable(id, node).unwrap();
    }
    let editor = frontend.node("editor").unwrap();
    let outline = frontend.node("outline").unwrap();
    let notes = frontend.node("notes").unwrap();
    let log = frontend.node("log").unwrap();
    let scratch = frontend.controller_mut().add_dockable(Dockable::text("scratch"));
    let ctrl = frontend.controller_mut();
    ctrl.drop(main, editor).unwrap();
    ctrl.drop(main, outline).unwrap();
    ctrl.drop_at(main, notes, Placement::Combine { target: outline }).unwrap();
    ctrl.drop(main, scratch).unwrap();
    ctrl.drop(south, log).unwrap();
    frontend
}

#[test]
fn setting_round_trip_is_lossless() {
    let mut frontend = frontend_with_layout();
    let first = frontend.get_setting(true).unwrap();
    frontend.set_setting(&first, true).unwrap();
    let second = frontend.get_setting(true).unwrap();
    assert_eq!(first, second);
    frontend.controller().tree().validate().unwrap();

    let outline = frontend.node("outline").unwrap();
    let notes = frontend.node("notes").unwrap();
    let stack = frontend.controller().tree().parent(outline).unwrap();
    assert_eq!(frontend.controller().tree().parent(notes), Some(stack));
}

#[test]
fn xml_file_round_trip_through_disk() {
    let source = frontend_with_layout();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.xml");
    source.save_file(&path, LayoutFormat::Xml).unwrap();
    assert!(std::fs::read_to_string(&path).unwrap().contains("<frontend"));

    let mut target = DockFrontend::new();
    let main = target.controller_mut().add_station(Station::split("main"));
    let south = target
        .controller_mut()
        .add_station(Station::flap("south", FlapSide::Bottom));
    target.add_root("main", main).unwrap();
    target.add_root("south", south).unwrap();
    for id in ["editor", "outline", "notes", "log"] {
        let node = target.controller_mut().add_dockable(Dockable::text(id));
        target.add_dockable(id, node).unwrap();
    }
    assert_eq!(target.load_file(&path).unwrap(), LayoutFormat::Xml);
    assert_eq!(
        source.get_setting(true).unwrap().roots,
        target.get_setting(true).unwrap().roots
    );
}

#[test]
fn binary_and_xml_encode_the_same_file() {
    let source = frontend_with_layout();
    let situation = source.situation();
    let file = source.to_file().unwrap();
    let from_binary = LayoutFile::from_bytes(situation, &file.to_bytes(situation).unwrap()).unwrap();
    let from_xml = LayoutFile::from_xml_str(situation, &file.to_xml_string(situation).unwrap()).unwrap();
    assert_eq!(from_binary, file);
    assert_eq!(from_xml, file);
}

const CHART_LAYOUT: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <frontend version="1.1.0">
      <settings/>
      <current name="work">
        <roots>
          <root name="main">
            <composition factory="split">
              <layout title="main">
                <node direction="horizontal" weight="1">
                  <leaf index="0" weight="1"/>
                  <leaf index="1" weight="2"/>
                </node>
              </layout>
              <children>
                <composition factory="single">
                  <layout id="editor"/>
                </composition>
                <composition factory="chart">
                  <layout title="prices"/>
                </composition>
              </children>
            </composition>
          </root>
        </roots>
        <invisible>
          <entry key="help" root="main"/>
        </invisible>
      </current>
    </frontend>
"#};

fn chart(title: String) -> LayoutData {
    LayoutData::Properties {
        content: "chart".into(),
        title,
        properties: BTreeMap::new(),
    }
}

#[derive(Debug)]
struct ChartFactory;

impl DockFactory for ChartFactory {
    fn id(&self) -> &str {
        "chart"
    }

    fn layout(&self, _ctx: &ConvertContext<'_>, _node: NodeId) -> Option<LayoutData> {
        None
    }

    fn build(
        &self,
        ctx: &mut BuildContext<'_>,
        data: &LayoutData,
        _children: &[Option<NodeId>],
    ) -> DockResult<Option<NodeId>> {
        let title = format!("chart {}", data.title().unwrap_or_default());
        Ok(Some(ctx.ctrl.add_dockable(Dockable::text(title))))
    }

    fn write(&self, data: &LayoutData, out: &mut DataWriter) -> DockResult<()> {
        out.write_utf(data.title().unwrap_or_default());
        Ok(())
    }

    fn read(&self, input: &mut DataReader<'_>) -> DockResult<LayoutData> {
        Ok(chart(input.read_utf()?))
    }

    fn write_xml(&self, data: &LayoutData) -> DockResult<XmlNode> {
        Ok(XmlNode::new("layout").with_attr("title", data.title().unwrap_or_default()))
    }

    fn read_xml(&self, node: &XmlNode) -> DockResult<LayoutData> {
        Ok(chart(node.required("title")?.to_string()))
    }
}

fn chart_target(strategy: MissingStrategy) -> (DockFrontend, NodeId, NodeId) {
    let mut frontend = DockFrontend::new();
    frontend.set_missing_strategy(strategy);
    let main = frontend.controller_mut().add_station(Station::split("main"));
    frontend.add_root("main", main).unwrap();
    let editor = frontend.controller_mut().add_dockable(Dockable::text("editor"));
    frontend.add_dockable("editor", editor).unwrap();
    (frontend, main, editor)
}

#[test]
fn stored_subtree_appears_once_its_factory_is_registered() {
    let (mut frontend, main, editor) = chart_target(MissingStrategy::Store);
    frontend.read_xml_str(CHART_LAYOUT).unwrap();
    assert_eq!(frontend.current_setting(), Some("work"));
    assert_eq!(frontend.controller().tree().children(main), &[editor]);
    assert_eq!(frontend.pending().len(), 1);
    assert_eq!(frontend.missing_ids().collect::<Vec<_>>(), vec!["help"]);

    let resolved = frontend.register_factory(ChartFactory).unwrap();
    assert_eq!(resolved, 1);
    assert!(frontend.pending().is_empty());
    let children = frontend.controller().tree().children(main).to_vec();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0], editor);
    assert_eq!(frontend.controller().tree().title(children[1]), Some("chart prices"));
}

#[test]
fn purge_discards_unknown_factories_and_ids() {
    let (mut frontend, main, editor) = chart_target(MissingStrategy::Purge);
    frontend.read_xml_str(CHART_LAYOUT).unwrap();
    assert_eq!(frontend.controller().tree().children(main), &[editor]);
    assert!(frontend.pending().is_empty());
    assert_eq!(frontend.missing_ids().count(), 0);
    assert_eq!(frontend.register_factory(ChartFactory).unwrap(), 0);
    assert_eq!(frontend.controller().tree().children(main), &[editor]);
}

#[test]
fn newer_version_is_rejected_before_anything_changes() {
    let (mut frontend, main, editor) = chart_target(MissingStrategy::Store);
    frontend.controller_mut().drop(main, editor).unwrap();
    let newer = CHART_LAYOUT.replace("version=\"1.1.0\"", "version=\"9.0.0\"");
    assert!(matches!(
        frontend.read_xml_str(&newer),
        Err(term_dock::DockError::UnsupportedVersion { .. })
    ));
    assert_eq!(frontend.controller().tree().children(main), &[editor]);
    assert!(frontend.current_setting().is_none());
}

fn split_south_target() -> (DockFrontend, NodeId, NodeId) {
    let mut frontend = DockFrontend::new();
    let main = frontend.controller_mut().add_station(Station::split("main"));
    let south = frontend.controller_mut().add_station(Station::split("south"));
    frontend.add_root("main", main).unwrap();
    frontend.add_root("south", south).unwrap();
    for (id, root) in [("editor", main), ("outline", main), ("notes", main), ("log", south)] {
        let node = frontend.controller_mut().add_dockable(Dockable::text(id));
        frontend.controller_mut().drop(root, node).unwrap();
        frontend.add_dockable(id, node).unwrap();
    }
    (frontend, main, south)
}

#[test]
fn mismatched_root_kind_leaves_the_tree_intact() {
    let source = frontend_with_layout();
    let setting = source.get_setting(true).unwrap();
    let (mut target, main, south) = split_south_target();
    target.save("before").unwrap();
    let before = target.get_setting(true).unwrap();
    let main_children = target.controller().tree().children(main).to_vec();

    assert!(matches!(
        target.set_setting(&setting, true),
        Err(term_dock::DockError::Format(_))
    ));
    let tree = target.controller().tree();
    assert_eq!(tree.children(main), main_children.as_slice());
    assert_eq!(tree.parent(target.node("log").unwrap()), Some(south));
    tree.validate().unwrap();
    assert_eq!(target.get_setting(true).unwrap(), before);

    // a whole file with the same mismatch keeps the named settings too
    let text = source.to_xml_string().unwrap();
    assert!(target.read_xml_str(&text).is_err());
    assert_eq!(target.setting_names().collect::<Vec<_>>(), vec!["before"]);
    assert_eq!(target.current_setting(), Some("before"));
    assert_eq!(target.get_setting(true).unwrap(), before);
}

fn nested_compositions(levels: usize) -> String {
    let mut body = String::from(r#"<composition factory="raw"><layout/></composition>"#);
    for _ in 0..levels {
        body = format!(r#"<composition factory="raw"><layout/><children>{body}</children></composition>"#);
    }
    format!(
        r#"<frontend version="1.1.0"><settings/><current><roots><root name="main">{body}</root></roots></current></frontend>"#
    )
}

#[test]
fn malformed_files_fail_without_touching_the_tree() {
    let mut frontend = frontend_with_layout();
    let before = frontend.get_setting(true).unwrap();
    let bytes = frontend.to_bytes().unwrap();

    let unchanged = |frontend: &DockFrontend| {
        frontend.controller().tree().validate().unwrap();
        assert_eq!(frontend.get_setting(true).unwrap(), before);
    };

    for cut in [1, bytes.len() / 3, bytes.len() / 2, bytes.len() - 1] {
        assert!(frontend.read_bytes(&bytes[..cut]).is_err());
        unchanged(&frontend);
    }
    assert!(frontend.read_bytes(&[0xff; 32]).is_err());
    unchanged(&frontend);

    let elements = format!("{}{}", "<frontend>".repeat(50_000), "</frontend>".repeat(50_000));
    assert!(matches!(
        frontend.read_xml_str(&elements),
        Err(term_dock::DockError::Format(_))
    ));
    unchanged(&frontend);

    assert!(matches!(
        frontend.read_xml_str(&nested_compositions(100)),
        Err(term_dock::DockError::Format(_))
    ));
    unchanged(&frontend);

    assert!(frontend.read_xml_str("<frontend version=\"1.1.0\"><current>").is_err());
    unchanged(&frontend);
}
