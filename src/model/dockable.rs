use std::collections::BTreeMap;
use std::fmt;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;

use super::station::Station;
use super::{ExtendedMode, Focusable, Persistable};

/// The application side of a dockable: what it shows and how it is rebuilt
/// from a saved layout.
pub trait DockContent: fmt::Debug {
    /// Id of the factory that can recreate this content from its layout
    /// properties.
    fn factory_id(&self) -> &str;

    /// Data written into the layout when this dockable is not registered
    /// under a fixed id.
    fn layout_properties(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn accept_station(&self, _station: &Station) -> bool {
        true
    }

    fn accept_combination(&self, _station: &Station, _neighbour: &Dockable) -> bool {
        true
    }

    fn render(&self, _frame: &mut Frame, _area: Rect, _focused: bool) {}
}

/// Plain text content; enough for tests, demos and stubs handed out by backup
/// factories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent {
    factory: String,
    text: String,
}

impl TextContent {
    pub const FACTORY_ID: &'static str = "text";

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            factory: Self::FACTORY_ID.to_string(),
            text: text.into(),
        }
    }

    pub fn with_factory(factory: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            factory: factory.into(),
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl DockContent for TextContent {
    fn factory_id(&self) -> &str {
        &self.factory
    }

    fn layout_properties(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("text".to_string(), self.text.clone())])
    }

    fn render(&self, frame: &mut Frame, area: Rect, _focused: bool) {
        frame.render_widget(Paragraph::new(self.text.as_str()), area);
    }
}

/// Which extended modes a dockable may enter and whether it may be stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub maximizable: bool,
    pub minimizable: bool,
    pub externalizable: bool,
    pub stackable: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            maximizable: true,
            minimizable: true,
            externalizable: true,
            stackable: true,
        }
    }
}

impl Capabilities {
    pub fn supports(&self, mode: ExtendedMode) -> bool {
        match mode {
            ExtendedMode::Normal => true,
            ExtendedMode::Minimized => self.minimizable,
            ExtendedMode::Maximized => self.maximizable,
            ExtendedMode::Externalized => self.externalizable,
        }
    }
}

/// An entry of a dockable's local action list; rendering code turns these
/// into title-bar buttons or menu items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockAction {
    pub id: String,
    pub label: String,
}

impl DockAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Handle for a title view bound to a dockable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TitleId(u32);

#[derive(Debug)]
pub struct Dockable {
    title: String,
    icon: Option<String>,
    tooltip: Option<String>,
    titles: Vec<TitleId>,
    next_title: u32,
    actions: Vec<DockAction>,
    mode: ExtendedMode,
    capabilities: Capabilities,
    placeholder: Option<String>,
    content: Box<dyn DockContent>,
}

impl Dockable {
    pub fn new(title: impl Into<String>, content: impl DockContent + 'static) -> Self {
        Self::with_boxed_content(title, Box::new(content))
    }

    pub fn with_boxed_content(title: impl Into<String>, content: Box<dyn DockContent>) -> Self {
        Self {
            title: title.into(),
            icon: None,
            tooltip: None,
            titles: Vec::new(),
            next_title: 0,
            actions: Vec::new(),
            mode: ExtendedMode::Normal,
            capabilities: Capabilities::default(),
            placeholder: None,
            content,
        }
    }

    /// A text dockable, mostly useful in tests.
    pub fn text(title: impl Into<String>) -> Self {
        let title = title.into();
        let content = TextContent::new(title.clone());
        Self::new(title, content)
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_action(mut self, action: DockAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    pub fn actions(&self) -> &[DockAction] {
        &self.actions
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn set_capabilities(&mut self, capabilities: Capabilities) {
        self.capabilities = capabilities;
    }

    pub fn mode(&self) -> ExtendedMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: ExtendedMode) {
        self.mode = mode;
    }

    pub fn content(&self) -> &dyn DockContent {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> &mut dyn DockContent {
        self.content.as_mut()
    }

    pub fn bind_title(&mut self) -> TitleId {
        let id = TitleId(self.next_title);
        self.next_title = self.next_title.wrapping_add(1);
        self.titles.push(id);
        id
    }

    pub fn unbind_title(&mut self, id: TitleId) -> bool {
        let before = self.titles.len();
        self.titles.retain(|t| *t != id);
        before != self.titles.len()
    }

    pub fn bound_titles(&self) -> &[TitleId] {
        &self.titles
    }
}

impl Persistable for Dockable {
    fn factory_id(&self) -> &str {
        self.content.factory_id()
    }
}

impl Focusable for Dockable {}
