use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tracing::{info, warn};

use term_dock::layout::LayoutFormat;
use term_dock::relocate::hit_test;
use term_dock::render::{render_preview, render_root};
use term_dock::tracing_sub::{self, LogHandle};
use term_dock::{
    DockConfig, DockContent, DockFrontend, DockResult, Dockable, ExtendedMode, FlapSide, FocusRequest, NodeId,
    Relocator, Station,
};

/// Docking demo: drag tabs and panels with the mouse, change modes with the
/// keyboard.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Layout file to restore at start and to write with `s`.
    #[arg(long, default_value = "term-dock-layout.bin")]
    layout: PathBuf,
    /// JSON file with tunables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write layouts as XML instead of binary.
    #[arg(long)]
    xml: bool,
}

const HELP: &str = "m minimize  x maximize  e externalize  n normal  h hide  u unhide  s save  l load  Tab focus  q quit";

fn main() -> io::Result<()> {
    let args = Args::parse();
    let log = LogHandle::default();
    tracing_sub::set_global_log(log.clone());
    tracing_sub::init_default();

    let config = match &args.config {
        Some(path) => DockConfig::load(path).map_err(io::Error::other)?,
        None => DockConfig::default(),
    };
    let mut app = App::new(&config, args, log).map_err(io::Error::other)?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, event::EnableMouseCapture)?;
    terminal::enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        event::DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

/// Shows the tail of the tracing buffer.
#[derive(Debug)]
struct LogContent {
    log: LogHandle,
}

impl DockContent for LogContent {
    fn factory_id(&self) -> &str {
        "log"
    }

    fn render(&self, frame: &mut Frame, area: Rect, _focused: bool) {
        let lines = self.log.tail(area.height as usize).join("\n");
        frame.render_widget(Paragraph::new(lines), area);
    }
}

struct App {
    frontend: DockFrontend,
    relocator: Relocator,
    center: NodeId,
    south: NodeId,
    screen: NodeId,
    hidden: Vec<String>,
    args: Args,
}

impl App {
    fn new(config: &DockConfig, args: Args, log: LogHandle) -> DockResult<Self> {
        let mut frontend = DockFrontend::with_config(config);
        let ctrl = frontend.controller_mut();
        let center = ctrl.add_station(Station::split("center"));
        let south = ctrl.add_station(Station::flap("south", FlapSide::Bottom));
        let screen = ctrl.add_station(Station::screen("screen"));
        frontend.add_root("center", center)?;
        frontend.add_root("south", south)?;
        frontend.add_root("screen", screen)?;
        frontend.add_area("center", ExtendedMode::Normal, center)?;
        frontend.add_area("center-max", ExtendedMode::Maximized, center)?;
        frontend.add_area("south", ExtendedMode::Minimized, south)?;
        frontend.add_area("screen", ExtendedMode::Externalized, screen)?;

        let panels = [
            ("editor", Dockable::text("editor").with_tooltip("main document")),
            ("outline", Dockable::text("outline")),
            ("notes", Dockable::text("notes")),
            ("log", Dockable::new("log", LogContent { log })),
        ];
        for (id, dockable) in panels {
            let node = frontend.controller_mut().add_dockable(dockable);
            frontend.controller_mut().drop(center, node)?;
            frontend.add_dockable(id, node)?;
        }
        frontend.save("default")?;

        if args.layout.exists()
            && let Err(err) = frontend.load_file(&args.layout)
        {
            warn!(%err, path = %args.layout.display(), "layout file ignored");
        }

        Ok(Self {
            frontend,
            relocator: Relocator::from_config(config),
            center,
            south,
            screen,
            hidden: Vec::new(),
            args,
        })
    }

    fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => {
                    if self.handle_key(key) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => {
                    let ctrl = self.frontend.controller_mut();
                    if matches!(mouse.kind, MouseEventKind::Down(_))
                        && let Some(node) = hit_test(ctrl, mouse.column, mouse.row)
                    {
                        ctrl.focus(FocusRequest::new(node));
                    }
                    if let Err(err) = self.relocator.handle_mouse(ctrl, &mouse) {
                        warn!(%err, "drop failed");
                    }
                    self.refresh_modes();
                }
                _ => {}
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let body = Rect {
            height: area.height.saturating_sub(2),
            ..area
        };
        let strip = Rect {
            y: area.y + body.height,
            height: 1.min(area.height),
            ..area
        };
        let help = Rect {
            y: strip.y + strip.height,
            height: area.height.saturating_sub(body.height + strip.height),
            ..area
        };
        let ctrl = self.frontend.controller_mut();
        render_root(frame, ctrl, self.center, body);
        render_root(frame, ctrl, self.south, strip);
        render_root(frame, ctrl, self.screen, body);
        if let Some(preview) = self.relocator.preview() {
            render_preview(frame, preview);
        }
        frame.render_widget(Paragraph::new(HELP), help);
    }

    /// Returns `true` to quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('q') || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return true;
        }
        if key.code == KeyCode::Esc {
            self.relocator.cancel();
            return false;
        }
        let result = match key.code {
            KeyCode::Tab => {
                self.frontend.controller_mut().advance_focus(true);
                Ok(())
            }
            KeyCode::BackTab => {
                self.frontend.controller_mut().advance_focus(false);
                Ok(())
            }
            KeyCode::Char('m') => self.set_focused_mode(ExtendedMode::Minimized),
            KeyCode::Char('x') => self.toggle_maximized(),
            KeyCode::Char('e') => self.set_focused_mode(ExtendedMode::Externalized),
            KeyCode::Char('n') => self.set_focused_mode(ExtendedMode::Normal),
            KeyCode::Char('h') => self.hide_focused(),
            KeyCode::Char('u') => self.unhide(),
            KeyCode::Char('s') => self.save(),
            KeyCode::Char('l') => self.frontend.load_file(&self.args.layout).map(|_| ()),
            _ => Ok(()),
        };
        if let Err(err) = result {
            warn!(%err, "command failed");
        }
        false
    }

    fn focused_id(&self) -> Option<String> {
        let node = self.frontend.controller().focused()?;
        self.frontend.id_of(node).map(str::to_string)
    }

    fn set_focused_mode(&mut self, mode: ExtendedMode) -> DockResult<()> {
        if let Some(id) = self.focused_id()
            && !self.frontend.set_mode(&id, mode, None)?
        {
            info!(%id, %mode, "mode change refused");
        }
        Ok(())
    }

    fn toggle_maximized(&mut self) -> DockResult<()> {
        let Some(node) = self.frontend.controller().focused() else {
            return Ok(());
        };
        let current = self.frontend.modes().mode_of(self.frontend.controller().tree(), node);
        let target = if current == ExtendedMode::Maximized {
            ExtendedMode::Normal
        } else {
            ExtendedMode::Maximized
        };
        self.set_focused_mode(target)
    }

    fn hide_focused(&mut self) -> DockResult<()> {
        if let Some(id) = self.focused_id()
            && self.frontend.hide(&id)?
        {
            self.hidden.push(id);
        }
        Ok(())
    }

    fn unhide(&mut self) -> DockResult<()> {
        if let Some(id) = self.hidden.pop() {
            self.frontend.show(&id)?;
        }
        Ok(())
    }

    fn save(&mut self) -> DockResult<()> {
        let format = if self.args.xml {
            LayoutFormat::Xml
        } else {
            LayoutFormat::Binary
        };
        self.frontend.save_file(&self.args.layout, format)?;
        info!(path = %self.args.layout.display(), "layout saved");
        Ok(())
    }

    fn refresh_modes(&mut self) {
        let (ctrl, modes) = self.frontend.parts_mut();
        modes.refresh(ctrl);
    }
}
