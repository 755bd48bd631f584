//! Docking framework for terminal applications.
//!
//! Dockables live in stations (splits, tab stacks, flaps and a floating
//! screen). All structural changes go through [`DockController`], which keeps
//! the register of visible elements, removes stations that became redundant
//! and tells listeners what changed. On top of it sit the drag and drop
//! [`Relocator`], the [`ModeManager`] for minimized, maximized and
//! externalized dockables, and the [`DockFrontend`] that saves and restores
//! layouts.

pub mod accept;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod events;
pub mod focus;
pub mod geometry;
pub mod layout;
pub mod lock;
pub mod mode;
pub mod model;
pub mod register;
pub mod relocate;
pub mod remover;
pub mod render;
pub mod tracing_sub;

pub use accept::{AcceptanceChain, CapabilityAcceptance, DockAcceptance};
pub use config::{DockConfig, GroupBehaviorKind, RelocatorConfig};
pub use controller::DockController;
pub use error::{DockError, DockResult};
pub use events::{CommandQueue, DockCommand, DockEvent, DockListener, EventLog};
pub use focus::FocusRequest;
pub use geometry::FloatRect;
pub use layout::{DockFrontend, DockSituation, LayoutFormat, MissingStrategy, Setting};
pub use mode::{ModeArea, ModeManager};
pub use model::{
    Capabilities, DockContent, DockLocation, DockTree, DockablePath, Dockable, ExtendedMode, FlapSide, NodeId,
    PathProperty, Placement, Station, StationKind, TextContent,
};
pub use relocate::{RelocateOutcome, Relocator};
