//! Layout persistence: converting live trees into compositions, the binary
//! and XML codecs, and the frontend that stores named layouts.

pub mod composition;
pub mod data;
pub mod factory;
pub mod frontend;
pub mod io;
pub mod missing;
pub mod setting;
pub mod situation;
pub mod version;
pub mod xml;

pub use composition::{AdjacentLayout, DockLayoutComposition, LayoutInfo};
pub use data::LayoutData;
pub use factory::{
    AdjacentFactory, BuildContext, ConvertContext, DockFactory, MultipleDockableFactory, MultipleRegistry,
    PropertiesFactory, SingleFactory, SingleResolver, StationFactory, TextContentFactory,
};
pub use frontend::{DockFrontend, LayoutFormat, PendingSubtree};
pub use io::{DataReader, DataWriter};
pub use missing::{BackupFactory, BackupRegistry, MissingStrategy};
pub use setting::{InvisibleEntry, LayoutFile, Setting};
pub use situation::DockSituation;
pub use version::Version;
pub use xml::XmlNode;
