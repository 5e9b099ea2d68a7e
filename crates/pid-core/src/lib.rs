pub mod design;
pub mod geometry;
pub mod id;
pub mod loader;
pub mod model;
pub mod parser;
pub mod project;
pub mod sanitize;
pub mod settings;
pub mod transform;

pub use design::{CLIENT_SCOPE, DesignResults, ParameterAnalysis};
pub use id::UnitId;
pub use loader::load_scene;
pub use model::*;
pub use project::{AttachedFile, EffluentType, ProjectData, ProjectType};
pub use sanitize::{DiagnosticSeverity, SceneDiagnostic};
pub use settings::{Settings, SettingsError, SettingsStore, Theme};
pub use transform::{ScaleLimits, ViewTransform};

// Re-export geometry types so downstream crates don't need direct dependencies
pub use kurbo::{Point, Rect, Vec2};
pub use petgraph::graph::NodeIndex;
