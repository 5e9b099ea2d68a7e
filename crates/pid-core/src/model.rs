//! Core scene model for process diagrams.
//!
//! A diagram arrives as an untrusted SVG string. The loader turns it into
//! a tree of allow-listed elements (`SceneGraph`); edges go parent → child
//! in document order. Nothing downstream ever sees the raw string again:
//! renderers emit markup from this model only.

use crate::id::UnitId;
use crate::sanitize::SceneDiagnostic;
use kurbo::Rect;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// Class marking a `<g>` as a clickable piece of equipment.
pub const UNIT_CLASS: &str = "equipment-unit";
/// Class marking a connecting pipe.
pub const PIPE_CLASS: &str = "pipe-flow";
/// Transient class applied to the selected unit by the renderer.
pub const SELECTED_CLASS: &str = "selected-unit";
/// Id of the legend group.
pub const LEGEND_ID: &str = "pid-legend";

// ─── View box ────────────────────────────────────────────────────────────

/// The declared coordinate system of a diagram (`viewBox`), in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// Fallback used whenever a document has no usable `viewBox`.
    pub const DEFAULT: ViewBox = ViewBox {
        min_x: 0.0,
        min_y: 0.0,
        width: 1000.0,
        height: 750.0,
    };

    pub const fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    /// All components finite, extent strictly positive.
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.min_x,
            self.min_y,
            self.min_x + self.width,
            self.min_y + self.height,
        )
    }
}

impl Default for ViewBox {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.min_x, self.min_y, self.width, self.height
        )
    }
}

// ─── Elements ────────────────────────────────────────────────────────────

/// The SVG elements a scene may contain. Anything else is dropped on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// The document's `<svg>` element.
    Root,
    Group,
    Rect,
    Circle,
    Ellipse,
    Line,
    Polyline,
    Polygon,
    Path,
    Text,
    TextSpan,
    Title,
    Desc,
    Defs,
    Marker,
    LinearGradient,
    RadialGradient,
    Stop,
    Style,
    Use,
}

impl ElementKind {
    /// Map a (namespace-stripped) tag name onto an allowed element.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "svg" => Self::Root,
            "g" => Self::Group,
            "rect" => Self::Rect,
            "circle" => Self::Circle,
            "ellipse" => Self::Ellipse,
            "line" => Self::Line,
            "polyline" => Self::Polyline,
            "polygon" => Self::Polygon,
            "path" => Self::Path,
            "text" => Self::Text,
            "tspan" => Self::TextSpan,
            "title" => Self::Title,
            "desc" => Self::Desc,
            "defs" => Self::Defs,
            "marker" => Self::Marker,
            "linearGradient" => Self::LinearGradient,
            "radialGradient" => Self::RadialGradient,
            "stop" => Self::Stop,
            "style" => Self::Style,
            "use" => Self::Use,
            _ => return None,
        };
        Some(kind)
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Root => "svg",
            Self::Group => "g",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Line => "line",
            Self::Polyline => "polyline",
            Self::Polygon => "polygon",
            Self::Path => "path",
            Self::Text => "text",
            Self::TextSpan => "tspan",
            Self::Title => "title",
            Self::Desc => "desc",
            Self::Defs => "defs",
            Self::Marker => "marker",
            Self::LinearGradient => "linearGradient",
            Self::RadialGradient => "radialGradient",
            Self::Stop => "stop",
            Self::Style => "style",
            Self::Use => "use",
        }
    }

    /// Elements whose character data is meaningful and kept.
    pub fn keeps_text(self) -> bool {
        matches!(
            self,
            Self::Text | Self::TextSpan | Self::Title | Self::Desc | Self::Style
        )
    }

    /// Elements that occupy space on the canvas (and can be hit).
    pub fn is_visual(self) -> bool {
        matches!(
            self,
            Self::Group
                | Self::Rect
                | Self::Circle
                | Self::Ellipse
                | Self::Line
                | Self::Polyline
                | Self::Polygon
                | Self::Path
                | Self::Text
                | Self::TextSpan
                | Self::Use
        )
    }
}

/// What a node means to the viewer, beyond its SVG kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeRole {
    #[default]
    Plain,
    /// A `g.equipment-unit` with an id. Clickable.
    Unit,
    /// A connecting line (`.pipe-flow`).
    Pipe,
    /// The legend group.
    Legend,
}

/// A single validated element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub kind: ElementKind,

    /// The element's `id`, if any.
    pub id: Option<UnitId>,

    /// Class list, in document order.
    pub classes: SmallVec<[String; 2]>,

    /// Allow-listed attributes other than `id` and `class`, in document order.
    pub attributes: Vec<(String, String)>,

    /// Character data for text-bearing elements.
    pub text: Option<String>,

    pub role: NodeRole,
}

impl SceneNode {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            id: None,
            classes: SmallVec::new(),
            attributes: Vec::new(),
            text: None,
            role: NodeRole::Plain,
        }
    }

    /// Value of an attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

// ─── Scene graph ─────────────────────────────────────────────────────────

/// The element tree of one diagram.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub graph: StableDiGraph<SceneNode, ()>,

    /// The `<svg>` element.
    pub root: NodeIndex,

    /// Index from element id → NodeIndex. First occurrence wins.
    pub id_index: HashMap<UnitId, NodeIndex>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only an empty root.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(SceneNode::new(ElementKind::Root));
        Self {
            graph,
            root,
            id_index: HashMap::new(),
        }
    }

    /// Add a node as the last child of `parent`. Returns the new node's index.
    pub fn add_node(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        if let Some(id) = id {
            self.id_index.entry(id).or_insert(idx);
        }
        idx
    }

    /// Look up a node by its id.
    pub fn get_by_id(&self, id: UnitId) -> Option<&SceneNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn index_of(&self, id: UnitId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children of a node in document order.
    ///
    /// Nodes are only ever appended, so `NodeIndex` order is insertion order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// True when `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor_of(&self, ancestor: NodeIndex, node: NodeIndex) -> bool {
        let mut cursor = Some(node);
        while let Some(idx) = cursor {
            if idx == ancestor {
                return true;
            }
            cursor = self.parent(idx);
        }
        false
    }

    /// Number of elements, root included.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() <= 1
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// One clickable piece of equipment.
#[derive(Debug, Clone)]
pub struct InteractiveUnit {
    pub id: UnitId,
    /// Text of the unit's `<title>`, trimmed. `None` when absent or blank.
    pub description: Option<String>,
    /// The unit's `<g>` in the scene graph.
    pub node: NodeIndex,
    /// Scene-space bounds; `None` when the group draws nothing measurable.
    pub bounds: Option<Rect>,
}

/// A loaded diagram: validated element tree plus derived indexes.
#[derive(Debug, Clone)]
pub struct Scene {
    pub view_box: ViewBox,
    /// False when `view_box` is the fallback rather than the document's own.
    pub view_box_declared: bool,
    pub graph: SceneGraph,
    /// Interactive units in document order.
    pub units: Vec<InteractiveUnit>,
    /// Scene-space bounds of every measurable visual node.
    pub bounds: HashMap<NodeIndex, Rect>,
    /// Everything the loader dropped or fell back on.
    pub diagnostics: Vec<SceneDiagnostic>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::empty()
    }
}

impl Scene {
    /// The scene used for missing or unusable documents.
    pub fn empty() -> Self {
        Self {
            view_box: ViewBox::DEFAULT,
            view_box_declared: false,
            graph: SceneGraph::new(),
            units: Vec::new(),
            bounds: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn unit(&self, id: UnitId) -> Option<&InteractiveUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Top-level drawable nodes, in document order, ready for re-embedding.
    pub fn top_level(&self) -> Vec<NodeIndex> {
        self.graph.children(self.graph.root)
    }

    /// The unit that contains `idx` (the node itself or an ancestor), if any.
    pub fn unit_containing(&self, idx: NodeIndex) -> Option<&InteractiveUnit> {
        self.units
            .iter()
            .find(|u| self.graph.is_ancestor_of(u.node, idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_box_display_matches_attribute_form() {
        assert_eq!(ViewBox::DEFAULT.to_string(), "0 0 1000 750");
        assert_eq!(ViewBox::new(-10.0, 5.5, 20.0, 30.0).to_string(), "-10 5.5 20 30");
    }

    #[test]
    fn view_box_validity() {
        assert!(ViewBox::DEFAULT.is_valid());
        assert!(!ViewBox::new(0.0, 0.0, 0.0, 10.0).is_valid());
        assert!(!ViewBox::new(0.0, 0.0, f64::NAN, 10.0).is_valid());
        assert!(!ViewBox::new(0.0, 0.0, 10.0, -1.0).is_valid());
    }

    #[test]
    fn element_tags_roundtrip() {
        for tag in ["g", "rect", "path", "linearGradient", "tspan", "use"] {
            let kind = ElementKind::from_tag(tag).unwrap();
            assert_eq!(kind.tag(), tag);
        }
        assert_eq!(ElementKind::from_tag("script"), None);
        assert_eq!(ElementKind::from_tag("foreignObject"), None);
    }

    #[test]
    fn children_follow_insertion_order() {
        let mut graph = SceneGraph::new();
        let root = graph.root;
        let a = graph.add_node(root, SceneNode::new(ElementKind::Rect));
        let b = graph.add_node(root, SceneNode::new(ElementKind::Circle));
        let c = graph.add_node(a, SceneNode::new(ElementKind::Title));
        assert_eq!(graph.children(root), vec![a, b]);
        assert!(graph.is_ancestor_of(root, c));
        assert!(graph.is_ancestor_of(a, c));
        assert!(!graph.is_ancestor_of(b, c));
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mut graph = SceneGraph::new();
        let root = graph.root;
        let mut first = SceneNode::new(ElementKind::Group);
        first.id = Some(UnitId::intern("dup"));
        let mut second = SceneNode::new(ElementKind::Group);
        second.id = Some(UnitId::intern("dup"));
        let a = graph.add_node(root, first);
        graph.add_node(root, second);
        assert_eq!(graph.index_of(UnitId::intern("dup")), Some(a));
    }

    #[test]
    fn empty_scene_uses_default_box() {
        let scene = Scene::empty();
        assert!(scene.is_empty());
        assert!(scene.units.is_empty());
        assert_eq!(scene.view_box, ViewBox::DEFAULT);
        assert!(!scene.view_box_declared);
    }
}
