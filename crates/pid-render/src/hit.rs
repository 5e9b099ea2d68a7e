//! Hit testing: point → unit lookup.
//!
//! Reverse-walks the scene (front-to-back) to find the topmost painted
//! surface under a point, then reports the interactive unit that contains
//! it. A point over a non-unit surface (legend box, label) is background,
//! as a click on it would be.
//!
//! Only filled areas catch the pointer. Plain groups are transparent and
//! hit through their children. Lines, open paths, pipes and shapes with
//! `fill="none"` (own or inherited) never cover what lies beneath them.

use pid_core::{
    ElementKind, NodeIndex, NodeRole, Point, Rect, Scene, SceneNode, UnitId, ViewTransform,
};

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Unit(UnitId),
    Background,
}

impl HitTarget {
    pub fn unit(self) -> Option<UnitId> {
        match self {
            Self::Unit(id) => Some(id),
            Self::Background => None,
        }
    }

    pub fn is_unit(self) -> bool {
        matches!(self, Self::Unit(_))
    }
}

/// Hit test a point given in viewport (root user-space) coordinates.
pub fn hit_test(scene: &Scene, transform: &ViewTransform, viewport: Point) -> HitTarget {
    hit_test_scene(scene, transform.to_scene(viewport))
}

/// Hit test a point already in scene coordinates.
pub fn hit_test_scene(scene: &Scene, point: Point) -> HitTarget {
    topmost_node(scene, point)
        .and_then(|idx| scene.unit_containing(idx))
        .map_or(HitTarget::Background, |unit| HitTarget::Unit(unit.id))
}

/// The last-painted hit surface whose bounds contain `point`.
pub fn topmost_node(scene: &Scene, point: Point) -> Option<NodeIndex> {
    hit_node(scene, scene.graph.root, point, Paint::default())
}

fn hit_node(scene: &Scene, idx: NodeIndex, point: Point, inherited: Paint) -> Option<NodeIndex> {
    let node = &scene.graph.graph[idx];
    let paint = Paint {
        unfilled: fill_is_none(node).unwrap_or(inherited.unfilled),
        pipe: inherited.pipe || node.role == NodeRole::Pipe,
    };
    // Children in reverse: last painted is on top.
    for child in scene.graph.children(idx).into_iter().rev() {
        if let Some(hit) = hit_node(scene, child, point, paint) {
            return Some(hit);
        }
    }
    if idx == scene.graph.root || !is_hit_surface(node, paint) {
        return None;
    }
    scene
        .bounds
        .get(&idx)
        .filter(|b| contains_inclusive(b, point))
        .map(|_| idx)
}

/// Paint state carried down from ancestors.
#[derive(Debug, Clone, Copy, Default)]
struct Paint {
    unfilled: bool,
    pipe: bool,
}

/// Whether a node's own box catches the pointer.
fn is_hit_surface(node: &SceneNode, paint: Paint) -> bool {
    match node.kind {
        // A unit is clickable across its whole box, gaps included.
        ElementKind::Group => node.role == NodeRole::Unit,
        ElementKind::Line | ElementKind::Polyline => false,
        ElementKind::Text | ElementKind::TextSpan => true,
        // Open paths are connectors; only closed outlines enclose an area.
        ElementKind::Path => !paint.pipe && !paint.unfilled && path_is_closed(node),
        _ => !paint.pipe && !paint.unfilled,
    }
}

fn path_is_closed(node: &SceneNode) -> bool {
    node.attr("d").is_some_and(|d| d.contains(['z', 'Z']))
}

/// `Some(true)` for `fill="none"` (attribute or inline style), `None` when
/// the node doesn't set a fill.
fn fill_is_none(node: &SceneNode) -> Option<bool> {
    let from_style = node.attr("style").and_then(|style| {
        style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .filter(|(name, _)| name.trim() == "fill")
            .last()
            .map(|(_, value)| value.trim() == "none")
    });
    from_style.or_else(|| node.attr("fill").map(|fill| fill.trim() == "none"))
}

fn contains_inclusive(r: &Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}
