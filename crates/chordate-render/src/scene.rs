//! Retained scene graph the chart components draw into.
//!
//! A [`Scene`] is a flat list of keyed groups; each group holds keyed child
//! elements. Components never touch markup directly: they bind layout items
//! to a group with [`SceneGroup::reconcile`], and the SVG serializer walks
//! the result. Re-populating a scene with fresh layout data reuses groups and
//! children by key, so callers get stable identity across renders plus
//! enter/update/exit counts for each pass.

use crate::model::{BarChartLayout, ChordDiagramLayout};
use crate::svg::{annular_arc_path, data_points_attr, fmt, node_symbol_id};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// One drawable element: an SVG tag name, its attributes, optional text
/// content and an optional `#id` reference. For `text` elements the
/// reference becomes a `textPath` wrapper, for `use` elements it becomes
/// `xlink:href`.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneElement {
    pub name: String,
    pub attrs: IndexMap<String, String>,
    pub text: Option<String>,
    pub href: Option<String>,
}

impl SceneElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: IndexMap::new(),
            text: None,
            href: None,
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// Counts for one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// A keyed container of [`SceneElement`]s sharing one CSS class and one
/// optional transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGroup {
    pub class: String,
    pub transform: Option<String>,
    children: IndexMap<String, SceneElement>,
}

impl SceneGroup {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            transform: None,
            children: IndexMap::new(),
        }
    }

    pub fn set_transform(&mut self, transform: impl Into<String>) {
        self.transform = Some(transform.into());
    }

    pub fn get(&self, key: &str) -> Option<&SceneElement> {
        self.children.get(key)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &SceneElement)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Binds `items` to this group's children by key.
    ///
    /// Children whose key is gone are removed (exit), children whose key
    /// survives are rebuilt in place and keep their position (update), and
    /// new keys are appended in item order (enter). A duplicate key in
    /// `items` overwrites the earlier binding and counts as an update.
    pub fn reconcile<T>(
        &mut self,
        items: &[T],
        key_of: impl Fn(&T) -> String,
        mut build: impl FnMut(&T) -> SceneElement,
    ) -> ReconcileStats {
        let next_keys: FxHashSet<String> = items.iter().map(&key_of).collect();
        let stale: Vec<String> = self
            .children
            .keys()
            .filter(|key| !next_keys.contains(key.as_str()))
            .cloned()
            .collect();

        let mut stats = ReconcileStats::default();
        for key in stale {
            self.children.shift_remove(&key);
            stats.exited += 1;
        }
        for item in items {
            let key = key_of(item);
            let element = build(item);
            match self.children.get_mut(&key) {
                Some(slot) => {
                    *slot = element;
                    stats.updated += 1;
                }
                None => {
                    self.children.insert(key, element);
                    stats.entered += 1;
                }
            }
        }
        stats
    }
}

/// The whole drawing: groups keyed by class name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    groups: IndexMap<String, SceneGroup>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the group with this class, appending an empty one first if it
    /// does not exist yet.
    pub fn group_mut(&mut self, class: &str) -> &mut SceneGroup {
        self.groups
            .entry(class.to_string())
            .or_insert_with(|| SceneGroup::new(class))
    }

    pub fn group(&self, class: &str) -> Option<&SceneGroup> {
        self.groups.get(class)
    }

    pub fn groups(&self) -> impl Iterator<Item = &SceneGroup> {
        self.groups.values()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Element id of an outer band arc path, referenced by its `textPath` label.
pub fn outer_band_path_id(segment_id: &str) -> String {
    format!("outer-band-{segment_id}")
}

/// Element id of an inner band arc path, referenced by its `textPath` label.
pub fn inner_band_path_id(segment_id: &str) -> String {
    format!("inner-band-{segment_id}")
}

/// CSS class names the chord component renders with.
#[derive(Debug, Clone)]
pub struct ChordDomModel {
    pub outer_band_arcs: &'static str,
    pub outer_band_arc: &'static str,
    pub outer_band_labels: &'static str,
    pub outer_band_label: &'static str,
    pub inner_band_arcs: &'static str,
    pub inner_band_arc: &'static str,
    pub inner_band_labels: &'static str,
    pub inner_band_label: &'static str,
    pub node_graphics: &'static str,
    pub node_graphic: &'static str,
    pub node_labels: &'static str,
    pub node_label: &'static str,
    pub connections: &'static str,
    pub connection: &'static str,
}

impl Default for ChordDomModel {
    fn default() -> Self {
        Self {
            outer_band_arcs: "chord-outer-band-arcs",
            outer_band_arc: "chord-outer-band-arc",
            outer_band_labels: "chord-outer-band-labels",
            outer_band_label: "chord-outer-band-label",
            inner_band_arcs: "chord-inner-band-arcs",
            inner_band_arc: "chord-inner-band-arc",
            inner_band_labels: "chord-inner-band-labels",
            inner_band_label: "chord-inner-band-label",
            node_graphics: "chord-node-graphics",
            node_graphic: "chord-node-graphic",
            node_labels: "chord-node-labels",
            node_label: "chord-node-label",
            connections: "chord-connections",
            connection: "chord-connection",
        }
    }
}

/// Binds a chord layout to a scene, one group per visual layer.
#[derive(Debug, Clone, Default)]
pub struct ChordComponent {
    pub dom: ChordDomModel,
}

impl ChordComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws every layer of the chord diagram into `scene`, returning the
    /// reconcile counts per group class.
    pub fn populate(
        &self,
        scene: &mut Scene,
        layout: &ChordDiagramLayout,
    ) -> IndexMap<String, ReconcileStats> {
        let center = format!(
            "translate({},{})",
            fmt(layout.center_x),
            fmt(layout.center_y)
        );
        let inner_segments: Vec<_> = layout
            .segments
            .iter()
            .flat_map(|segment| segment.children.iter())
            .collect();
        let mut stats = IndexMap::new();

        let group = scene.group_mut(self.dom.outer_band_arcs);
        group.set_transform(center.clone());
        let pass = group.reconcile(
            &layout.segments,
            |segment| segment.id.clone(),
            |segment| {
                SceneElement::new("path")
                    .attr("id", outer_band_path_id(&segment.id))
                    .attr("class", self.dom.outer_band_arc)
                    .attr("d", annular_arc_path(&segment.arc))
                    .attr("fill", &segment.color)
            },
        );
        stats.insert(self.dom.outer_band_arcs.to_string(), pass);

        let group = scene.group_mut(self.dom.outer_band_labels);
        group.set_transform(center.clone());
        let pass = group.reconcile(
            &layout.segments,
            |segment| segment.id.clone(),
            |segment| {
                SceneElement::new("text")
                    .attr("class", self.dom.outer_band_label)
                    .attr("dx", fmt(segment.label_dx))
                    .attr("dy", fmt(segment.label_dy))
                    .href(format!("#{}", outer_band_path_id(&segment.id)))
                    .text(&segment.display_label)
            },
        );
        stats.insert(self.dom.outer_band_labels.to_string(), pass);

        let group = scene.group_mut(self.dom.inner_band_arcs);
        group.set_transform(center.clone());
        let pass = group.reconcile(
            &inner_segments,
            |segment| segment.id.clone(),
            |segment| {
                SceneElement::new("path")
                    .attr("id", inner_band_path_id(&segment.id))
                    .attr("class", self.dom.inner_band_arc)
                    .attr("d", annular_arc_path(&segment.arc))
                    .attr("fill", &segment.color)
            },
        );
        stats.insert(self.dom.inner_band_arcs.to_string(), pass);

        let group = scene.group_mut(self.dom.inner_band_labels);
        group.set_transform(center.clone());
        let pass = group.reconcile(
            &inner_segments,
            |segment| segment.id.clone(),
            |segment| {
                SceneElement::new("text")
                    .attr("class", self.dom.inner_band_label)
                    .attr("dx", fmt(segment.label_dx))
                    .attr("dy", fmt(segment.label_dy))
                    .href(format!("#{}", inner_band_path_id(&segment.id)))
                    .text(&segment.display_label)
            },
        );
        stats.insert(self.dom.inner_band_labels.to_string(), pass);

        let group = scene.group_mut(self.dom.node_graphics);
        group.set_transform(center.clone());
        let pass = group.reconcile(
            &layout.nodes,
            |node| node.id.clone(),
            |node| {
                SceneElement::new("use")
                    .attr("class", self.dom.node_graphic)
                    .attr("width", fmt(node.size))
                    .attr("height", fmt(node.size))
                    .attr(
                        "transform",
                        format!(
                            "translate({},{})",
                            fmt(node.x - node.size / 2.0),
                            fmt(node.y - node.size / 2.0)
                        ),
                    )
                    .href(format!("#{}", node_symbol_id(&node.asset_ref)))
            },
        );
        stats.insert(self.dom.node_graphics.to_string(), pass);

        let group = scene.group_mut(self.dom.node_labels);
        group.set_transform(center.clone());
        let pass = group.reconcile(
            &layout.nodes,
            |node| node.id.clone(),
            |node| {
                SceneElement::new("text")
                    .attr("class", self.dom.node_label)
                    .attr("text-anchor", &node.text_anchor)
                    .attr(
                        "transform",
                        format!(
                            "rotate({}) translate({})",
                            fmt(node.label_rotate),
                            fmt(node.label_translate)
                        ),
                    )
                    .text(&node.display_label)
            },
        );
        stats.insert(self.dom.node_labels.to_string(), pass);

        let group = scene.group_mut(self.dom.connections);
        group.set_transform(center);
        let pass = group.reconcile(
            &layout.connections,
            |connection| connection.id.clone(),
            |connection| {
                let mut element = SceneElement::new("path")
                    .attr("class", self.dom.connection)
                    .attr("d", &connection.path_d)
                    .attr("data-points", data_points_attr(&connection.points));
                for (key, value) in &connection.attrs {
                    // Document attrs become data attributes; keys that would
                    // not form a valid attribute name are skipped.
                    if !key.is_empty()
                        && key
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                    {
                        element = element.attr(format!("data-{key}"), value);
                    }
                }
                element
            },
        );
        stats.insert(self.dom.connections.to_string(), pass);

        stats
    }
}

/// CSS class names the bar chart component renders with.
#[derive(Debug, Clone)]
pub struct BarChartDomModel {
    pub rect_graphics: &'static str,
    pub rect_graphic: &'static str,
    pub rect_labels: &'static str,
    pub rect_label: &'static str,
}

impl Default for BarChartDomModel {
    fn default() -> Self {
        Self {
            rect_graphics: "bar-chart-rect-graphics",
            rect_graphic: "bar-chart-rect-graphic",
            rect_labels: "bar-chart-rect-labels",
            rect_label: "bar-chart-rect-label",
        }
    }
}

/// Binds a bar chart layout to a scene.
#[derive(Debug, Clone, Default)]
pub struct BarChartComponent {
    pub dom: BarChartDomModel,
}

impl BarChartComponent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn populate(
        &self,
        scene: &mut Scene,
        layout: &BarChartLayout,
    ) -> IndexMap<String, ReconcileStats> {
        let mut stats = IndexMap::new();

        let group = scene.group_mut(self.dom.rect_graphics);
        let pass = group.reconcile(
            &layout.bars,
            |bar| bar.id.clone(),
            |bar| {
                SceneElement::new("rect")
                    .attr("class", self.dom.rect_graphic)
                    .attr("x", fmt(bar.x))
                    .attr("y", fmt(bar.y))
                    .attr("width", fmt(bar.width))
                    .attr("height", fmt(bar.height))
                    .attr("fill", &bar.color)
            },
        );
        stats.insert(self.dom.rect_graphics.to_string(), pass);

        let group = scene.group_mut(self.dom.rect_labels);
        let pass = group.reconcile(
            &layout.bars,
            |bar| bar.id.clone(),
            |bar| {
                SceneElement::new("text")
                    .attr("class", self.dom.rect_label)
                    .attr("x", fmt(bar.label_x))
                    .attr("y", fmt(bar.label_y))
                    .attr("text-anchor", "middle")
                    .text(&bar.display_label)
            },
        );
        stats.insert(self.dom.rect_labels.to_string(), pass);

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(key: &str) -> SceneElement {
        SceneElement::new("circle").attr("data-key", key)
    }

    #[test]
    fn first_bind_enters_everything() {
        let mut group = SceneGroup::new("dots");
        let stats = group.reconcile(&["a", "b", "c"], |k| k.to_string(), |k| circle(k));
        assert_eq!(
            stats,
            ReconcileStats {
                entered: 3,
                updated: 0,
                exited: 0
            }
        );
        let keys: Vec<&str> = group.children().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn rebind_updates_survivors_removes_stale_appends_new() {
        let mut group = SceneGroup::new("dots");
        group.reconcile(&["a", "b", "c"], |k| k.to_string(), |k| circle(k));
        let stats = group.reconcile(&["b", "c", "d"], |k| k.to_string(), |k| circle(k));
        assert_eq!(
            stats,
            ReconcileStats {
                entered: 1,
                updated: 2,
                exited: 1
            }
        );
        let keys: Vec<&str> = group.children().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "c", "d"]);
    }

    #[test]
    fn survivors_keep_their_positions() {
        let mut group = SceneGroup::new("dots");
        group.reconcile(&["a", "b", "c"], |k| k.to_string(), |k| circle(k));
        // Item order flips, but bound children stay where they were.
        group.reconcile(&["c", "b"], |k| k.to_string(), |k| circle(k));
        let keys: Vec<&str> = group.children().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "c"]);
    }

    #[test]
    fn duplicate_keys_collapse_to_one_child() {
        let mut group = SceneGroup::new("dots");
        let stats = group.reconcile(&["a", "a"], |k| k.to_string(), |k| circle(k));
        assert_eq!(stats.entered, 1);
        assert_eq!(stats.updated, 1);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn rebuilt_children_replace_old_attributes() {
        let mut group = SceneGroup::new("dots");
        group.reconcile(&[("a", "1")], |(k, _)| k.to_string(), |(k, v)| {
            circle(k).attr("r", *v)
        });
        group.reconcile(&[("a", "2")], |(k, _)| k.to_string(), |(k, v)| {
            circle(k).attr("r", *v)
        });
        let element = group.get("a").expect("child bound");
        assert_eq!(element.attrs.get("r").map(String::as_str), Some("2"));
    }

    #[test]
    fn scene_reuses_groups_by_class() {
        let mut scene = Scene::new();
        scene.group_mut("layer").set_transform("translate(1,2)");
        scene.group_mut("layer");
        assert_eq!(scene.groups().count(), 1);
        assert_eq!(
            scene.group("layer").and_then(|g| g.transform.as_deref()),
            Some("translate(1,2)")
        );
    }
}
