//! Scene description (`scene.xscene`) reader.
//!
//! Only the attributes the converter needs are read. Anything missing or
//! unparsable leaves the field at its default; callers decide which fields
//! are mandatory.

use std::path::Path;
use std::str::FromStr;

use roxmltree::{Document, Node};
use terrain_decode::{GridDims, HeightRange, WEIGHT_SLOTS};

use crate::error::{Error, Result};

/// Per-season layer usage masks of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeasonMasks {
    pub summer: u32,
    pub fall: u32,
    pub winter: u32,
    pub spring: u32,
}

/// One `<node>` of the terrain grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneNode {
    /// `(idx, idy)` as written in the scene.
    pub index: Option<(i32, i32)>,
    pub id: Option<u64>,
    pub masks: Option<SeasonMasks>,
    pub min_height: Option<f32>,
    pub max_height: Option<f32>,
    /// Index into [`terrain_decode::DETAIL_LEVELS`].
    pub height_level: usize,
    pub normal_level: usize,
    pub weight_levels: Option<[u32; WEIGHT_SLOTS]>,
}

/// Everything the converter reads from a scene description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneMetadata {
    pub name: Option<String>,
    /// Terrain size in nodes, `node_dimension_x` by `node_dimension_y`.
    pub dimensions: Option<(usize, usize)>,
    pub min_height: Option<f32>,
    pub max_height: Option<f32>,
    pub nodes: Vec<SceneNode>,
}

impl SceneMetadata {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let scene = Self::parse(&text)?;
        tracing::debug!(
            "Read scene {:?} from {}: {} nodes",
            scene.name,
            path.display(),
            scene.nodes.len()
        );
        Ok(scene)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let document = Document::parse(text)?;
        let mut scene = Self::default();

        let Some(root) = document.descendants().find(|n| n.has_tag_name("scene")) else {
            return Ok(scene);
        };
        scene.name = root.attribute("name").map(str::to_owned);

        let Some(terrain) = child(root, "terrain") else {
            return Ok(scene);
        };
        scene.dimensions = attr::<usize>(terrain, "node_dimension_x")
            .zip(attr::<usize>(terrain, "node_dimension_y"));
        let bounds = attr::<f32>(terrain, "min_height")
            .zip(attr::<f32>(terrain, "max_height"));
        if let Some((min, max)) = bounds {
            scene.min_height = Some(min);
            scene.max_height = Some(max);
        }

        if let Some(nodes) = child(terrain, "nodes") {
            scene.nodes = nodes
                .children()
                .filter(|n| n.has_tag_name("node"))
                .map(parse_node)
                .collect();
        }

        Ok(scene)
    }

    /// Grid dimensions, if the scene declares both.
    #[must_use]
    pub fn grid(&self) -> Option<GridDims> {
        self.dimensions.map(|(x, y)| GridDims { x, y })
    }

    /// Global height bounds, falling back to the default range.
    #[must_use]
    pub fn height_range(&self) -> HeightRange {
        match self.min_height.zip(self.max_height) {
            Some((min, max)) => HeightRange { min, max },
            None => HeightRange::default(),
        }
    }
}

fn parse_node(node: Node<'_, '_>) -> SceneNode {
    let mut parsed = SceneNode {
        index: attr(node, "idx").zip(attr(node, "idy")),
        id: attr(node, "id"),
        ..SceneNode::default()
    };

    // Masks are taken only when all four parse.
    let mask = |season: &str| attr::<i32>(node, &format!("layer_is_used_mask_{season}"));
    if let (Some(summer), Some(fall), Some(winter), Some(spring)) =
        (mask("summer"), mask("fall"), mask("winter"), mask("spring"))
    {
        parsed.masks = Some(SeasonMasks {
            summer: summer as u32,
            fall: fall as u32,
            winter: winter as u32,
            spring: spring as u32,
        });
    }

    if let Some((min, max)) = attr::<f32>(node, "min_height").zip(attr(node, "max_height")) {
        parsed.min_height = Some(min);
        parsed.max_height = Some(max);
    }

    if let Some(levels) = child(node, "texture_levels") {
        for variable in levels.children().filter(|n| n.has_tag_name("variable")) {
            match variable.attribute("name") {
                Some("heightmap_level") => {
                    parsed.height_level = attr(variable, "value").unwrap_or_default();
                }
                Some("normalmap_level") => {
                    parsed.normal_level = attr(variable, "value").unwrap_or_default();
                }
                Some("weightmap_levels") => {
                    let mut slots = [0u32; WEIGHT_SLOTS];
                    let values = variable
                        .children()
                        .filter(|n| n.has_tag_name("variable"))
                        .map(|n| attr(n, "value").unwrap_or_default());
                    for (slot, value) in slots.iter_mut().zip(values) {
                        *slot = value;
                    }
                    parsed.weight_levels = Some(slots);
                }
                _ => {}
            }
        }
    }

    parsed
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn attr<T: FromStr>(node: Node<'_, '_>, name: &str) -> Option<T> {
    node.attribute(name)?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<scene name="hills">
  <terrain node_dimension_x="2" node_dimension_y="1" min_height="-50" max_height="250.5">
    <nodes>
      <node idx="0" idy="0" id="1234" layer_is_used_mask_summer="7"
            layer_is_used_mask_winter="1" layer_is_used_mask_spring="3"
            layer_is_used_mask_fall="5" min_height="-10" max_height="40">
        <texture_levels>
          <variable name="heightmap_level" value="2"/>
          <variable name="normalmap_level" value="3"/>
          <variable name="weightmap_levels">
            <variable value="1"/><variable value="2"/><variable value="3"/>
          </variable>
        </texture_levels>
      </node>
      <node idx="1" idy="0" layer_is_used_mask_summer="1">
        <texture_levels>
          <variable name="heightmap_level" value="bogus"/>
        </texture_levels>
      </node>
    </nodes>
  </terrain>
</scene>"#;

    #[test]
    fn reads_terrain_attributes() {
        let scene = SceneMetadata::parse(SCENE).unwrap();
        assert_eq!(scene.name.as_deref(), Some("hills"));
        assert_eq!(scene.grid(), Some(GridDims { x: 2, y: 1 }));
        assert_eq!(
            scene.height_range(),
            HeightRange {
                min: -50.0,
                max: 250.5
            }
        );
        assert_eq!(scene.nodes.len(), 2);
    }

    #[test]
    fn reads_node_levels_and_masks() {
        let scene = SceneMetadata::parse(SCENE).unwrap();
        let node = &scene.nodes[0];
        assert_eq!(node.index, Some((0, 0)));
        assert_eq!(node.id, Some(1234));
        assert_eq!(
            node.masks,
            Some(SeasonMasks {
                summer: 7,
                fall: 5,
                winter: 1,
                spring: 3
            })
        );
        assert_eq!(node.min_height, Some(-10.0));
        assert_eq!(node.height_level, 2);
        assert_eq!(node.normal_level, 3);

        let levels = node.weight_levels.unwrap();
        assert_eq!(&levels[..4], &[1, 2, 3, 0]);
    }

    #[test]
    fn partial_attributes_fall_back_to_defaults() {
        let scene = SceneMetadata::parse(SCENE).unwrap();
        let node = &scene.nodes[1];
        assert_eq!(node.masks, None);
        assert_eq!(node.id, None);
        assert_eq!(node.height_level, 0);
        assert_eq!(node.weight_levels, None);
    }

    #[test]
    fn missing_terrain_keeps_defaults() {
        let scene = SceneMetadata::parse(r#"<scene name="empty"/>"#).unwrap();
        assert_eq!(scene.name.as_deref(), Some("empty"));
        assert_eq!(scene.grid(), None);
        assert_eq!(scene.height_range(), HeightRange::default());
    }

    #[test]
    fn height_bounds_need_both_attributes() {
        let scene = SceneMetadata::parse(r#"<scene><terrain min_height="5"/></scene>"#).unwrap();
        assert_eq!(scene.min_height, None);
        assert_eq!(scene.height_range(), HeightRange::default());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(
            SceneMetadata::parse("<scene><terrain></scene>"),
            Err(Error::Scene(_))
        ));
    }
}
