use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Declarative description of the landing scene.
///
/// The manifest is a small XML document with child-tag text elements,
/// whitespace-separated vectors and 0-255 color triples.  Every element is
/// optional except a link's `<url>`; missing values fall back to the
/// canonical scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneManifest {
    pub starfield: StarfieldConfig,
    pub links: Vec<LinkConfig>,
    pub decor: DecorConfig,
    pub light: LightConfig,
}

impl Default for SceneManifest {
    fn default() -> Self {
        Self {
            starfield: StarfieldConfig::default(),
            links: vec![
                LinkConfig {
                    name: "github".to_string(),
                    url: "https://github.com".to_string(),
                    position: Vec3::new(-6.0, 2.0, -12.0),
                    rotation: Vec3::ZERO,
                    scale: Vec3::splat(2.0),
                    color: Vec3::ONE,
                },
                LinkConfig {
                    name: "linkedin".to_string(),
                    url: "https://www.linkedin.com".to_string(),
                    position: Vec3::new(6.0, -2.0, -12.0),
                    rotation: Vec3::ZERO,
                    scale: Vec3::splat(2.0),
                    color: Vec3::ONE,
                },
            ],
            decor: DecorConfig::default(),
            light: LightConfig::default(),
        }
    }
}

impl SceneManifest {
    /// The compiled-in scene used when no manifest file is given.
    pub fn built_in() -> Self {
        Self::default()
    }

    /// Parses the manifest XML.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let mut manifest = Self {
            links: Vec::new(),
            ..Self::default()
        };

        for node in document.descendants() {
            if node.has_tag_name("starfield") {
                manifest.starfield = parse_starfield(&node)?;
            } else if node.has_tag_name("link") {
                manifest.links.push(parse_link(&node)?);
            } else if node.has_tag_name("mesh") {
                manifest.decor = parse_decor(&node)?;
            } else if node.has_tag_name("light") {
                manifest.light = parse_light(&node)?;
            }
        }

        if manifest.links.is_empty() {
            manifest.links = Self::default().links;
        }
        Ok(manifest)
    }
}

/// Parameters of the ambient star population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarfieldConfig {
    /// Constant number of live stars.
    pub count: usize,
    /// Fade-in/fade-out cycle length in seconds.
    pub cycle: f32,
    /// Side length of the spawn cube centered at the origin.
    pub spread: f32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 200,
            cycle: 3.0,
            spread: 100.0,
        }
    }
}

/// A clickable cube that navigates to a destination URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub name: String,
    pub url: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Vec3,
}

/// The decorative torus in the background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecorConfig {
    pub position: Vec3,
    pub color: Vec3,
}

impl Default for DecorConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -18.0),
            color: Vec3::new(135.0 / 255.0, 206.0 / 255.0, 235.0 / 255.0),
        }
    }
}

/// Point light illuminating the lit objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(3.0, 5.0, -3.0),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

fn parse_starfield(node: &Node<'_, '_>) -> Result<StarfieldConfig> {
    let defaults = StarfieldConfig::default();
    Ok(StarfieldConfig {
        count: parse_usize(optional_text(node, "count"), defaults.count)?,
        cycle: parse_f32(optional_text(node, "cycle"), defaults.cycle)?,
        spread: parse_f32(optional_text(node, "spread"), defaults.spread)?,
    })
}

fn parse_link(node: &Node<'_, '_>) -> Result<LinkConfig> {
    Ok(LinkConfig {
        name: optional_text(node, "name").unwrap_or_else(|| "link".to_string()),
        url: required_text(node, "url")?,
        position: parse_vec3(optional_text(node, "position"), Vec3::ZERO)?,
        rotation: parse_vec3(optional_text(node, "rotation"), Vec3::ZERO)?,
        scale: parse_vec3(optional_text(node, "scale"), Vec3::splat(2.0))?,
        color: parse_color(optional_text(node, "color"), Vec3::ONE)?,
    })
}

fn parse_decor(node: &Node<'_, '_>) -> Result<DecorConfig> {
    let defaults = DecorConfig::default();
    Ok(DecorConfig {
        position: parse_vec3(optional_text(node, "position"), defaults.position)?,
        color: parse_color(optional_text(node, "color"), defaults.color)?,
    })
}

fn parse_light(node: &Node<'_, '_>) -> Result<LightConfig> {
    let defaults = LightConfig::default();
    Ok(LightConfig {
        position: parse_vec3(optional_text(node, "position"), defaults.position)?,
        color: parse_color(optional_text(node, "color"), defaults.color)?,
        intensity: parse_f32(optional_text(node, "intensity"), defaults.intensity)?,
    })
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let numbers = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid vector component {component:?}: {err}"))
        })
        .collect::<Result<Vec<f32>>>()?;
    if numbers.len() < 3 {
        return Err(anyhow!("vector is missing components"));
    }
    Ok(Vec3::new(numbers[0], numbers[1], numbers[2]))
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let rgb = parse_vec3(Some(value), default * 255.0)?;
    Ok(rgb / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_usize(value: Option<String>, default: usize) -> Result<usize> {
    match value {
        Some(value) => value
            .parse::<usize>()
            .map_err(|err| anyhow!("failed to parse count: {err}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <scene>
        <starfield>
            <count>120</count>
            <cycle>2.5</cycle>
        </starfield>
        <link>
            <name>projects</name>
            <url>https://example.dev/projects</url>
            <position>-4 1 -10</position>
            <color>255 128 0</color>
        </link>
        <mesh>
            <position>0 0 -20</position>
        </mesh>
    </scene>
    "#;

    #[test]
    fn parse_manifest_overrides_defaults() {
        let manifest = SceneManifest::from_xml(SAMPLE).unwrap();
        assert_eq!(manifest.starfield.count, 120);
        assert!((manifest.starfield.cycle - 2.5).abs() < f32::EPSILON);
        assert_eq!(manifest.starfield.spread, 100.0);
        assert_eq!(manifest.links.len(), 1);
        let link = &manifest.links[0];
        assert_eq!(link.name, "projects");
        assert_eq!(link.url, "https://example.dev/projects");
        assert_eq!(link.position, Vec3::new(-4.0, 1.0, -10.0));
        assert_eq!(link.color, Vec3::new(1.0, 128.0 / 255.0, 0.0));
        assert_eq!(manifest.decor.position, Vec3::new(0.0, 0.0, -20.0));
    }

    #[test]
    fn malformed_vector_component_is_an_error() {
        let bad = r#"<scene>
            <link>
                <url>https://example.dev</url>
                <position>1 oops 2 3</position>
            </link>
        </scene>"#;
        let err = SceneManifest::from_xml(bad).unwrap_err();
        assert!(err.to_string().contains("invalid vector component"));
    }

    #[test]
    fn missing_url_is_an_error() {
        let bad = "<scene><link><name>broken</name></link></scene>";
        assert!(SceneManifest::from_xml(bad).is_err());
    }

    #[test]
    fn empty_manifest_falls_back_to_built_in_links() {
        let manifest = SceneManifest::from_xml("<scene></scene>").unwrap();
        assert_eq!(manifest, SceneManifest::built_in());
        assert_eq!(manifest.links.len(), 2);
    }
}
