use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::binding::Axis;

/// Number of independently configurable model and light slots.
pub const SLOT_COUNT: usize = 3;

/// Full configuration consumed by the renderer.
///
/// The serialized form mirrors the maps the render loop reads:
/// `modelsConfig.item1..item3` and `lightsConfig.light1..light3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(
        rename = "modelsConfig",
        serialize_with = "serialize_models",
        deserialize_with = "deserialize_models"
    )]
    pub models: [ModelConfig; SLOT_COUNT],
    #[serde(
        rename = "lightsConfig",
        serialize_with = "serialize_lights",
        deserialize_with = "deserialize_lights"
    )]
    pub lights: [LightConfig; SLOT_COUNT],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            models: std::array::from_fn(ModelConfig::for_slot),
            lights: std::array::from_fn(LightConfig::for_slot),
        }
    }
}

impl SceneConfig {
    /// Parses an XML scene description. Slots that are not mentioned keep
    /// their defaults.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let mut config = Self::default();

        for node in document.descendants().filter(|n| n.has_tag_name("model")) {
            let slot = slot_attribute(&node)?;
            let model = &mut config.models[slot];
            model.scale = parse_vec3(optional_text(&node, "scale"), model.scale)?;
            model.pos = parse_vec3(optional_text(&node, "position"), model.pos)?;
            model.autorotate = parse_bool(optional_text(&node, "autorotate"), model.autorotate)?;
            if let Some(axis) = optional_text(&node, "rotate-axis") {
                let axis = Axis::from_name(&axis)
                    .ok_or_else(|| anyhow!("unknown rotation axis `{axis}`"))?;
                model.select_rotate_axis(axis);
            }
            model.rotate_degree =
                parse_f32(optional_text(&node, "rotate-degree"), model.rotate_degree)?;
            model.shear_degree =
                parse_f32(optional_text(&node, "shear-degree"), model.shear_degree)?;
            model.ka = parse_f32(optional_text(&node, "ka"), model.ka)?;
            model.kd = parse_f32(optional_text(&node, "kd"), model.kd)?;
            model.ks = parse_f32(optional_text(&node, "ks"), model.ks)?;
            model.shininess = parse_f32(optional_text(&node, "shininess"), model.shininess)?;
            if model.shininess < 0.0 {
                bail!("model slot {} has negative shininess", slot + 1);
            }
            if let Some(mesh) = optional_text(&node, "mesh") {
                model.model = mesh;
            }
            if let Some(shader) = optional_text(&node, "shader") {
                model.shader = shader;
            }
        }

        for node in document.descendants().filter(|n| n.has_tag_name("light")) {
            let slot = slot_attribute(&node)?;
            let light = &mut config.lights[slot];
            light.pos = parse_vec3(optional_text(&node, "position"), light.pos)?;
            light.color = parse_color(optional_text(&node, "color"), light.color)?;
        }

        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid scene JSON")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to serialize scene configuration")
    }
}

/// Per-model transform and material settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    pub scale: Vec3,
    pub pos: Vec3,
    pub autorotate: bool,
    /// One-hot selector for the rotation axis.
    pub rotate_axis: [u8; 3],
    pub rotate_degree: f32,
    pub shear_degree: f32,
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
    pub shininess: f32,
    pub model: String,
    pub shader: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            pos: Vec3::ZERO,
            autorotate: false,
            rotate_axis: [0, 1, 0],
            rotate_degree: 0.0,
            shear_degree: 0.0,
            ka: 0.1,
            kd: 0.7,
            ks: 0.3,
            shininess: 32.0,
            model: DEFAULT_MODELS[0].to_string(),
            shader: DEFAULT_SHADER.to_string(),
        }
    }
}

const DEFAULT_MODELS: [&str; SLOT_COUNT] = ["cube", "sphere", "teapot"];
const DEFAULT_SHADER: &str = "phong";

impl ModelConfig {
    /// Default settings for the model at `index`, spread along the x axis.
    pub fn for_slot(index: usize) -> Self {
        let offset = index as f32 - 1.0;
        Self {
            pos: Vec3::new(offset * 3.0, 0.0, 0.0),
            model: DEFAULT_MODELS[index % SLOT_COUNT].to_string(),
            ..Self::default()
        }
    }

    /// Clears the axis vector and selects `axis`.
    pub fn select_rotate_axis(&mut self, axis: Axis) {
        self.rotate_axis = [0, 0, 0];
        self.rotate_axis[axis.index()] = 1;
    }

    pub fn selected_axis(&self) -> Option<Axis> {
        Axis::ALL
            .into_iter()
            .find(|axis| self.rotate_axis[axis.index()] == 1)
    }
}

/// Point light position and colour. Colour components are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub pos: Vec3,
    pub color: Vec3,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, 5.0, 5.0),
            color: Vec3::ONE,
        }
    }
}

impl LightConfig {
    pub fn for_slot(index: usize) -> Self {
        let offset = index as f32 - 1.0;
        Self {
            pos: Vec3::new(offset * 5.0, 5.0, 5.0),
            ..Self::default()
        }
    }
}

fn slot_key(prefix: &str, index: usize) -> String {
    format!("{prefix}{}", index + 1)
}

fn serialize_slots<T, S>(
    slots: &[T; SLOT_COUNT],
    prefix: &str,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    serializer.collect_map(
        slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (slot_key(prefix, index), slot)),
    )
}

/// Reads `{prefix}{n}` entries. Each entry only overrides the fields it
/// lists; everything else comes from `base(index)`, as for absent slots.
fn deserialize_slots<'de, T, D>(
    prefix: &str,
    deserializer: D,
    base: fn(usize) -> T,
) -> Result<[T; SLOT_COUNT], D::Error>
where
    T: Serialize + DeserializeOwned,
    D: Deserializer<'de>,
{
    let mut entries = BTreeMap::<String, JsonValue>::deserialize(deserializer)?;
    let mut slots = Vec::with_capacity(SLOT_COUNT);
    for index in 0..SLOT_COUNT {
        let defaults = base(index);
        let Some(overrides) = entries.remove(&slot_key(prefix, index)) else {
            slots.push(defaults);
            continue;
        };
        let mut merged = serde_json::to_value(&defaults).map_err(D::Error::custom)?;
        merge_fields(&mut merged, overrides);
        slots.push(serde_json::from_value(merged).map_err(D::Error::custom)?);
    }
    slots
        .try_into()
        .map_err(|_| D::Error::custom("unexpected number of slots"))
}

fn merge_fields(base: &mut JsonValue, overrides: JsonValue) {
    match (base, overrides) {
        (JsonValue::Object(base), JsonValue::Object(overrides)) => base.extend(overrides),
        (base, overrides) => *base = overrides,
    }
}

fn serialize_models<S: Serializer>(
    models: &[ModelConfig; SLOT_COUNT],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serialize_slots(models, "item", serializer)
}

fn deserialize_models<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<[ModelConfig; SLOT_COUNT], D::Error> {
    deserialize_slots("item", deserializer, ModelConfig::for_slot)
}

fn serialize_lights<S: Serializer>(
    lights: &[LightConfig; SLOT_COUNT],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serialize_slots(lights, "light", serializer)
}

fn deserialize_lights<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<[LightConfig; SLOT_COUNT], D::Error> {
    deserialize_slots("light", deserializer, LightConfig::for_slot)
}

/// Reads the 1-based `slot` attribute and returns the 0-based index.
fn slot_attribute(node: &Node<'_, '_>) -> Result<usize> {
    let tag = node.tag_name().name();
    let raw = node
        .attribute("slot")
        .ok_or_else(|| anyhow!("<{tag}> is missing the slot attribute"))?;
    let slot = raw
        .trim()
        .parse::<usize>()
        .with_context(|| format!("invalid slot `{raw}` on <{tag}>"))?;
    if slot == 0 || slot > SLOT_COUNT {
        bail!("<{tag}> slot {slot} is outside 1..={SLOT_COUNT}");
    }
    Ok(slot - 1)
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
                .with_context(|| format!("invalid vector component `{component}`"))
        })
        .collect::<Result<Vec<_>>>()?;
    match numbers.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!("expected 3 vector components, found {}", numbers.len())),
    }
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let rgb = parse_vec3(value, default * 255.0)?;
    Ok((rgb / 255.0).clamp(Vec3::ZERO, Vec3::ONE))
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float `{value}`: {err}")),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        Some("true" | "1" | "on") => Ok(true),
        Some("false" | "0" | "off") => Ok(false),
        Some(other) => Err(anyhow!("expected a boolean, found `{other}`")),
        None => Ok(default),
    }
}
