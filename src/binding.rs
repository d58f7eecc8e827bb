//! Declarative description of every control the scene panel exposes.
//!
//! Control ids follow the `c{slot}-{field}[-{axis|component}]` convention of
//! the host page. [`BindingTable::standard`] enumerates the full panel; the
//! binder interprets the table and never generates ids on its own.

use crate::config::SLOT_COUNT;

/// DOM event that triggers a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Fired continuously while a slider moves.
    Input,
    /// Fired once an edit is committed or a checkbox toggles.
    Change,
}

impl Trigger {
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Change => "change",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.event_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|axis| axis.name().eq_ignore_ascii_case(name))
    }
}

/// Colour component of a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    R,
    G,
    B,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::R, Channel::G, Channel::B];

    pub fn index(self) -> usize {
        match self {
            Self::R => 0,
            Self::G => 1,
            Self::B => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::R => "r",
            Self::G => "g",
            Self::B => "b",
        }
    }
}

/// Phong lighting coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coefficient {
    Ambient,
    Diffuse,
    Specular,
}

impl Coefficient {
    pub const ALL: [Coefficient; 3] = [
        Coefficient::Ambient,
        Coefficient::Diffuse,
        Coefficient::Specular,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ambient => "ka",
            Self::Diffuse => "kd",
            Self::Specular => "ks",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelField {
    Scale(Axis),
    Position(Axis),
    AutoRotate,
    RotateAxis(Axis),
    RotateDegree,
    ShearDegree,
    Coefficient(Coefficient),
    Shininess,
    Model,
    Shader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightField {
    Position(Axis),
    Color(Channel),
}

/// Location of the written value: which map, and which field inside a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Model(ModelField),
    Light(LightField),
}

/// How the raw control state becomes a config value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Parse the control's value as a number.
    Number,
    /// Parse as a number and divide by the given range (e.g. 255 for colours).
    Normalized(f32),
    /// Use the checkbox state.
    Checked,
    /// Keep the raw string.
    Text,
}

/// Extra condition a value must meet before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    NonNegative,
    /// Only act when the checkbox that fired is checked.
    WhenChecked,
    /// Only act while the slot is not auto-rotating.
    WhenNotAutoRotating,
}

/// One row of the binding table.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingSpec {
    pub control: String,
    pub trigger: Trigger,
    /// Zero-based slot index.
    pub slot: usize,
    pub path: FieldPath,
    pub transform: Transform,
    pub guard: Option<Guard>,
    /// Label element that mirrors the raw value.
    pub readout: Option<String>,
}

impl BindingSpec {
    pub fn new(
        control: impl Into<String>,
        trigger: Trigger,
        slot: usize,
        path: FieldPath,
        transform: Transform,
    ) -> Self {
        Self {
            control: control.into(),
            trigger,
            slot,
            path,
            transform,
            guard: None,
            readout: None,
        }
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_readout(mut self, readout: impl Into<String>) -> Self {
        self.readout = Some(readout.into());
        self
    }

    /// Whether `transform` produces the kind of value `path` stores.
    pub fn is_consistent(&self) -> bool {
        use FieldPath::{Light, Model};
        match self.path {
            Model(ModelField::AutoRotate) | Model(ModelField::RotateAxis(_)) => {
                self.transform == Transform::Checked
            }
            Model(ModelField::Model) | Model(ModelField::Shader) => {
                self.transform == Transform::Text
            }
            Model(_) | Light(_) => {
                matches!(self.transform, Transform::Number | Transform::Normalized(_))
            }
        }
    }
}

/// Ordered collection of bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingTable {
    specs: Vec<BindingSpec>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, spec: BindingSpec) {
        self.specs.push(spec);
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingSpec> {
        self.specs.iter()
    }

    pub fn get(&self, index: usize) -> Option<&BindingSpec> {
        self.specs.get(index)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Every control of the three-model, three-light scene panel.
    pub fn standard() -> Self {
        let mut table = Self::new();
        for slot in 0..SLOT_COUNT {
            table.extend_model_slot(slot);
        }
        for slot in 0..SLOT_COUNT {
            table.extend_light_slot(slot);
        }
        table
    }

    fn extend_model_slot(&mut self, slot: usize) {
        use Transform::{Checked, Number, Text};
        use Trigger::{Change, Input};
        let c = format!("c{}", slot + 1);
        let model = FieldPath::Model;

        for axis in Axis::ALL {
            let id = format!("{c}-{}-scale", axis.name());
            self.push(
                BindingSpec::new(&id, Input, slot, model(ModelField::Scale(axis)), Number)
                    .with_readout(format!("{id}-value")),
            );
        }
        for axis in Axis::ALL {
            self.push(BindingSpec::new(
                format!("{c}-{}-pos", axis.name()),
                Change,
                slot,
                model(ModelField::Position(axis)),
                Number,
            ));
        }

        self.push(BindingSpec::new(
            format!("{c}-autorotate"),
            Change,
            slot,
            model(ModelField::AutoRotate),
            Checked,
        ));
        for axis in Axis::ALL {
            self.push(
                BindingSpec::new(
                    format!("{c}-rotate-axis-{}", axis.name()),
                    Change,
                    slot,
                    model(ModelField::RotateAxis(axis)),
                    Checked,
                )
                .guarded(Guard::WhenChecked),
            );
        }
        self.push(
            BindingSpec::new(
                format!("{c}-rotate-degree"),
                Change,
                slot,
                model(ModelField::RotateDegree),
                Number,
            )
            .guarded(Guard::WhenNotAutoRotating),
        );
        self.push(BindingSpec::new(
            format!("{c}-shear-degree"),
            Change,
            slot,
            model(ModelField::ShearDegree),
            Number,
        ));

        for coefficient in Coefficient::ALL {
            let id = format!("{c}-{}", coefficient.name());
            self.push(
                BindingSpec::new(
                    &id,
                    Input,
                    slot,
                    model(ModelField::Coefficient(coefficient)),
                    Number,
                )
                .with_readout(format!("{id}-value")),
            );
        }
        self.push(
            BindingSpec::new(
                format!("{c}-shininess"),
                Change,
                slot,
                model(ModelField::Shininess),
                Number,
            )
            .guarded(Guard::NonNegative),
        );

        self.push(BindingSpec::new(
            format!("{c}-model-value"),
            Change,
            slot,
            model(ModelField::Model),
            Text,
        ));
        self.push(BindingSpec::new(
            format!("{c}-shader-value"),
            Change,
            slot,
            model(ModelField::Shader),
            Text,
        ));
    }

    fn extend_light_slot(&mut self, slot: usize) {
        let c = format!("c{}", slot + 1);
        for axis in Axis::ALL {
            self.push(BindingSpec::new(
                format!("{c}-light-{}-pos", axis.name()),
                Trigger::Change,
                slot,
                FieldPath::Light(LightField::Position(axis)),
                Transform::Number,
            ));
        }
        for channel in Channel::ALL {
            self.push(BindingSpec::new(
                format!("{c}-light-color-{}", channel.name()),
                Trigger::Change,
                slot,
                FieldPath::Light(LightField::Color(channel)),
                Transform::Normalized(255.0),
            ));
        }
    }
}

impl<'a> IntoIterator for &'a BindingTable {
    type Item = &'a BindingSpec;
    type IntoIter = std::slice::Iter<'a, BindingSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

impl FromIterator<BindingSpec> for BindingTable {
    fn from_iter<I: IntoIterator<Item = BindingSpec>>(iter: I) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}
