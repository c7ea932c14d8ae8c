//! Built-in viewer configurations.

use shared::ParamValue;

use crate::policy::{Operation, Policy};
use crate::state::document::{Color, Layer};

/// One numeric input bound to a definition parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderSpec {
    /// Parameter name sent to the compute service
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl SliderSpec {
    /// Clamp to the range and snap to the step grid
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).min(self.max)
    }

    pub fn param(&self, value: f64) -> (String, ParamValue) {
        (self.name.to_string(), ParamValue::Number(self.snap(value)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PolicyKind {
    Plain,
    Layers,
    UserStrings,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    /// Definition file, relative to the assets URL
    pub definition: Option<&'static str>,
    /// Model loaded into the document on startup
    pub model: Option<&'static str>,
    pub sliders: &'static [SliderSpec],
    pub operation: Operation,
    pub download_name: &'static str,
    pub evaluate_on_start: bool,
    policy: PolicyKind,
}

impl Preset {
    pub fn policy(&self) -> Policy {
        match self.policy {
            PolicyKind::Plain => Policy::plain(),
            PolicyKind::Layers => Policy::plain().with_layers(vec![
                Layer::new("crvs", Color::rgb(0, 255, 0)),
                Layer::new("crvs2", Color::rgb(255, 0, 0)),
                Layer::new("crvs3", Color::rgb(0, 0, 255)),
            ]),
            PolicyKind::UserStrings => Policy::plain().with_user_strings(),
        }
    }

    /// Slider defaults as request parameters
    pub fn default_params(&self) -> Vec<(String, ParamValue)> {
        self.sliders.iter().map(|s| s.param(s.default)).collect()
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "boolean",
        definition: None,
        model: Some("meshes.json"),
        sliders: &[],
        operation: Operation::MeshBooleanUnion,
        download_name: "boolean.json",
        evaluate_on_start: false,
        policy: PolicyKind::Plain,
    },
    Preset {
        name: "weave",
        definition: Some("weav.gh"),
        model: None,
        sliders: &[SliderSpec {
            name: "subdivision",
            label: "Subdivision",
            min: 1.0,
            max: 20.0,
            step: 1.0,
            default: 5.0,
        }],
        operation: Operation::Evaluate,
        download_name: "weave.json",
        evaluate_on_start: true,
        policy: PolicyKind::Plain,
    },
    Preset {
        name: "color-test",
        definition: Some("color_test.gh"),
        model: None,
        sliders: &[],
        operation: Operation::Evaluate,
        download_name: "color_test.json",
        evaluate_on_start: true,
        policy: PolicyKind::Layers,
    },
    Preset {
        name: "hotdog",
        definition: Some("hotdogjpeg.gh"),
        model: None,
        sliders: &[
            SliderSpec {
                name: "length",
                label: "Length",
                min: 1.0,
                max: 50.0,
                step: 0.5,
                default: 20.0,
            },
            SliderSpec {
                name: "rise",
                label: "Rise",
                min: 0.0,
                max: 20.0,
                step: 0.5,
                default: 5.0,
            },
            SliderSpec {
                name: "radius",
                label: "Radius",
                min: 0.5,
                max: 10.0,
                step: 0.5,
                default: 2.0,
            },
        ],
        operation: Operation::Evaluate,
        download_name: "hotdog.json",
        evaluate_on_start: true,
        policy: PolicyKind::UserStrings,
    },
];

pub const DEFAULT_PRESET: &str = "weave";

pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn names() -> Vec<&'static str> {
    PRESETS.iter().map(|p| p.name).collect()
}
