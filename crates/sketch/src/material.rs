//! Color to material mapping.
//!
//! Rules are evaluated top to bottom and the first matching predicate wins.
//! Every rule starts from the host defaults in [`MaterialParams`], so a rule
//! that does not touch a field leaves the default in place: the green band
//! never derives mass or friction, the red band never sets bounciness.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::{
    color::{Hsv, SampledColor},
    config::MaterialParams,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MotionConstraint {
    /// Free in the image plane, locked along the out-of-plane axis.
    Planar,
    /// No rigid body; the entity never moves.
    Fixed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaterialBand {
    Black,
    Green,
    Blue,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MaterialProperties {
    /// Kilograms.
    pub mass: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub bounciness: f32,
    pub motion_constraint: MotionConstraint,
    /// Native color of the sampled pixel, each channel in 0..1.
    pub display_color: [f32; 3],
    pub band: MaterialBand,
}

/// One row of the bucket table.
pub struct MaterialRule {
    pub band: MaterialBand,
    pub matches: fn(&Hsv) -> bool,
    pub apply: fn(&Hsv, &MaterialParams, &mut MaterialProperties),
}

pub const MATERIAL_RULES: [MaterialRule; 4] = [
    MaterialRule {
        band: MaterialBand::Black,
        matches: |c| c.value < 15.0,
        apply: |_, _, m| {
            m.static_friction = 0.1;
            m.dynamic_friction = 0.1;
            m.bounciness = 0.0;
            m.mass = 0.0;
            m.motion_constraint = MotionConstraint::Fixed;
        },
    },
    MaterialRule {
        band: MaterialBand::Green,
        matches: |c| (60.0..180.0).contains(&c.hue),
        apply: |_, _, m| {
            m.motion_constraint = MotionConstraint::Planar;
        },
    },
    MaterialRule {
        band: MaterialBand::Blue,
        matches: |c| (180.0..300.0).contains(&c.hue),
        apply: |c, p, m| {
            m.motion_constraint = MotionConstraint::Planar;
            m.mass = c.saturation / 100.0 * p.max_mass;
            m.bounciness = c.value / 100.0;
            m.dynamic_friction = (1.0 - c.value / 100.0) * p.max_friction;
            m.static_friction = m.dynamic_friction;
        },
    },
    MaterialRule {
        band: MaterialBand::Red,
        matches: |_| true,
        apply: |c, p, m| {
            m.motion_constraint = MotionConstraint::Planar;
            m.mass = c.saturation / 100.0 * p.max_mass;
            m.dynamic_friction = (1.0 - c.value / 100.0) * p.max_friction;
            m.static_friction = m.dynamic_friction;
        },
    },
];

#[derive(Debug, Clone, Default)]
pub struct MaterialClassifier {
    pub params: MaterialParams,
}

impl MaterialClassifier {
    pub fn new(params: MaterialParams) -> Self {
        Self { params }
    }

    pub fn classify(&self, color: &SampledColor) -> MaterialProperties {
        self.classify_hsv(&color.normalized(), color.display_color())
    }

    /// Classify an already normalized color. The last rule always matches.
    pub fn classify_hsv(&self, hsv: &Hsv, display_color: [f32; 3]) -> MaterialProperties {
        let p = &self.params;
        let mut props = MaterialProperties {
            mass: p.default_mass,
            static_friction: p.default_static_friction,
            dynamic_friction: p.default_dynamic_friction,
            bounciness: p.default_bounciness,
            motion_constraint: MotionConstraint::Planar,
            display_color,
            band: MaterialBand::Red,
        };
        if let Some(rule) = MATERIAL_RULES.iter().find(|rule| (rule.matches)(hsv)) {
            props.band = rule.band;
            (rule.apply)(hsv, p, &mut props);
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn classify(hue: f32, saturation: f32, value: f32) -> MaterialProperties {
        MaterialClassifier::default().classify_hsv(&Hsv { hue, saturation, value }, [0.0; 3])
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn red_band_derives_mass_and_friction() {
        let m = classify(0.0, 50.0, 50.0);
        assert_eq!(m.band, MaterialBand::Red);
        assert!(close(m.mass, 50.0));
        assert!(close(m.static_friction, 0.5) && close(m.dynamic_friction, 0.5));
        assert_eq!(m.bounciness, 0.0);
        assert_eq!(m.motion_constraint, MotionConstraint::Planar);
    }

    #[test]
    fn blue_band_derives_bounciness() {
        let m = classify(200.0, 80.0, 20.0);
        assert_eq!(m.band, MaterialBand::Blue);
        assert!(close(m.mass, 80.0));
        assert!(close(m.bounciness, 0.2));
        assert!(close(m.static_friction, 0.8) && close(m.dynamic_friction, 0.8));
    }

    #[test]
    fn dark_colors_are_fixed_whatever_the_hue() {
        for hue in [0.0, 90.0, 200.0, 330.0] {
            let m = classify(hue, 70.0, 10.0);
            assert_eq!(m.band, MaterialBand::Black);
            assert_eq!((m.static_friction, m.dynamic_friction), (0.1, 0.1));
            assert_eq!(m.motion_constraint, MotionConstraint::Fixed);
            assert_eq!(m.mass, 0.0);
        }
    }

    #[test]
    fn green_band_keeps_defaults() {
        let params = MaterialParams::default();
        let m = classify(120.0, 90.0, 90.0);
        assert_eq!(m.band, MaterialBand::Green);
        assert_eq!(m.mass, params.default_mass);
        assert_eq!(m.static_friction, params.default_static_friction);
        assert_eq!(m.dynamic_friction, params.default_dynamic_friction);
        assert_eq!(m.bounciness, params.default_bounciness);
        assert_eq!(m.motion_constraint, MotionConstraint::Planar);
    }

    #[test]
    fn band_edges() {
        assert_eq!(classify(59.9, 50.0, 50.0).band, MaterialBand::Red);
        assert_eq!(classify(60.0, 50.0, 50.0).band, MaterialBand::Green);
        assert_eq!(classify(180.0, 50.0, 50.0).band, MaterialBand::Blue);
        assert_eq!(classify(300.0, 50.0, 50.0).band, MaterialBand::Red);
        assert_eq!(classify(0.0, 50.0, 15.0).band, MaterialBand::Red);
    }

    #[test]
    fn every_band_has_a_rule_in_table_order() {
        let bands: Vec<_> = MATERIAL_RULES.iter().map(|r| r.band).collect();
        assert_eq!(bands, MaterialBand::iter().collect::<Vec<_>>());
    }

    #[test]
    fn display_color_comes_from_the_native_pixel() {
        let sample = SampledColor { rgb: [255, 0, 51], hsv: crate::color::rgb_to_hsv8([255, 0, 51]) };
        let m = MaterialClassifier::default().classify(&sample);
        assert_eq!(m.display_color, [1.0, 0.0, 0.2]);
        assert_eq!(m.band, MaterialBand::Red);
    }
}
