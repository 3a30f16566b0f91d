//! Design snapshot: the full editable parameter set at one instant.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::params::Param;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuselagePreset {
    Conventional,
    Pod,
    #[serde(rename = "Blended-Wing-Body")]
    BlendedWingBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Airfoil {
    #[serde(rename = "NACA-0012")]
    Naca0012,
    #[serde(rename = "NACA-2412")]
    Naca2412,
    #[serde(rename = "NACA-4412")]
    Naca4412,
    #[serde(rename = "Clark-Y")]
    ClarkY,
    #[serde(rename = "Eppler-387")]
    Eppler387,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TailType {
    Conventional,
    #[serde(rename = "T-Tail")]
    TTail,
    #[serde(rename = "V-Tail")]
    VTail,
    Cruciform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorConfig {
    Tractor,
    Pusher,
}

/// Tracked design parameters.
///
/// Only fields that belong in undo history and on the wire live here; session
/// state such as connection status or the last mesh never does. Outbound
/// keys come from [`Param::wire`]; on input, missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Design {
    pub fuselage_preset: FuselagePreset,
    pub fuselage_length: f64,
    pub wing_span: f64,
    pub wing_chord: f64,
    pub wing_sweep: f64,
    pub wing_tip_root_ratio: f64,
    pub wing_dihedral: f64,
    pub wing_airfoil: Airfoil,
    pub tail_type: TailType,
    pub h_stab_span: f64,
    pub h_stab_chord: f64,
    pub v_stab_height: f64,
    pub motor_config: MotorConfig,
    pub wall_thickness: f64,
    pub hollow_parts: bool,
}

impl Default for Design {
    fn default() -> Self {
        Self {
            fuselage_preset: FuselagePreset::Conventional,
            fuselage_length: 300.0,
            wing_span: 1000.0,
            wing_chord: 180.0,
            wing_sweep: 0.0,
            wing_tip_root_ratio: 1.0,
            wing_dihedral: 3.0,
            wing_airfoil: Airfoil::ClarkY,
            tail_type: TailType::Conventional,
            h_stab_span: 350.0,
            h_stab_chord: 100.0,
            v_stab_height: 120.0,
            motor_config: MotorConfig::Tractor,
            wall_thickness: 1.2,
            hollow_parts: true,
        }
    }
}

/// Keys come from the parameter table, so a field without a `Param` or a
/// `Param` without a field does not compile.
impl Serialize for Design {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Self {
            fuselage_preset,
            fuselage_length,
            wing_span,
            wing_chord,
            wing_sweep,
            wing_tip_root_ratio,
            wing_dihedral,
            wing_airfoil,
            tail_type,
            h_stab_span,
            h_stab_chord,
            v_stab_height,
            motor_config,
            wall_thickness,
            hollow_parts,
        } = self;

        let mut map = serializer.serialize_map(Some(Param::ALL.len()))?;
        for param in Param::ALL {
            let key = param.wire();
            match param {
                Param::FuselagePreset => map.serialize_entry(key, fuselage_preset)?,
                Param::FuselageLength => map.serialize_entry(key, fuselage_length)?,
                Param::WingSpan => map.serialize_entry(key, wing_span)?,
                Param::WingChord => map.serialize_entry(key, wing_chord)?,
                Param::WingSweep => map.serialize_entry(key, wing_sweep)?,
                Param::WingTipRootRatio => map.serialize_entry(key, wing_tip_root_ratio)?,
                Param::WingDihedral => map.serialize_entry(key, wing_dihedral)?,
                Param::WingAirfoil => map.serialize_entry(key, wing_airfoil)?,
                Param::TailType => map.serialize_entry(key, tail_type)?,
                Param::HStabSpan => map.serialize_entry(key, h_stab_span)?,
                Param::HStabChord => map.serialize_entry(key, h_stab_chord)?,
                Param::VStabHeight => map.serialize_entry(key, v_stab_height)?,
                Param::MotorConfig => map.serialize_entry(key, motor_config)?,
                Param::WallThickness => map.serialize_entry(key, wall_thickness)?,
                Param::HollowParts => map.serialize_entry(key, hollow_parts)?,
            }
        }
        map.end()
    }
}

impl Design {
    /// Render one parameter for display, e.g. in history labels.
    pub fn value_of(&self, param: Param) -> String {
        match param {
            Param::FuselagePreset => format!("{:?}", self.fuselage_preset),
            Param::FuselageLength => self.fuselage_length.to_string(),
            Param::WingSpan => self.wing_span.to_string(),
            Param::WingChord => self.wing_chord.to_string(),
            Param::WingSweep => self.wing_sweep.to_string(),
            Param::WingTipRootRatio => self.wing_tip_root_ratio.to_string(),
            Param::WingDihedral => self.wing_dihedral.to_string(),
            Param::WingAirfoil => format!("{:?}", self.wing_airfoil),
            Param::TailType => format!("{:?}", self.tail_type),
            Param::HStabSpan => self.h_stab_span.to_string(),
            Param::HStabChord => self.h_stab_chord.to_string(),
            Param::VStabHeight => self.v_stab_height.to_string(),
            Param::MotorConfig => format!("{:?}", self.motor_config),
            Param::WallThickness => self.wall_thickness.to_string(),
            Param::HollowParts => self.hollow_parts.to_string(),
        }
    }

    /// Parameters whose values differ between `self` and `other`.
    pub fn changed_params(&self, other: &Self) -> Vec<Param> {
        Param::ALL
            .into_iter()
            .filter(|&p| self.value_of(p) != other.value_of(p))
            .collect()
    }

    /// Human-readable label for the edit that turned `previous` into `self`.
    pub fn change_label(&self, previous: &Self) -> String {
        match self.changed_params(previous).as_slice() {
            [] => "No change".to_string(),
            [param] => format!("Set {} to {}", param, self.value_of(*param)),
            params => format!("Changed {} parameters", params.len()),
        }
    }
}
