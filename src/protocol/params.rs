//! Parameter name table.
//!
//! The UI addresses parameters by camelCase names (`wingSpan`), the backend by
//! snake_case wire keys (`wing_span`). Both directions go through this one
//! static table; `Design` serializes with the same wire keys and a test pins
//! the two together, so a rename on either side fails loudly.

use crate::sync::ChangeSource;

/// Every editable design parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    FuselagePreset,
    FuselageLength,
    WingSpan,
    WingChord,
    WingSweep,
    WingTipRootRatio,
    WingDihedral,
    WingAirfoil,
    TailType,
    HStabSpan,
    HStabChord,
    VStabHeight,
    MotorConfig,
    WallThickness,
    HollowParts,
}

impl Param {
    /// All parameters in wire order.
    pub const ALL: [Param; 15] = [
        Param::FuselagePreset,
        Param::FuselageLength,
        Param::WingSpan,
        Param::WingChord,
        Param::WingSweep,
        Param::WingTipRootRatio,
        Param::WingDihedral,
        Param::WingAirfoil,
        Param::TailType,
        Param::HStabSpan,
        Param::HStabChord,
        Param::VStabHeight,
        Param::MotorConfig,
        Param::WallThickness,
        Param::HollowParts,
    ];

    /// Name used by the UI layer.
    pub const fn name(self) -> &'static str {
        match self {
            Self::FuselagePreset => "fuselagePreset",
            Self::FuselageLength => "fuselageLength",
            Self::WingSpan => "wingSpan",
            Self::WingChord => "wingChord",
            Self::WingSweep => "wingSweep",
            Self::WingTipRootRatio => "wingTipRootRatio",
            Self::WingDihedral => "wingDihedral",
            Self::WingAirfoil => "wingAirfoil",
            Self::TailType => "tailType",
            Self::HStabSpan => "hStabSpan",
            Self::HStabChord => "hStabChord",
            Self::VStabHeight => "vStabHeight",
            Self::MotorConfig => "motorConfig",
            Self::WallThickness => "wallThickness",
            Self::HollowParts => "hollowParts",
        }
    }

    /// Key used in outbound JSON.
    pub const fn wire(self) -> &'static str {
        match self {
            Self::FuselagePreset => "fuselage_preset",
            Self::FuselageLength => "fuselage_length",
            Self::WingSpan => "wing_span",
            Self::WingChord => "wing_chord",
            Self::WingSweep => "wing_sweep",
            Self::WingTipRootRatio => "wing_tip_root_ratio",
            Self::WingDihedral => "wing_dihedral",
            Self::WingAirfoil => "wing_airfoil",
            Self::TailType => "tail_type",
            Self::HStabSpan => "h_stab_span",
            Self::HStabChord => "h_stab_chord",
            Self::VStabHeight => "v_stab_height",
            Self::MotorConfig => "motor_config",
            Self::WallThickness => "wall_thickness",
            Self::HollowParts => "hollow_parts",
        }
    }

    /// How edits to this parameter are usually produced.
    ///
    /// Discrete choices go out immediately; numeric fields are dragged.
    pub const fn default_source(self) -> ChangeSource {
        match self {
            Self::FuselagePreset
            | Self::WingAirfoil
            | Self::TailType
            | Self::MotorConfig
            | Self::HollowParts => ChangeSource::Immediate,
            _ => ChangeSource::Slider,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn from_wire(wire: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.wire() == wire)
    }

    /// Resolve a field reported by the backend, which may use either naming.
    pub fn resolve(field: &str) -> Option<Self> {
        Self::from_wire(field).or_else(|| Self::from_name(field))
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
