use serde::{Deserialize, Serialize};

use crate::error::MoonError;

/// Offense categories of the FBI summarized statistics.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum OffenseCode {
    #[default]
    ViolentCrime,
    PropertyCrime,
    Homicide,
    Rape,
    Robbery,
    AggravatedAssault,
    Burglary,
    Larceny,
    MotorVehicleTheft,
    Arson,
}

impl std::fmt::Display for OffenseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl OffenseCode {
    pub const ALL: [OffenseCode; 10] = [
        OffenseCode::ViolentCrime,
        OffenseCode::PropertyCrime,
        OffenseCode::Homicide,
        OffenseCode::Rape,
        OffenseCode::Robbery,
        OffenseCode::AggravatedAssault,
        OffenseCode::Burglary,
        OffenseCode::Larceny,
        OffenseCode::MotorVehicleTheft,
        OffenseCode::Arson,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OffenseCode::ViolentCrime => "violent crime",
            OffenseCode::PropertyCrime => "property crime",
            OffenseCode::Homicide => "homicide",
            OffenseCode::Rape => "rape",
            OffenseCode::Robbery => "robbery",
            OffenseCode::AggravatedAssault => "aggravated assault",
            OffenseCode::Burglary => "burglary",
            OffenseCode::Larceny => "larceny",
            OffenseCode::MotorVehicleTheft => "motor vehicle theft",
            OffenseCode::Arson => "arson",
        }
    }

    /// Code used in the api path.
    pub fn code(&self) -> &'static str {
        match self {
            OffenseCode::ViolentCrime => "V",
            OffenseCode::PropertyCrime => "P",
            OffenseCode::Homicide => "HOM",
            OffenseCode::Rape => "RPE",
            OffenseCode::Robbery => "ROB",
            OffenseCode::AggravatedAssault => "ASS",
            OffenseCode::Burglary => "BUR",
            OffenseCode::Larceny => "LAR",
            OffenseCode::MotorVehicleTheft => "MVT",
            OffenseCode::Arson => "ARS",
        }
    }
}

impl std::str::FromStr for OffenseCode {
    type Err = MoonError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "v" | "violent" | "violent crime" => Ok(OffenseCode::ViolentCrime),
            "p" | "property" | "property crime" => Ok(OffenseCode::PropertyCrime),
            "hom" | "homicide" | "murder" => Ok(OffenseCode::Homicide),
            "rpe" | "rape" => Ok(OffenseCode::Rape),
            "rob" | "robbery" => Ok(OffenseCode::Robbery),
            "ass" | "assault" | "aggravated assault" => Ok(OffenseCode::AggravatedAssault),
            "bur" | "burglary" => Ok(OffenseCode::Burglary),
            "lar" | "larceny" | "theft" => Ok(OffenseCode::Larceny),
            "mvt" | "motor vehicle theft" | "vehicle theft" => Ok(OffenseCode::MotorVehicleTheft),
            "ars" | "arson" => Ok(OffenseCode::Arson),
            _ => Err(MoonError::UnknownOffense(input.to_string())),
        }
    }
}
