use serde::{Deserialize, Serialize};
use std::fmt;

/// The six canonical attack-lifecycle phases used to classify a
/// vulnerability's exploitation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KillChainStage {
    Recon,
    Weaponize,
    Delivery,
    Exploit,
    C2,
    Actions,
}

impl KillChainStage {
    pub const ALL: [KillChainStage; 6] = [
        Self::Recon,
        Self::Weaponize,
        Self::Delivery,
        Self::Exploit,
        Self::C2,
        Self::Actions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Recon => "Recon",
            Self::Weaponize => "Weaponize",
            Self::Delivery => "Delivery",
            Self::Exploit => "Exploit",
            Self::C2 => "C2",
            Self::Actions => "Actions",
        }
    }

    /// Case-insensitive equality against a gateway-supplied stage label.
    /// An absent or unrecognized label matches none of the six stages.
    pub fn matches(&self, label: Option<&str>) -> bool {
        match label {
            Some(label) => label.trim().eq_ignore_ascii_case(self.name()),
            None => false,
        }
    }
}

impl fmt::Display for KillChainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
