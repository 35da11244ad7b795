use serde::{Deserialize, Serialize};

// `true` while no authenticated session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthSignal(pub bool);

impl AuthSignal {
    pub const SIGNED_OUT: Self = Self(true);
    pub const ACTIVE: Self = Self(false);

    pub fn is_signed_out(self) -> bool {
        self.0
    }
}

impl std::fmt::Display for AuthSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 {
            f.write_str("signed_out")
        } else {
            f.write_str("active")
        }
    }
}
