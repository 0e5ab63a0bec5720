use serde::{Deserialize, Serialize};

/// A discrete player request delivered to [`Engine::apply_intent`](crate::Engine::apply_intent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    RotateCw,
    SoftDrop,
    HardDrop,
    /// Start, pause or continue, depending on the phase.
    ToggleStart,
}

impl Intent {
    pub const LEN: usize = 6;

    pub const ALL: [Intent; Self::LEN] = [
        Intent::MoveLeft,
        Intent::MoveRight,
        Intent::RotateCw,
        Intent::SoftDrop,
        Intent::HardDrop,
        Intent::ToggleStart,
    ];

    /// Whether the intent only acts on a running session.
    #[must_use]
    pub const fn needs_running(self) -> bool {
        !matches!(self, Intent::ToggleStart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_toggle_works_outside_play() {
        let gated = Intent::ALL.iter().filter(|i| i.needs_running()).count();
        assert_eq!(gated, Intent::LEN - 1);
        assert!(!Intent::ToggleStart.needs_running());
    }

    #[test]
    fn test_serializes_as_variant_name() {
        let json = serde_json::to_string(&Intent::RotateCw).unwrap();
        assert_eq!(json, "\"RotateCw\"");
    }
}
