//! Reasons a birb gives up and leaves.
use std::fmt;

/// Kind of entity a birb can be sent after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Player,
    Prop,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Player => "player",
            Self::Prop => "prop",
        };
        write!(f, "{}", label)
    }
}

/// Unrecoverable conditions. The display text is what the owner sees.
#[derive(Debug, Clone, PartialEq)]
pub enum BirbError {
    TooManyBirbs { max: usize },
    NoTarget { kind: TargetKind },
    NoSpawnPoint,
    WanderedOff { attempts: u32 },
    TargetLost,
}

impl fmt::Display for BirbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyBirbs { max } => write!(f, "You own too many birbs!, max {}", max),
            Self::NoTarget { kind } => write!(f, "There is no any {}!", kind),
            Self::NoSpawnPoint => {
                write!(f, "A suitable spawn point for birb is not found! Try again..")
            }
            Self::WanderedOff { attempts } => write!(
                f,
                "Birb seeked out too much and gone... (x{} times)",
                attempts
            ),
            Self::TargetLost => write!(f, "Birb lost sight of its target and flew home"),
        }
    }
}

impl std::error::Error for BirbError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        assert_eq!(
            BirbError::TooManyBirbs { max: 2 }.to_string(),
            "You own too many birbs!, max 2"
        );
        assert_eq!(
            BirbError::NoTarget {
                kind: TargetKind::Prop
            }
            .to_string(),
            "There is no any prop!"
        );
        assert!(BirbError::WanderedOff { attempts: 21 }
            .to_string()
            .contains("x21"));
    }
}
