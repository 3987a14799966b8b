use crate::rig::RigStateError;

/// Fatal pipeline errors. Everything else is reported as a
/// [`Degradation`](super::Degradation).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PoseError {
    #[error(transparent)]
    RigState(#[from] RigStateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_state_message_passes_through() {
        let err = PoseError::from(RigStateError::InvalidHandle { rig: "Armature".into() });
        assert_eq!(err.to_string(), "rig `Armature` has no valid armature handle");
    }
}
