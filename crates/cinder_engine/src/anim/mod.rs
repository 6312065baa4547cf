//! Skeletal animation
//!
//! Converts per-joint animation track data into per-frame skinning matrices
//! ready for GPU upload. This is a pure load-time batch transform over all
//! frames of an animation; selecting which precomputed frame to display each
//! tick is the scene's business (see `scene::SkinningState`).
//!
//! Nothing in this module depends on rendering.

mod evaluator;
mod frame;
mod skeleton;

pub use evaluator::{build_clip, reconstruct_orientation, AnimationClip};
pub use frame::{AnimatedFrame, MAX_JOINTS};
pub use skeleton::{AnimationDef, BaseJointPose, FrameComponents, Joint, JointTrack, Skeleton};

use thiserror::Error;

/// Fatal animation data validation errors
///
/// All of these abort the load; there is no partial recovery from a
/// malformed skeleton or animation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnimationError {
    /// Skeleton and animation disagree on the number of joints
    #[error("Joint count mismatch: skeleton has {skeleton} joints, animation has {animation}")]
    JointCountMismatch {
        /// Joints in the skeleton
        skeleton: usize,
        /// Joint tracks in the animation
        animation: usize,
    },

    /// The base frame does not cover every joint
    #[error("Base frame covers {base_frame} joints but the animation has {animation}")]
    BaseFrameMismatch {
        /// Poses in the base frame
        base_frame: usize,
        /// Joint tracks in the animation
        animation: usize,
    },

    /// More joints than the fixed GPU uniform array can hold
    #[error("Skeleton has {0} joints, maximum is {MAX_JOINTS}")]
    TooManyJoints(usize),

    /// A joint's parent does not precede it; the evaluator requires the
    /// hierarchy to be topologically sorted by parent index
    #[error("Joint {joint} references parent {parent} which does not precede it")]
    HierarchyNotSorted {
        /// Offending joint index
        joint: usize,
        /// Parent index it references
        parent: usize,
    },

    /// A frame's flat float array is too short for a joint's components
    #[error("Frame {frame} data too short for joint {joint}")]
    FrameDataOutOfRange {
        /// Frame index
        frame: usize,
        /// Joint index whose components ran past the end
        joint: usize,
    },

    /// A joint's bind-pose transform could not be inverted
    #[error("Joint {joint} has a non-invertible bind pose")]
    NonInvertibleBindPose {
        /// Offending joint index
        joint: usize,
    },
}
