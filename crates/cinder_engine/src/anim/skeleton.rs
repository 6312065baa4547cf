//! Skeleton and animation track data
//!
//! These records are the parsed form of a skeletal-animation file; the text
//! parsers themselves live outside this crate. A skeleton gives each joint a
//! bind pose, an animation gives each joint a base pose plus a per-frame
//! component override mask drawing values from a flat float array.

use crate::foundation::math::{Quaternion, Vec3};
use bitflags::bitflags;

bitflags! {
    /// Which base-pose components a frame overrides for one joint
    ///
    /// Override values are consumed from the frame's flat float array in
    /// ascending bit order: position x, y, z, then orientation x, y, z.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FrameComponents: u32 {
        /// Position X override present
        const POS_X = 1;
        /// Position Y override present
        const POS_Y = 2;
        /// Position Z override present
        const POS_Z = 4;
        /// Orientation X override present
        const ORIENT_X = 8;
        /// Orientation Y override present
        const ORIENT_Y = 16;
        /// Orientation Z override present
        const ORIENT_Z = 32;
    }
}

/// One joint of a skeleton's bind pose
#[derive(Debug, Clone)]
pub struct Joint {
    /// Joint name (diagnostics only)
    pub name: String,
    /// Parent joint index; `None` for roots
    pub parent: Option<usize>,
    /// Bind-pose position
    pub position: Vec3,
    /// Bind-pose orientation (w already reconstructed)
    pub orientation: Quaternion<f32>,
}

/// A skeleton: joints in hierarchy order (parents before children)
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    /// Joints in file order
    pub joints: Vec<Joint>,
}

impl Skeleton {
    /// Number of joints
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

/// Per-joint animation track header
#[derive(Debug, Clone)]
pub struct JointTrack {
    /// Parent joint index; `None` for roots
    pub parent: Option<usize>,
    /// Which components each frame overrides for this joint
    pub flags: FrameComponents,
    /// Offset of this joint's first override value in each frame's float array
    pub start_index: usize,
}

/// Base pose for one joint, overridden per frame by the track flags
#[derive(Debug, Clone)]
pub struct BaseJointPose {
    /// Base position
    pub position: Vec3,
    /// Base orientation x/y/z (w is reconstructed after overrides apply)
    pub orientation: Vec3,
}

/// A parsed animation: track headers, the base frame, and the per-frame
/// flat float arrays the override masks draw from
#[derive(Debug, Clone, Default)]
pub struct AnimationDef {
    /// One track per joint, in skeleton order
    pub tracks: Vec<JointTrack>,
    /// One base pose per joint
    pub base_frame: Vec<BaseJointPose>,
    /// Raw component values per frame
    pub frames: Vec<Vec<f32>>,
}

impl AnimationDef {
    /// Number of joint tracks
    pub fn joint_count(&self) -> usize {
        self.tracks.len()
    }

    /// Number of animation frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
