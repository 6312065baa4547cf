//! Animation clip evaluation
//!
//! Runs once at load time over every frame of an animation, producing the
//! [`AnimatedFrame`] list the renderer indexes each tick. Joint hierarchies
//! are processed in file order, which validation guarantees is parents
//! before children.

use crate::anim::{
    AnimatedFrame, AnimationDef, AnimationError, FrameComponents, Skeleton, MAX_JOINTS,
};
use crate::foundation::math::{Mat4, Quaternion, Unit};

/// A fully evaluated animation: one [`AnimatedFrame`] per source frame plus
/// the per-joint inverse bind-pose matrices it was built with
#[derive(Debug, Clone)]
pub struct AnimationClip {
    /// Evaluated frames, in source order
    pub frames: Vec<AnimatedFrame>,
    /// Inverse bind-pose matrix per joint
    pub inverse_bind: Vec<Mat4>,
}

impl AnimationClip {
    /// Number of frames in the clip
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Reconstruct a unit quaternion's fourth component from its x/y/z.
///
/// Uses the negative root: `w = -sqrt(max(0, 1 - x² - y² - z²))`. Callers
/// must not rely on the sign of `w`; both signs describe the same rotation,
/// and this convention matches the animation file format the tracks come
/// from.
pub fn reconstruct_orientation(x: f32, y: f32, z: f32) -> Quaternion<f32> {
    let t = 1.0 - x * x - y * y - z * z;
    let w = if t < 0.0 { 0.0 } else { -t.sqrt() };
    Quaternion::new(w, x, y, z)
}

/// Evaluate every frame of `anim` against `skeleton`, producing a clip.
///
/// Fails on any structural inconsistency between the two (see
/// [`AnimationError`]); a malformed animation aborts the load rather than
/// producing a partially evaluated clip.
pub fn build_clip(skeleton: &Skeleton, anim: &AnimationDef) -> Result<AnimationClip, AnimationError> {
    validate(skeleton, anim)?;
    let inverse_bind = inverse_bind_matrices(skeleton)?;

    let mut frames = Vec::with_capacity(anim.frames.len());
    for (frame_index, frame_data) in anim.frames.iter().enumerate() {
        frames.push(evaluate_frame(
            anim,
            frame_index,
            frame_data,
            &inverse_bind,
        )?);
    }

    Ok(AnimationClip {
        frames,
        inverse_bind,
    })
}

fn validate(skeleton: &Skeleton, anim: &AnimationDef) -> Result<(), AnimationError> {
    let num_joints = skeleton.joint_count();
    if num_joints != anim.joint_count() {
        return Err(AnimationError::JointCountMismatch {
            skeleton: num_joints,
            animation: anim.joint_count(),
        });
    }
    if anim.base_frame.len() != anim.joint_count() {
        return Err(AnimationError::BaseFrameMismatch {
            base_frame: anim.base_frame.len(),
            animation: anim.joint_count(),
        });
    }
    if num_joints > MAX_JOINTS {
        return Err(AnimationError::TooManyJoints(num_joints));
    }
    // Parent-before-child ordering is what lets evaluate_frame read a
    // parent's local matrix while composing its children.
    for (i, track) in anim.tracks.iter().enumerate() {
        if let Some(parent) = track.parent {
            if parent >= i {
                return Err(AnimationError::HierarchyNotSorted { joint: i, parent });
            }
        }
    }
    Ok(())
}

/// Inverse bind-pose matrix per joint: `invert(translate(pos) * rotate(orient))`
fn inverse_bind_matrices(skeleton: &Skeleton) -> Result<Vec<Mat4>, AnimationError> {
    skeleton
        .joints
        .iter()
        .enumerate()
        .map(|(joint, j)| {
            let bind = Mat4::new_translation(&j.position)
                * Unit::new_normalize(j.orientation).to_homogeneous();
            bind.try_inverse()
                .ok_or(AnimationError::NonInvertibleBindPose { joint })
        })
        .collect()
}

fn evaluate_frame(
    anim: &AnimationDef,
    frame_index: usize,
    frame_data: &[f32],
    inverse_bind: &[Mat4],
) -> Result<AnimatedFrame, AnimationError> {
    let mut result = AnimatedFrame::new();
    for (joint, track) in anim.tracks.iter().enumerate() {
        let base = &anim.base_frame[joint];
        let mut position = base.position;
        let mut orientation = base.orientation;

        // Overrides are drawn from the flat float array in bit order.
        let mut cursor = track.start_index;
        let mut next = |out: &mut f32| -> Result<(), AnimationError> {
            let value = *frame_data
                .get(cursor)
                .ok_or(AnimationError::FrameDataOutOfRange {
                    frame: frame_index,
                    joint,
                })?;
            *out = value;
            cursor += 1;
            Ok(())
        };
        if track.flags.contains(FrameComponents::POS_X) {
            next(&mut position.x)?;
        }
        if track.flags.contains(FrameComponents::POS_Y) {
            next(&mut position.y)?;
        }
        if track.flags.contains(FrameComponents::POS_Z) {
            next(&mut position.z)?;
        }
        if track.flags.contains(FrameComponents::ORIENT_X) {
            next(&mut orientation.x)?;
        }
        if track.flags.contains(FrameComponents::ORIENT_Y) {
            next(&mut orientation.y)?;
        }
        if track.flags.contains(FrameComponents::ORIENT_Z) {
            next(&mut orientation.z)?;
        }

        let rotation = reconstruct_orientation(orientation.x, orientation.y, orientation.z);
        let mut local = Mat4::new_translation(&position)
            * Unit::new_normalize(rotation).to_homogeneous();

        // Joint positions are relative to the parent; the parent's local
        // matrix for this frame is already in place.
        if let Some(parent) = track.parent {
            local = result.local_matrices[parent] * local;
        }
        result.set_matrix(joint, local, &inverse_bind[joint]);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{BaseJointPose, Joint, JointTrack};
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;

    fn identity_joint(name: &str, parent: Option<usize>) -> Joint {
        Joint {
            name: name.to_string(),
            parent,
            position: Vec3::zeros(),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    fn identity_pose() -> BaseJointPose {
        BaseJointPose {
            position: Vec3::zeros(),
            orientation: Vec3::zeros(),
        }
    }

    fn track(parent: Option<usize>, flags: FrameComponents, start_index: usize) -> JointTrack {
        JointTrack {
            parent,
            flags,
            start_index,
        }
    }

    #[test]
    fn quaternion_reconstruction_uses_negative_root() {
        let q = reconstruct_orientation(0.0, 0.0, 0.0);
        assert_relative_eq!(q.w, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn quaternion_reconstruction_clamps_negative_radicand() {
        let q = reconstruct_orientation(0.8, 0.8, 0.8);
        assert_eq!(q.w, 0.0);
    }

    #[test]
    fn identity_pose_yields_identity_skinning_matrix() {
        let skeleton = Skeleton {
            joints: vec![identity_joint("root", None)],
        };
        let anim = AnimationDef {
            tracks: vec![track(None, FrameComponents::empty(), 0)],
            base_frame: vec![identity_pose()],
            frames: vec![vec![]],
        };
        let clip = build_clip(&skeleton, &anim).unwrap();
        assert_eq!(clip.frame_count(), 1);
        assert_relative_eq!(
            clip.frames[0].joint_matrices[0],
            Mat4::identity(),
            epsilon = 1e-6
        );
        // Unused slots stay identity too.
        assert_eq!(clip.frames[0].joint_matrices[5], Mat4::identity());
    }

    #[test]
    fn child_local_matrix_composes_parent_chain() {
        let skeleton = Skeleton {
            joints: vec![
                identity_joint("root", None),
                identity_joint("child", Some(0)),
            ],
        };
        // Root overrides position.x with 2.0, child with 3.0: the child's
        // local matrix is the parent's translation composed with its own.
        let anim = AnimationDef {
            tracks: vec![
                track(None, FrameComponents::POS_X, 0),
                track(Some(0), FrameComponents::POS_X, 1),
            ],
            base_frame: vec![identity_pose(), identity_pose()],
            frames: vec![vec![2.0, 3.0]],
        };
        let clip = build_clip(&skeleton, &anim).unwrap();
        let child_local = clip.frames[0].local_matrices[1];
        let expected = Mat4::new_translation(&Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(child_local, expected, epsilon = 1e-6);
    }

    #[test]
    fn skinning_matrix_cancels_bind_pose() {
        // A joint bound at x=4 and animated to x=4 deforms vertices not at all.
        let skeleton = Skeleton {
            joints: vec![Joint {
                name: "root".to_string(),
                parent: None,
                position: Vec3::new(4.0, 0.0, 0.0),
                orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            }],
        };
        let anim = AnimationDef {
            tracks: vec![track(None, FrameComponents::POS_X, 0)],
            base_frame: vec![identity_pose()],
            frames: vec![vec![4.0]],
        };
        let clip = build_clip(&skeleton, &anim).unwrap();
        assert_relative_eq!(
            clip.frames[0].joint_matrices[0],
            Mat4::identity(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn joint_count_mismatch_is_fatal() {
        let skeleton = Skeleton {
            joints: vec![identity_joint("root", None)],
        };
        let anim = AnimationDef {
            tracks: vec![
                track(None, FrameComponents::empty(), 0),
                track(Some(0), FrameComponents::empty(), 0),
            ],
            base_frame: vec![identity_pose(), identity_pose()],
            frames: vec![vec![]],
        };
        assert_eq!(
            build_clip(&skeleton, &anim).unwrap_err(),
            AnimationError::JointCountMismatch {
                skeleton: 1,
                animation: 2
            }
        );
    }

    #[test]
    fn unsorted_hierarchy_is_rejected() {
        let skeleton = Skeleton {
            joints: vec![
                identity_joint("a", Some(1)),
                identity_joint("b", None),
            ],
        };
        let anim = AnimationDef {
            tracks: vec![
                track(Some(1), FrameComponents::empty(), 0),
                track(None, FrameComponents::empty(), 0),
            ],
            base_frame: vec![identity_pose(), identity_pose()],
            frames: vec![vec![]],
        };
        assert_eq!(
            build_clip(&skeleton, &anim).unwrap_err(),
            AnimationError::HierarchyNotSorted { joint: 0, parent: 1 }
        );
    }

    #[test]
    fn truncated_frame_data_is_fatal() {
        let skeleton = Skeleton {
            joints: vec![identity_joint("root", None)],
        };
        let anim = AnimationDef {
            tracks: vec![track(
                None,
                FrameComponents::POS_X | FrameComponents::POS_Y,
                0,
            )],
            base_frame: vec![identity_pose()],
            frames: vec![vec![1.0]],
        };
        assert_eq!(
            build_clip(&skeleton, &anim).unwrap_err(),
            AnimationError::FrameDataOutOfRange { frame: 0, joint: 0 }
        );
    }
}
