//! Per-frame joint matrices

use crate::foundation::math::Mat4;

/// Fixed joint capacity of the skinning uniform array
pub const MAX_JOINTS: usize = 150;

/// One evaluated animation frame
///
/// Two parallel fixed-capacity arrays: local joint matrices (model-hierarchy
/// relative, needed while composing children) and the final skinning
/// matrices (`local * inverse_bind`) uploaded to the GPU. Slots beyond the
/// skeleton's actual joint count hold identity.
#[derive(Clone)]
pub struct AnimatedFrame {
    /// Hierarchy-composed local matrix per joint
    pub local_matrices: [Mat4; MAX_JOINTS],
    /// Final skinning matrix per joint
    pub joint_matrices: [Mat4; MAX_JOINTS],
}

impl Default for AnimatedFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimatedFrame {
    /// Create a frame with every slot set to identity
    pub fn new() -> Self {
        Self {
            local_matrices: [Mat4::identity(); MAX_JOINTS],
            joint_matrices: [Mat4::identity(); MAX_JOINTS],
        }
    }

    /// Store a joint's local matrix and derive its skinning matrix
    pub fn set_matrix(&mut self, joint: usize, local: Mat4, inverse_bind: &Mat4) {
        self.local_matrices[joint] = local;
        self.joint_matrices[joint] = local * inverse_bind;
    }
}

impl std::fmt::Debug for AnimatedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedFrame")
            .field("joints", &MAX_JOINTS)
            .finish()
    }
}
