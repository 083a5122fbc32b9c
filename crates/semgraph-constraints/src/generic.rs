//! Formalism-agnostic profile: policy flags only, no label rules.

use crate::policy::ConstraintPolicy;
use crate::profile::ConstraintProfile;

/// A profile enforcing nothing beyond its [`ConstraintPolicy`].
#[derive(Debug, Clone, Default)]
pub struct GenericConstraints {
    policy: ConstraintPolicy,
}

impl GenericConstraints {
    pub fn new(policy: ConstraintPolicy) -> Self {
        GenericConstraints { policy }
    }
}

impl ConstraintProfile for GenericConstraints {
    fn name(&self) -> &str {
        "generic"
    }

    fn policy(&self) -> &ConstraintPolicy {
        &self.policy
    }
}
