//! Formalism-specific validity constraints for the transition parser.
//!
//! The parser consults a [`ConstraintProfile`] for every candidate action;
//! a rejected candidate is silently dropped from the valid set. Profiles are
//! read-only after construction, so one instance can be shared by parses
//! running on different threads.

pub mod amr;
pub mod error;
pub mod generic;
pub mod policy;
pub mod profile;
pub mod resources;
pub mod verdict;

use std::sync::Arc;

pub use amr::AmrConstraints;
pub use error::ResourceError;
pub use generic::GenericConstraints;
pub use policy::{ConstraintPolicy, Formalism};
pub use profile::ConstraintProfile;
pub use resources::RoleSets;
pub use verdict::Verdict;

/// Builds the profile for `formalism`.
///
/// `policy` replaces the formalism's default policy when given. `rolesets`
/// is only consulted by formalisms with a role inventory.
pub fn build_profile(
    formalism: Formalism,
    policy: Option<ConstraintPolicy>,
    rolesets: Arc<RoleSets>,
) -> Box<dyn ConstraintProfile> {
    match (formalism, policy) {
        (Formalism::Amr, Some(policy)) => Box::new(AmrConstraints::with_policy(policy, rolesets)),
        (Formalism::Amr, None) => Box::new(AmrConstraints::new(rolesets)),
        (Formalism::Generic, policy) => {
            Box::new(GenericConstraints::new(policy.unwrap_or_default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_profile_picks_formalism_defaults() {
        let amr = build_profile(Formalism::Amr, None, Arc::default());
        assert_eq!(amr.name(), "amr");
        assert!(amr.policy().multigraph);

        let generic = build_profile(Formalism::Generic, None, Arc::default());
        assert_eq!(generic.name(), "generic");
        assert!(!generic.policy().allow_orphan_terminals);
    }

    #[test]
    fn policy_override_wins() {
        let policy = ConstraintPolicy {
            allow_orphan_terminals: true,
            ..ConstraintPolicy::default()
        };
        let generic = build_profile(Formalism::Generic, Some(policy.clone()), Arc::default());
        assert_eq!(generic.policy(), &policy);
        let amr = build_profile(Formalism::Amr, Some(policy.clone()), Arc::default());
        assert_eq!(amr.policy(), &policy);
    }
}
