//! Compiled-policy evaluation.
//!
//! Evaluation splits failures the usual way: unauthenticated callers get
//! `Unauthorized` (401), authenticated callers missing a claim or role get
//! `Forbidden` (403).

use crate::policy::{CompiledAuthorization, POLICY_CLAIM_KEY};
use keryx_core::{CallerIdentity, Fault, FaultResult};
use tracing::debug;

/// Evaluates a compiled authorization against the caller's identity.
///
/// Requirements are conjunctive: every requirement must pass. Within one
/// requirement the role list is any-of.
pub fn evaluate(authorization: &CompiledAuthorization, caller: &CallerIdentity) -> FaultResult<()> {
    let requirements = match authorization {
        CompiledAuthorization::Anonymous => return Ok(()),
        CompiledAuthorization::Requirements(reqs) => reqs,
    };

    if requirements.is_empty() {
        // No annotation anywhere; the host's default policy applies.
        return Ok(());
    }

    if !caller.is_authenticated() {
        debug!(caller = %caller.log_id(), "rejecting unauthenticated caller");
        return Err(Fault::unauthorized("authentication required"));
    }

    for requirement in requirements {
        if let Some(expected) = &requirement.policy_claim {
            if caller.claim(POLICY_CLAIM_KEY) != Some(expected.as_str()) {
                debug!(
                    caller = %caller.log_id(),
                    policy = %expected,
                    "caller lacks required policy claim"
                );
                return Err(Fault::forbidden(format!(
                    "caller does not satisfy policy '{expected}'"
                )));
            }
        }

        if !requirement.roles.is_empty()
            && !requirement.roles.iter().any(|role| caller.has_role(role))
        {
            debug!(caller = %caller.log_id(), "caller holds none of the required roles");
            return Err(Fault::forbidden(format!(
                "caller holds none of the required roles: {}",
                requirement.roles.join(", ")
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Requirement;
    use keryx_core::FaultKind;

    fn requirements(reqs: Vec<Requirement>) -> CompiledAuthorization {
        CompiledAuthorization::Requirements(reqs)
    }

    #[test]
    fn anonymous_compilation_passes_unauthenticated() {
        let caller = CallerIdentity::anonymous();
        assert!(evaluate(&CompiledAuthorization::Anonymous, &caller).is_ok());
    }

    #[test]
    fn empty_requirements_defer_to_default_policy() {
        let caller = CallerIdentity::anonymous();
        assert!(evaluate(&requirements(Vec::new()), &caller).is_ok());
    }

    #[test]
    fn unauthenticated_caller_is_unauthorized() {
        let auth = requirements(vec![Requirement::default()]);
        let err = evaluate(&auth, &CallerIdentity::anonymous()).expect_err("must fail");
        assert_eq!(err.kind(), FaultKind::Unauthorized);
    }

    #[test]
    fn authenticated_caller_passes_bare_requirement() {
        let auth = requirements(vec![Requirement::default()]);
        let caller = CallerIdentity::user("u1");
        assert!(evaluate(&auth, &caller).is_ok());
    }

    #[test]
    fn requirements_are_conjunctive_not_disjunctive() {
        // Contract requires policy P, operation requires role R. A caller
        // holding R but lacking P must still be rejected.
        let auth = requirements(vec![
            Requirement {
                policy_claim: Some("P".to_string()),
                roles: Vec::new(),
            },
            Requirement {
                policy_claim: None,
                roles: vec!["R".to_string()],
            },
        ]);

        let caller = CallerIdentity::user("u1").with_role("R");
        let err = evaluate(&auth, &caller).expect_err("must fail");
        assert_eq!(err.kind(), FaultKind::Forbidden);

        let caller = CallerIdentity::user("u2")
            .with_role("R")
            .with_claim(POLICY_CLAIM_KEY, "P");
        assert!(evaluate(&auth, &caller).is_ok());
    }

    #[test]
    fn roles_within_a_requirement_are_any_of() {
        let auth = requirements(vec![Requirement {
            policy_claim: None,
            roles: vec!["admin".to_string(), "auditor".to_string()],
        }]);

        let caller = CallerIdentity::user("u1").with_role("auditor");
        assert!(evaluate(&auth, &caller).is_ok());

        let caller = CallerIdentity::user("u2").with_role("viewer");
        let err = evaluate(&auth, &caller).expect_err("must fail");
        assert_eq!(err.kind(), FaultKind::Forbidden);
    }

    #[test]
    fn wrong_policy_claim_value_is_forbidden() {
        let auth = requirements(vec![Requirement {
            policy_claim: Some("P".to_string()),
            roles: Vec::new(),
        }]);
        let caller = CallerIdentity::user("u1").with_claim(POLICY_CLAIM_KEY, "Q");
        let err = evaluate(&auth, &caller).expect_err("must fail");
        assert_eq!(err.kind(), FaultKind::Forbidden);
    }
}
