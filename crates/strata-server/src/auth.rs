//! Header-based tier resolution.
//!
//! The server trusts an upstream gateway to authenticate callers and
//! forward the result in request headers; no credentials are verified
//! here. Absent headers resolve to the anonymous public tier.

use axum::http::HeaderMap;
use strata_types::{AccessTier, ActorId, OrgId, RoleTier};

use crate::error::{ServerError, ServerResult};

pub const ACTOR_HEADER: &str = "x-strata-actor";
pub const ORG_HEADER: &str = "x-strata-org";
pub const ROLE_HEADER: &str = "x-strata-role";

/// The resolved caller: who they are and what tier they read at.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub actor: ActorId,
    pub tier: AccessTier,
    /// Superadmins may hard-delete and manage global entities.
    pub superadmin: bool,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self {
            actor: ActorId::new("anonymous"),
            tier: AccessTier::Public,
            superadmin: false,
        }
    }

    /// The caller's role inside `org`, or `Forbidden` if they have none.
    /// Superadmins act as admin in every org.
    pub fn require_org(&self, org: &OrgId) -> ServerResult<RoleTier> {
        if self.superadmin {
            return Ok(RoleTier::Admin);
        }
        match &self.tier {
            AccessTier::Org { org: own, role } if own == org => Ok(*role),
            _ => Err(ServerError::Forbidden(format!(
                "no membership in organization {org}"
            ))),
        }
    }

    pub fn require_superadmin(&self) -> ServerResult<()> {
        if self.superadmin {
            Ok(())
        } else {
            Err(ServerError::Forbidden("superadmin required".into()))
        }
    }
}

/// Resolve the caller's tier from the gateway headers.
pub fn resolve(headers: &HeaderMap) -> ServerResult<AuthContext> {
    let actor = match header_str(headers, ACTOR_HEADER)? {
        Some(actor) => ActorId::new(actor),
        None => return Ok(AuthContext::anonymous()),
    };

    let role = header_str(headers, ROLE_HEADER)?;
    let superadmin = role == Some("superadmin");

    let tier = match header_str(headers, ORG_HEADER)? {
        Some(raw) => {
            let org = OrgId::parse(raw)
                .map_err(|_| ServerError::BadRequest(format!("malformed {ORG_HEADER} header")))?;
            let role = match role {
                Some("admin") | Some("superadmin") => RoleTier::Admin,
                Some("member") | None => RoleTier::Member,
                Some(other) => {
                    return Err(ServerError::BadRequest(format!(
                        "unknown role \"{other}\""
                    )))
                }
            };
            AccessTier::Org { org, role }
        }
        None => AccessTier::Authenticated,
    };

    Ok(AuthContext {
        actor,
        tier,
        superadmin,
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> ServerResult<Option<&'a str>> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("malformed {name} header"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, String)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn no_headers_is_anonymous_public() {
        let ctx = resolve(&HeaderMap::new()).unwrap();
        assert_eq!(ctx.tier, AccessTier::Public);
        assert!(!ctx.superadmin);
    }

    #[test]
    fn actor_without_org_is_authenticated() {
        let ctx = resolve(&headers(&[(ACTOR_HEADER, "u1".into())])).unwrap();
        assert_eq!(ctx.tier, AccessTier::Authenticated);
        assert_eq!(ctx.actor.as_str(), "u1");
    }

    #[test]
    fn org_headers_resolve_role_tiers() {
        let org = OrgId::new();
        let ctx = resolve(&headers(&[
            (ACTOR_HEADER, "u1".into()),
            (ORG_HEADER, org.to_string()),
            (ROLE_HEADER, "admin".into()),
        ]))
        .unwrap();
        assert_eq!(ctx.tier, AccessTier::admin(org));

        let ctx = resolve(&headers(&[
            (ACTOR_HEADER, "u1".into()),
            (ORG_HEADER, org.to_string()),
        ]))
        .unwrap();
        assert_eq!(ctx.tier, AccessTier::member(org));
    }

    #[test]
    fn malformed_org_is_rejected() {
        let result = resolve(&headers(&[
            (ACTOR_HEADER, "u1".into()),
            (ORG_HEADER, "not-a-uuid".into()),
        ]));
        assert!(matches!(result, Err(ServerError::BadRequest(_))));
    }

    #[test]
    fn superadmin_acts_as_admin_everywhere() {
        let ctx = resolve(&headers(&[
            (ACTOR_HEADER, "root".into()),
            (ROLE_HEADER, "superadmin".into()),
        ]))
        .unwrap();
        assert!(ctx.superadmin);
        assert_eq!(ctx.require_org(&OrgId::new()).unwrap(), RoleTier::Admin);
    }

    #[test]
    fn membership_is_org_specific() {
        let org = OrgId::new();
        let ctx = resolve(&headers(&[
            (ACTOR_HEADER, "u1".into()),
            (ORG_HEADER, org.to_string()),
            (ROLE_HEADER, "member".into()),
        ]))
        .unwrap();
        assert_eq!(ctx.require_org(&org).unwrap(), RoleTier::Member);
        assert!(ctx.require_org(&OrgId::new()).is_err());
    }
}
