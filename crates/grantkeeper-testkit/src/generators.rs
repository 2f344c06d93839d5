//! Proptest generators for property-based testing.

use proptest::prelude::*;

use grantkeeper_core::{Grant, GrantInfo, Timestamp};

/// Generate a grant issuance ID.
pub fn grant_id() -> impl Strategy<Value = String> {
    "[a-f0-9]{24}".prop_map(String::from)
}

/// Generate a grant.
pub fn grant() -> impl Strategy<Value = Grant> {
    (
        prop_oneof![Just("rank"), Just("perm"), Just("tag")],
        "[a-z][a-z0-9.]{0,15}",
    )
        .prop_map(|(key, value)| Grant::new(key, value))
}

/// Generate a reasonable timestamp, zero included.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    prop_oneof![
        1 => Just(Timestamp::ZERO),
        4 => (1i64..=4_000_000_000i64).prop_map(Timestamp::from_secs),
    ]
}

/// Parameters for generating a grant issuance.
#[derive(Debug, Clone)]
pub struct GrantInfoParams {
    pub id: String,
    pub grant: Grant,
    pub added_by: String,
    pub added_at: Timestamp,
    pub expires_at: Timestamp,
    pub scopes: Vec<String>,
    pub revocation: Option<(String, Timestamp)>,
}

impl Arbitrary for GrantInfoParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            grant_id(),
            grant(),
            "[a-z]{1,12}",
            timestamp(),
            timestamp(),
            prop::collection::vec("[a-z]{1,8}", 0..4),
            prop::option::of(("[a-z]{1,12}", timestamp())),
        )
            .prop_map(
                |(id, grant, added_by, added_at, expires_at, scopes, revocation)| {
                    GrantInfoParams {
                        id,
                        grant,
                        added_by,
                        added_at,
                        expires_at,
                        scopes,
                        revocation,
                    }
                },
            )
            .boxed()
    }
}

/// Build a grant issuance from parameters.
pub fn grant_info_from_params(params: &GrantInfoParams) -> GrantInfo {
    let mut gi = GrantInfo::new(
        params.id.clone(),
        params.grant.clone(),
        params.added_by.clone(),
        params.added_at,
        params.expires_at,
    )
    .with_scopes(params.scopes.clone());

    if let Some((by, at)) = &params.revocation {
        gi.revoke(by.clone(), *at);
    }
    gi
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantkeeper_core::Tracker;
    use std::collections::BTreeSet;

    proptest! {
        #[test]
        fn test_expiry_rule(params: GrantInfoParams, now in timestamp()) {
            let gi = grant_info_from_params(&params);

            let revoked = gi.revoked_at().is_some_and(|at| !at.is_zero());
            let lapsed = gi.expires_at().as_secs() > 0 && now > gi.expires_at();
            prop_assert_eq!(gi.is_expired_at(now), revoked || lapsed);
        }

        #[test]
        fn test_serialization_round_trip(params: GrantInfoParams) {
            let gi = grant_info_from_params(&params);

            let json = serde_json::to_value(&gi).unwrap();
            let decoded: GrantInfo = serde_json::from_value(json.clone()).unwrap();
            prop_assert_eq!(decoded.id(), gi.id());
            prop_assert_eq!(decoded.grant(), gi.grant());
            prop_assert_eq!(decoded.added_by(), gi.added_by());
            prop_assert_eq!(decoded.added_at(), gi.added_at());
            prop_assert_eq!(decoded.expires_at(), gi.expires_at());
            prop_assert_eq!(decoded.scopes(), gi.scopes());

            // Revocation fields travel only as a complete pair.
            let has_pair = json.get("revoked_by").is_some() && json.get("revoked_at").is_some();
            prop_assert_eq!(json.get("revoked_by").is_some(), has_pair);
            prop_assert_eq!(json.get("revoked_at").is_some(), has_pair);
            if has_pair {
                prop_assert_eq!(&decoded, &gi);
            } else {
                prop_assert!(decoded.revoked_by().is_none());
                prop_assert!(decoded.revoked_at().is_none());
            }
        }

        #[test]
        fn test_tracker_partition(
            params in prop::collection::vec(any::<GrantInfoParams>(), 0..16),
            now in timestamp(),
        ) {
            let infos: Vec<GrantInfo> = params
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let mut p = p.clone();
                    p.id = format!("{}-{i}", p.id);
                    grant_info_from_params(&p)
                })
                .collect();
            let tracker = Tracker::from_grants("p1", infos.clone(), now);

            let actives: BTreeSet<String> =
                tracker.actives().iter().map(|gi| gi.id().to_string()).collect();
            let expired: BTreeSet<String> =
                tracker.expired().iter().map(|gi| gi.id().to_string()).collect();
            let all: BTreeSet<String> = infos.iter().map(|gi| gi.id().to_string()).collect();

            prop_assert!(actives.is_disjoint(&expired));
            prop_assert_eq!(actives.union(&expired).cloned().collect::<BTreeSet<_>>(), all);
            for gi in tracker.expired() {
                prop_assert!(gi.is_expired_at(now));
            }
            for gi in tracker.actives() {
                prop_assert!(!gi.is_expired_at(now));
            }
        }
    }
}
