//! End-to-end unlock scenarios and constraint boundaries.

use prompt_cloak::codec::{pack, MARKER_END, MARKER_START};
use prompt_cloak::limits::EARTH_RADIUS_KM;
use prompt_cloak::{
    decode, encode, escape_invisible, unescape_invisible, AccessVerifier, DecodeError,
    DecodeOutcome, Denial, Disclosure, GeoPoint, Observation, PayloadBuilder, Reward, UnlockError,
    UnlockRequest, Unlocker,
};

const NOW: i64 = 1_736_000_000_000;
const MINUTE_MS: i64 = 60_000;

#[test]
fn test_claim_code_scenario() {
    let verifier = AccessVerifier::sha256();
    let payload = PayloadBuilder::new(&verifier, "Hello")
        .access_code("X1")
        .unwrap()
        .reward(Reward::text("prize"))
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(payload.access_digests(), &[verifier.digest("X1").unwrap()]);

    let carrier = encode("Hello World", &payload).unwrap();
    let unlocker = Unlocker::default();

    let locked = unlocker.unlock(&UnlockRequest::new(&carrier, NOW)).unwrap();
    assert!(locked.is_locked());
    assert_eq!(locked.original(), Some("Hello"));

    let open = unlocker
        .unlock(&UnlockRequest::new(&carrier, NOW).claim_code("X1"))
        .unwrap();
    assert_eq!(
        open,
        Disclosure::Unlocked {
            original: "Hello".to_string(),
            reward: Some(Reward::text("prize")),
            legacy_password: None,
        }
    );

    let denied = unlocker.unlock(&UnlockRequest::new(&carrier, NOW).claim_code("wrong"));
    assert_eq!(denied, Err(UnlockError::AccessDenied));
}

#[test]
fn test_empty_digest_set_never_locks() {
    let verifier = AccessVerifier::sha256();
    let payload = PayloadBuilder::new(&verifier, "Hello")
        .access_codes(Vec::<String>::new())
        .unwrap()
        .reward(Reward::text("prize"))
        .unwrap()
        .build()
        .unwrap();
    assert!(!payload.is_locked());

    let carrier = encode("Hello", &payload).unwrap();
    let disclosure = Unlocker::default().unlock(&UnlockRequest::new(&carrier, NOW)).unwrap();
    assert!(disclosure.is_unlocked());
}

#[test]
fn test_time_window_boundary() {
    let verifier = AccessVerifier::sha256();
    let payload = PayloadBuilder::new(&verifier, "timed")
        .time_constraint(NOW)
        .build()
        .unwrap();
    let carrier = encode("timed", &payload).unwrap();
    let unlocker = Unlocker::default();

    let exact = unlocker
        .unlock(&UnlockRequest::new(&carrier, NOW + 60 * MINUTE_MS))
        .unwrap();
    assert!(exact.is_unlocked());

    // 60.01 minutes
    let late = unlocker
        .unlock(&UnlockRequest::new(&carrier, NOW + 60 * MINUTE_MS + 600))
        .unwrap();
    assert!(matches!(
        late,
        Disclosure::Restricted { denial: Denial::Temporal { .. }, .. }
    ));
}

#[test]
fn test_geo_radius_boundary() {
    let verifier = AccessVerifier::sha256();
    let origin = GeoPoint::new(0.0, 0.0);
    let payload = PayloadBuilder::new(&verifier, "placed")
        .geo_constraint(origin)
        .build()
        .unwrap();
    let carrier = encode("placed", &payload).unwrap();
    let unlocker = Unlocker::default();
    let north = |km: f64| Observation::new((km / EARTH_RADIUS_KM).to_degrees(), 0.0, 1.0);

    for (km, granted) in [(0.0, true), (4.9999, true), (5.0001, false)] {
        let disclosure = unlocker
            .unlock(&UnlockRequest::new(&carrier, NOW).location(north(km)))
            .unwrap();
        assert_eq!(disclosure.is_unlocked(), granted, "failed for {} km", km);
    }
}

#[test]
fn test_escaped_transport_roundtrip() {
    let verifier = AccessVerifier::sha256();
    let payload = PayloadBuilder::new(&verifier, "Hi").build().unwrap();
    let carrier = encode("Hi", &payload).unwrap();

    let escaped = escape_invisible(&carrier);
    assert!(escaped.is_ascii());
    assert!(decode(&escaped).is_none());
    assert_eq!(decode(&unescape_invisible(&escaped)).into_payload(), Some(payload));
}

#[test]
fn test_non_finite_location_never_unlocks() {
    let verifier = AccessVerifier::sha256();
    let payload = PayloadBuilder::new(&verifier, "placed")
        .geo_constraint(GeoPoint::new(0.0, 0.0))
        .reward(Reward::text("prize"))
        .unwrap()
        .build()
        .unwrap();
    let carrier = encode("placed", &payload).unwrap();

    let disclosure = Unlocker::default()
        .unlock(&UnlockRequest::new(&carrier, NOW).location(Observation::new(f64::NAN, f64::NAN, 0.0)))
        .unwrap();
    assert!(matches!(
        disclosure,
        Disclosure::Restricted { denial: Denial::SignalLost, .. }
    ));
}

#[test]
fn test_antipodal_observer_never_unlocks() {
    let verifier = AccessVerifier::sha256();
    let payload = PayloadBuilder::new(&verifier, "placed")
        .geo_constraint(GeoPoint::new(-85.75, 0.0))
        .build()
        .unwrap();
    let carrier = encode("placed", &payload).unwrap();

    let disclosure = Unlocker::default()
        .unlock(&UnlockRequest::new(&carrier, NOW).location(Observation::new(85.75, 180.0, 0.0)))
        .unwrap();
    assert!(matches!(
        disclosure,
        Disclosure::Restricted { denial: Denial::Spatial { .. }, .. }
    ));
}

#[test]
fn test_expanding_stream_is_corrupt() {
    let codes: Vec<u16> = std::iter::once(97)
        .chain((0..20_000u16).map(|i| 256 + i))
        .collect();
    let carrier = format!("v{}{}{}", MARKER_START, pack(&codes), MARKER_END);

    assert!(matches!(
        decode(&carrier),
        DecodeOutcome::Corrupt(DecodeError::OutputTooLarge { .. })
    ));
}
