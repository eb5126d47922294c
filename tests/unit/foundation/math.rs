use super::*;

#[test]
fn fnv_hash_is_stable_across_write_granularity() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"spacing");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"spa");
    b.write_bytes(b"cing");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn fnv_distinguishes_float_payloads() {
    let mut a = Fnv1a64::new_default();
    a.write_f64(5.0);
    let mut b = Fnv1a64::new_default();
    b.write_f64(5.25);
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn nearly_equal_respects_tolerance() {
    assert!(nearly_equal(10.0, 10.2, 0.25));
    assert!(nearly_equal(10.0, 10.25, 0.25));
    assert!(!nearly_equal(10.0, 10.3, 0.25));
}
