use super::*;

#[test]
fn running_guard_resets_on_drop() {
    let id = NodeId::new(0, 0);
    let r = ObserverRecord::new(
        id,
        ObserverTarget::Function(FunctionRef::new("onChange")),
        id,
        "text",
        None,
    );
    assert!(!r.is_running());
    {
        let _guard = r.enter();
        assert!(r.is_running());
    }
    assert!(!r.is_running());
}

#[test]
fn guard_resets_during_unwinding_paths() {
    let id = NodeId::new(0, 0);
    let r = ObserverRecord::new(id, ObserverTarget::Port(PortId(1)), id, "x", None);
    let outcome: Result<(), CallbackError> = (|| {
        let _guard = r.enter();
        Err(CallbackError::Runtime("boom".into()))
    })();
    assert!(outcome.is_err());
    assert!(!r.is_running());
}

#[test]
fn callback_error_messages() {
    assert_eq!(CallbackError::Runtime("bad".into()).to_string(), "bad");
    assert_eq!(CallbackError::Unwind.to_string(), "callback unwound");
}
