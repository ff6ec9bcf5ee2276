use recordsync_model::ValidationError;
use recordsync_rpc::{RpcError, TransportError};

#[test]
fn validation_is_field_scoped() {
    let err = RpcError::Validation {
        fields: vec![ValidationError::new("title", "already taken")],
    };
    assert!(err.is_field_scoped());
    assert_eq!(err.field_errors().len(), 1);
    assert!(err.transport().is_none());
    assert_eq!(err.to_string(), "server rejected 1 field(s)");
}

#[test]
fn transport_is_not_field_scoped() {
    let err: RpcError = TransportError::Timeout.into();
    assert!(!err.is_field_scoped());
    assert!(err.field_errors().is_empty());
    assert_eq!(err.transport(), Some(&TransportError::Timeout));
    assert_eq!(err.to_string(), "request timed out");
}

#[test]
fn transport_messages() {
    assert_eq!(
        TransportError::Server { status: 500, message: "boom".into() }.to_string(),
        "server error (500): boom"
    );
    assert_eq!(
        TransportError::Conflict("stale record".into()).to_string(),
        "conflict: stale record"
    );
    assert_eq!(
        TransportError::Network("refused".into()).to_string(),
        "network error: refused"
    );
}
