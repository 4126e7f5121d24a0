use vidthumb::{ERROR_CODE, ErrorReport, RawRequest, ThumbnailError, ThumbnailRequest};

#[test]
fn every_variant_reports_the_same_code() {
    let errors = [
        ThumbnailError::Storage("disk full".into()),
        ThumbnailError::Decode("no frame".into()),
        ThumbnailError::UnsupportedSource("rtsp".into()),
        ThumbnailError::Encode("bad pixels".into()),
        ThumbnailError::InvalidInput("negative".into()),
        ThumbnailError::Configuration("budget".into()),
        ThumbnailError::Worker("stopped".into()),
    ];
    for err in &errors {
        assert_eq!(err.code(), ERROR_CODE);
    }
}

#[test]
fn error_display() {
    assert_eq!(
        ThumbnailError::Decode("no frame at 2s".into()).to_string(),
        "decode error: no frame at 2s"
    );
    assert_eq!(
        ThumbnailError::Storage("read-only".into()).to_string(),
        "storage error: read-only"
    );
}

#[test]
fn io_errors_become_storage_errors() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: ThumbnailError = io.into();
    assert!(matches!(err, ThumbnailError::Storage(ref m) if m.contains("denied")));
}

#[test]
fn malformed_json_is_invalid_input() {
    let err = ThumbnailRequest::from_json("{not json").unwrap_err();
    assert!(matches!(err, ThumbnailError::InvalidInput(_)));

    let err = ThumbnailRequest::from_json(r#"{"timeStamp":"soon"}"#).unwrap_err();
    assert!(matches!(err, ThumbnailError::InvalidInput(_)));
}

#[test]
fn error_report_wire_format() {
    let report = ErrorReport::from(&ThumbnailError::UnsupportedSource("ftp://x".into()));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["code"], "CreateThumbnail_ERROR");
    assert_eq!(json["message"], "unsupported source: ftp://x");
}

#[test]
fn raw_request_try_from() {
    let raw = RawRequest {
        url: Some("https://example.com/a.mp4".into()),
        time_stamp: Some(-5.0),
        ..Default::default()
    };
    let err = ThumbnailRequest::try_from(raw).unwrap_err();
    assert!(matches!(err, ThumbnailError::InvalidInput(_)));
}

#[test]
fn float_timestamp_is_accepted() {
    let request =
        ThumbnailRequest::from_json(r#"{"url":"https://example.com/a.mp4","timeStamp":2.0}"#)
            .unwrap();
    assert_eq!(request.capture.as_secs(), 2);
    assert_eq!(request.capture.as_micros(), 2_000_000);
}
