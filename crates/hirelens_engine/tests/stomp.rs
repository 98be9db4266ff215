use hirelens_engine::{decode_frames, FrameError, StompFrame};
use pretty_assertions::assert_eq;

#[test]
fn subscribe_frame_encodes_with_trailing_nul() {
    let encoded = StompFrame::subscribe("sub-0", "/dataUpdate/job-1").encode();
    assert_eq!(
        encoded,
        "SUBSCRIBE\nid:sub-0\ndestination:/dataUpdate/job-1\nack:auto\n\n\0"
    );
}

#[test]
fn connect_headers_are_not_escaped() {
    let encoded = StompFrame::connect("localhost").encode();
    assert!(encoded.starts_with("CONNECT\naccept-version:1.2,1.1,1.0\nhost:localhost\n"));
    assert!(encoded.ends_with("\n\n\0"));
}

#[test]
fn message_frame_decodes_headers_and_body() {
    let raw = "MESSAGE\ndestination:/dataUpdate/job-1\nsubscription:sub-0\nmessage-id:1\n\n{\"type\":\"STATUS\"}\0";
    let frames = decode_frames(raw).expect("decoded");
    assert_eq!(frames.len(), 1);
    let frame = &frames[0];
    assert_eq!(frame.command, "MESSAGE");
    assert_eq!(frame.get_header("destination"), Some("/dataUpdate/job-1"));
    assert_eq!(frame.get_header("message-id"), Some("1"));
    assert_eq!(frame.body, "{\"type\":\"STATUS\"}");
}

#[test]
fn heartbeats_and_multiple_frames_in_one_message() {
    let raw = "\n\nCONNECTED\nversion:1.2\n\n\0\nMESSAGE\ndestination:/a\n\nbody\0\n";
    let frames = decode_frames(raw).expect("decoded");
    let commands: Vec<_> = frames.iter().map(|f| f.command.as_str()).collect();
    assert_eq!(commands, vec!["CONNECTED", "MESSAGE"]);
    assert_eq!(frames[1].body, "body");

    assert!(decode_frames("\n").expect("heartbeat").is_empty());
}

#[test]
fn header_values_are_escaped_and_unescaped() {
    let frame = StompFrame::new("SEND")
        .header("destination", "/queue/a:b")
        .header("note", "line1\nline2\\end")
        .with_body("x");
    let encoded = frame.encode();
    assert!(encoded.contains("destination:/queue/a\\cb\n"));
    assert!(encoded.contains("note:line1\\nline2\\\\end\n"));

    let decoded = decode_frames(&encoded).expect("decoded");
    assert_eq!(decoded, vec![frame]);
}

#[test]
fn repeated_header_keeps_first_value() {
    let frames = decode_frames("MESSAGE\nfoo:first\nfoo:second\n\n\0").expect("decoded");
    assert_eq!(frames[0].get_header("foo"), Some("first"));
}

#[test]
fn crlf_line_endings_are_accepted() {
    let frames = decode_frames("ERROR\r\nmessage:bad destination\r\n\r\ndetails\0").expect("decoded");
    assert_eq!(frames[0].command, "ERROR");
    assert_eq!(frames[0].get_header("message"), Some("bad destination"));
    assert_eq!(frames[0].body, "details");
}

#[test]
fn malformed_frames_are_rejected() {
    assert_eq!(
        decode_frames("MESSAGE\nno-colon-here\n\n\0"),
        Err(FrameError::MalformedHeader("no-colon-here".into()))
    );
    assert_eq!(
        decode_frames("MESSAGE\nbad:esc\\x\n\n\0"),
        Err(FrameError::MalformedHeader("esc\\x".into()))
    );
}
