// SPDX-License-Identifier: Apache-2.0

//! Lazy view traversal layered over the pull parser.

use staxjson::{Event, JsonParser, ParseError};
use test_log::test;

#[test]
fn test_value_stream_over_reader_input() {
    let data = br#"{"items": [1, 2, 3], "done": true}"#;
    let mut parser = JsonParser::from_reader(&data[..]);
    let mut stream = parser.value_stream();
    let mut numbers = Vec::new();
    let mut saw_done = false;
    while let Some(event) = stream.next_event().unwrap() {
        match event {
            Event::ValueNumber => numbers.push(stream.get_int().unwrap()),
            Event::ValueTrue => saw_done = true,
            _ => {}
        }
    }
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(saw_done);
    assert_eq!(stream.next_event().unwrap(), None);
}

#[test]
fn test_array_stream_selective_extraction() {
    // Pull just the ids out of an array of records, skipping the rest of
    // each record wholesale.
    let text = r#"[{"id": 1, "blob": [9, 9]}, {"id": 2, "blob": [8]}]"#;
    let mut parser = JsonParser::from_str(text);
    parser.next_event().unwrap(); // StartArray
    let mut ids = Vec::new();
    let mut stream = parser.array_stream().unwrap();
    let mut key_is_id = false;
    while let Some(event) = stream.next_event().unwrap() {
        match event {
            Event::KeyName => key_is_id = stream.get_string().unwrap() == "id",
            Event::ValueNumber if key_is_id => {
                ids.push(stream.get_long().unwrap());
                key_is_id = false;
            }
            _ => {}
        }
    }
    assert_eq!(ids, vec![1, 2]);
    assert!(!parser.has_next().unwrap());
}

#[test]
fn test_object_stream_then_manual_continue() {
    let mut parser = JsonParser::from_str(r#"[{"a": 1}, "next"]"#);
    parser.next_event().unwrap(); // StartArray
    parser.next_event().unwrap(); // StartObject
    {
        let mut stream = parser.object_stream().unwrap();
        assert_eq!(stream.next_event().unwrap(), Some(Event::KeyName));
        assert_eq!(stream.next_event().unwrap(), Some(Event::ValueNumber));
        assert_eq!(stream.next_event().unwrap(), None);
        assert_eq!(stream.next_event().unwrap(), None);
    }
    assert_eq!(parser.current_event(), Some(Event::EndObject));
    assert_eq!(parser.next_event().unwrap(), Event::ValueString);
    assert_eq!(parser.get_string().unwrap(), "next");
}

#[test]
fn test_view_reports_parse_errors() {
    let mut parser = JsonParser::from_str("[1, @]");
    parser.next_event().unwrap();
    let mut stream = parser.array_stream().unwrap();
    assert_eq!(stream.next_event().unwrap(), Some(Event::ValueNumber));
    assert!(matches!(
        stream.next_event(),
        Err(ParseError::Lexical { .. })
    ));
}

#[test]
fn test_container_views_gate_on_position() {
    let mut parser = JsonParser::from_str("[{}]");
    assert!(parser.array_stream().is_err()); // before any event
    parser.next_event().unwrap(); // StartArray
    assert!(parser.object_stream().is_err());
    parser.next_event().unwrap(); // StartObject
    assert!(parser.array_stream().is_err());
    assert!(parser.object_stream().is_ok());
}

#[test]
fn test_value_stream_from_midway() {
    // A value stream picks up wherever the parser is.
    let mut parser = JsonParser::from_str("[1, 2, 3]");
    parser.next_event().unwrap();
    parser.next_event().unwrap(); // 1
    let mut stream = parser.value_stream();
    let mut rest = Vec::new();
    while let Some(event) = stream.next_event().unwrap() {
        rest.push(event);
    }
    assert_eq!(
        rest,
        vec![Event::ValueNumber, Event::ValueNumber, Event::EndArray]
    );
}
