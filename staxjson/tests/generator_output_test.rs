// SPDX-License-Identifier: Apache-2.0

//! Generated text, compact and pretty, and parse/generate round trips.

use staxjson::{Event, GenError, JsonGenerator, JsonNumber, JsonParser};
use test_log::test;

fn build(
    pretty: bool,
    fill: impl FnOnce(&mut JsonGenerator<&mut Vec<u8>>) -> Result<(), GenError>,
) -> String {
    let mut out = Vec::new();
    let mut gen = if pretty {
        JsonGenerator::pretty(&mut out)
    } else {
        JsonGenerator::new(&mut out)
    };
    fill(&mut gen).unwrap();
    gen.close().unwrap();
    drop(gen);
    String::from_utf8(out).unwrap()
}

#[test]
fn test_compact_document() {
    let text = build(false, |gen| {
        gen.write_start_object()?
            .write_long_member("id", 1234567890123)?
            .write_key("tags")?
            .write_start_array()?
            .write_string("a")?
            .write_string("b")?
            .write_end()?
            .write_bool_member("active", false)?
            .write_end()?;
        Ok(())
    });
    assert_eq!(
        text,
        r#"{"id":1234567890123,"tags":["a","b"],"active":false}"#
    );
}

#[test]
fn test_pretty_document() {
    let text = build(true, |gen| {
        gen.write_start_object()?
            .write_string_member("name", "duke")?
            .write_key("scores")?
            .write_start_array()?
            .write_int(10)?
            .write_start_object()?
            .write_null_member("inner")?
            .write_end()?
            .write_end()?
            .write_end()?;
        Ok(())
    });
    let expected = concat!(
        "{\n",
        "    \"name\": \"duke\",\n",
        "    \"scores\": [\n",
        "        10,\n",
        "        {\n",
        "            \"inner\": null\n",
        "        }\n",
        "    ]\n",
        "}",
    );
    assert_eq!(text, expected);
}

#[test]
fn test_pretty_scalar_root_has_no_decoration() {
    assert_eq!(
        build(true, |gen| {
            gen.write_int(5)?;
            Ok(())
        }),
        "5"
    );
}

#[test]
fn test_pretty_empty_containers() {
    assert_eq!(
        build(true, |gen| {
            gen.write_start_array()?.write_end()?;
            Ok(())
        }),
        "[]"
    );
    assert_eq!(
        build(true, |gen| {
            gen.write_start_object()?.write_end()?;
            Ok(())
        }),
        "{}"
    );
}

#[test]
fn test_member_conveniences_cover_every_type() {
    let decimal = "0.125".parse::<staxjson::Decimal>().unwrap();
    let text = build(false, |gen| {
        gen.write_start_object()?
            .write_string_member("s", "v")?
            .write_int_member("i", -1)?
            .write_long_member("l", 1i64 << 40)?
            .write_f64_member("f", 2.5)?
            .write_decimal_member("d", &decimal)?
            .write_bool_member("b", true)?
            .write_null_member("n")?
            .write_end()?;
        Ok(())
    });
    assert_eq!(
        text,
        r#"{"s":"v","i":-1,"l":1099511627776,"f":2.5,"d":0.125,"b":true,"n":null}"#
    );
}

#[test]
fn test_escapes_in_keys_and_values() {
    let text = build(false, |gen| {
        gen.write_start_object()?
            .write_string_member("tab\there", "line\nbreak \"quoted\"")?
            .write_end()?;
        Ok(())
    });
    assert_eq!(
        text,
        "{\"tab\\there\":\"line\\nbreak \\\"quoted\\\"\"}"
    );
}

/// Replays every parser event into a generator, reading numbers through
/// the exact value model so no precision is invented or lost.
fn replay(input: &str) -> String {
    let mut parser = JsonParser::from_str(input);
    let mut out = Vec::new();
    let mut gen = JsonGenerator::new(&mut out);
    while parser.has_next().unwrap() {
        match parser.next_event().unwrap() {
            Event::StartObject => {
                gen.write_start_object().unwrap();
            }
            Event::StartArray => {
                gen.write_start_array().unwrap();
            }
            Event::KeyName => {
                gen.write_key(parser.get_string().unwrap()).unwrap();
            }
            Event::ValueString => {
                gen.write_string(parser.get_string().unwrap()).unwrap();
            }
            Event::ValueNumber => {
                gen.write_number(&parser.get_number().unwrap()).unwrap();
            }
            Event::ValueTrue => {
                gen.write_bool(true).unwrap();
            }
            Event::ValueFalse => {
                gen.write_bool(false).unwrap();
            }
            Event::ValueNull => {
                gen.write_null().unwrap();
            }
            Event::EndObject | Event::EndArray => {
                gen.write_end().unwrap();
            }
        }
    }
    gen.close().unwrap();
    drop(gen);
    String::from_utf8(out).unwrap()
}

#[test]
fn test_roundtrip_preserves_structure() {
    let input = r#"{"a":[1,2,{"b":null}],"c":"x","d":false}"#;
    assert_eq!(replay(input), input);
}

#[test]
fn test_roundtrip_preserves_decimal_text() {
    // Trailing zeros carry significance and must survive the trip.
    assert_eq!(replay("[1.500,2.0,3]"), "[1.500,2.0,3]");
}

#[test]
fn test_roundtrip_normalizes_exponent_case() {
    // Scientific forms re-render canonically, value unchanged.
    assert_eq!(replay("[1e10]"), "[1E+10]");
}

#[test]
fn test_generated_numbers_parse_back_equal() {
    let decimal = "2.50".parse::<staxjson::Decimal>().unwrap();
    let text = build(false, |gen| {
        gen.write_start_array()?
            .write_int(42)?
            .write_long(9007199254740993)?
            .write_decimal(&decimal)?
            .write_end()?;
        Ok(())
    });
    let mut parser = JsonParser::from_str(&text);
    parser.next_event().unwrap(); // StartArray
    parser.next_event().unwrap();
    assert_eq!(parser.get_number().unwrap(), JsonNumber::Int(42));
    parser.next_event().unwrap();
    // 2^53 + 1 survives, which an f64 detour would have rounded away.
    assert_eq!(
        parser.get_number().unwrap(),
        JsonNumber::Long(9007199254740993)
    );
    parser.next_event().unwrap();
    let reparsed = parser.get_number().unwrap();
    assert_eq!(
        reparsed,
        JsonNumber::Decimal("2.5".parse::<staxjson::Decimal>().unwrap())
    );
    assert!(!reparsed.is_integral());
}
