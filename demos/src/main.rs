// Tour of the pull parser and the push generator: walk a document's
// events, then re-emit it pretty-printed.

use staxjson::{Event, JsonGenerator, JsonParser};
use std::error::Error;
use std::io;

const SAMPLE: &str = r#"{"library": "staxjson", "versions": [1, 2.50, 1e3], "stable": true, "notes": null}"#;

fn main() -> Result<(), Box<dyn Error>> {
    println!("Input: {SAMPLE}");
    println!();

    let mut parser = JsonParser::from_str(SAMPLE);
    while parser.has_next()? {
        match parser.next_event()? {
            Event::StartObject => println!("StartObject"),
            Event::EndObject => println!("EndObject"),
            Event::StartArray => println!("StartArray"),
            Event::EndArray => println!("EndArray"),
            Event::KeyName => println!("Key: {:?}", parser.get_string()?),
            Event::ValueString => println!("String: {:?}", parser.get_string()?),
            Event::ValueNumber => {
                // The literal text and the typed view of the same value.
                println!(
                    "Number: {} (parsed as {:?})",
                    parser.get_string()?,
                    parser.get_number()?
                );
            }
            Event::ValueTrue => println!("Bool: true"),
            Event::ValueFalse => println!("Bool: false"),
            Event::ValueNull => println!("Null"),
        }
    }
    parser.close();

    println!();
    println!("Pretty-printed:");
    let mut parser = JsonParser::from_str(SAMPLE);
    let stdout = io::stdout();
    let mut gen = JsonGenerator::pretty(stdout.lock());
    while parser.has_next()? {
        match parser.next_event()? {
            Event::StartObject => {
                gen.write_start_object()?;
            }
            Event::StartArray => {
                gen.write_start_array()?;
            }
            Event::EndObject | Event::EndArray => {
                gen.write_end()?;
            }
            Event::KeyName => {
                gen.write_key(parser.get_string()?)?;
            }
            Event::ValueString => {
                gen.write_string(parser.get_string()?)?;
            }
            Event::ValueNumber => {
                gen.write_number(&parser.get_number()?)?;
            }
            Event::ValueTrue => {
                gen.write_bool(true)?;
            }
            Event::ValueFalse => {
                gen.write_bool(false)?;
            }
            Event::ValueNull => {
                gen.write_null()?;
            }
        }
    }
    gen.close()?;
    println!();
    Ok(())
}
