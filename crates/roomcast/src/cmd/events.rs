use roomcast_events::{EventDescriptor, Taxonomy};
use serde::Serialize;

use crate::cmd::EventsArgs;
use crate::exit::{event_error, CliResult, SUCCESS};
use crate::output::{direction, payload_signature, print_json, table, OutputFormat};

#[derive(Serialize)]
struct EventsOutput<'a> {
    definitions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
    count: usize,
    events: Vec<&'a EventDescriptor>,
}

pub fn run(args: EventsArgs, format: OutputFormat) -> CliResult<i32> {
    let taxonomy = Taxonomy::from_path(&args.definitions)
        .map_err(|err| event_error("failed to build taxonomy", err))?;

    let events: Vec<&EventDescriptor> = match &args.namespace {
        Some(path) => {
            let namespace = taxonomy
                .namespace(path)
                .map_err(|err| event_error("namespace lookup failed", err))?;
            taxonomy
                .events()
                .filter(|event| namespace.contains_event(event))
                .collect()
        }
        None => taxonomy.events().collect(),
    };

    let out = EventsOutput {
        definitions: args.definitions.display().to_string(),
        namespace: args.namespace.as_deref(),
        count: events.len(),
        events,
    };
    print_events(&out, format);
    Ok(SUCCESS)
}

fn print_events(out: &EventsOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut t = table(vec!["PATH", "WIRE NAME", "DIRECTION", "PAYLOAD", "DESCRIPTION"]);
            for event in &out.events {
                t.add_row(vec![
                    event.path().to_string(),
                    event.name().to_string(),
                    direction(event).to_string(),
                    payload_signature(event.payload()),
                    event.description().unwrap_or_default().to_string(),
                ]);
            }
            println!("{t}");
        }
        OutputFormat::Pretty => {
            for event in &out.events {
                println!(
                    "{} [{}] ({})",
                    event.name(),
                    direction(event),
                    payload_signature(event.payload())
                );
            }
            println!("{} event(s)", out.count);
        }
    }
}
