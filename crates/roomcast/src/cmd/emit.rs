use std::sync::Arc;

use roomcast_events::Taxonomy;
use roomcast_hub::Connection;
use roomcast_transport::MemoryTransport;
use serde::Serialize;
use serde_json::Value;

use crate::cmd::EmitArgs;
use crate::exit::{event_error, hub_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_json, table, OutputFormat};

#[derive(Serialize)]
struct WriteOutput {
    connection: String,
    event: String,
    delivery: &'static str,
    name: String,
    args: Vec<Value>,
}

pub fn run(args: EmitArgs, format: OutputFormat) -> CliResult<i32> {
    let call_args = parse_args(&args.args)?;
    let taxonomy = Arc::new(
        Taxonomy::from_path(&args.definitions)
            .map_err(|err| event_error("failed to build taxonomy", err))?,
    );
    let event = taxonomy
        .event(&args.event)
        .map_err(|err| event_error("event lookup failed", err))?
        .clone();

    let transport = Arc::new(MemoryTransport::new(args.id.as_str()));
    let conn = Connection::new(transport.clone(), taxonomy);
    let (delivery, result) = if args.relay {
        ("relay", conn.relay(&event, &call_args))
    } else {
        ("send", conn.send(&event, &call_args))
    };
    result.map_err(|err| hub_error(&format!("{delivery} refused"), err))?;
    conn.close();

    let writes: Vec<WriteOutput> = transport
        .take_sent()
        .into_iter()
        .map(|sent| WriteOutput {
            connection: args.id.clone(),
            event: event.path().to_string(),
            delivery,
            name: sent.name,
            args: sent.args,
        })
        .collect();

    print_writes(&writes, format);
    Ok(SUCCESS)
}

fn parse_args(raw: &str) -> CliResult<Vec<Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(CliError::new(USAGE, "--args must be a JSON array")),
        Err(err) => Err(CliError::new(USAGE, format!("--args is not valid JSON: {err}"))),
    }
}

fn print_writes(writes: &[WriteOutput], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for write in writes {
                print_json(write);
            }
        }
        OutputFormat::Table => {
            let mut t = table(vec!["CONNECTION", "DELIVERY", "NAME", "ARGS"]);
            for write in writes {
                t.add_row(vec![
                    write.connection.clone(),
                    write.delivery.to_string(),
                    write.name.clone(),
                    Value::Array(write.args.clone()).to_string(),
                ]);
            }
            println!("{t}");
        }
        OutputFormat::Pretty => {
            for write in writes {
                println!(
                    "{} -> {} {}",
                    write.delivery,
                    write.name,
                    Value::Array(write.args.clone())
                );
            }
        }
    }
}
