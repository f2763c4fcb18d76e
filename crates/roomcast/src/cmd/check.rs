use serde::Serialize;

use roomcast_schema::{check_file, structure_path_for, SchemaError, ValidatorConfig};

use crate::cmd::CheckArgs;
use crate::exit::{schema_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_json, table, OutputFormat};

#[derive(Serialize)]
struct CheckOutput {
    file: String,
    structure: String,
    strict: bool,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let structure = match (&args.structure, &args.structures_dir) {
        (Some(path), _) => path.clone(),
        (None, Some(dir)) => structure_path_for(&args.file, dir),
        (None, None) => {
            return Err(CliError::new(
                USAGE,
                "one of --structure or --structures-dir is required",
            ))
        }
    };
    let config = ValidatorConfig {
        strict_mode: args.strict,
        ..ValidatorConfig::default()
    };

    let mut out = CheckOutput {
        file: args.file.display().to_string(),
        structure: structure.display().to_string(),
        strict: args.strict,
        valid: true,
        path: None,
        reason: None,
    };

    let code = match check_file(&args.file, &structure, config) {
        Ok(()) => SUCCESS,
        Err(SchemaError::ValidationFailed(mismatch)) => {
            out.valid = false;
            out.reason = Some(mismatch.to_string());
            out.path = Some(mismatch.path);
            DATA_INVALID
        }
        Err(err) => return Err(schema_error("check failed", err)),
    };

    print_check(&out, format);
    Ok(code)
}

fn print_check(out: &CheckOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut t = table(vec!["FILE", "STRUCTURE", "VALID", "REASON"]);
            t.add_row(vec![
                out.file.clone(),
                out.structure.clone(),
                out.valid.to_string(),
                out.reason.clone().unwrap_or_default(),
            ]);
            println!("{t}");
        }
        OutputFormat::Pretty => match &out.reason {
            None => println!("{}: ok", out.file),
            Some(reason) => println!("{}: {reason}", out.file),
        },
    }
}
