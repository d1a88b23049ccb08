//! Index column diff command
//!
//! Usage: postdiff index-column-diff --table <TABLE> --name <COLUMN>

use clap::Args;
use postdiff_core::errors::{ExError, ExErrorKind};
use postdiff_core::report::JsonStreamWriter;
use postdiff_engine::commands::{
    apply_stored_command, index_column_diff, DiffOptions, EngineCommand, EngineCommandResult,
    Response,
};
use postdiff_store::SqliteCatalog;
use serde_json::Value;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Args)]
pub struct IndexColumnDiffArgs {
    /// Lexicon table name
    #[arg(long)]
    pub table: String,

    /// Index column name
    #[arg(long)]
    pub name: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Write the report while it is built instead of buffering it
    #[arg(long, conflicts_with_all = ["pretty", "envelope"])]
    pub stream: bool,

    /// Wrap the output as [header, body]
    #[arg(long)]
    pub envelope: bool,

    /// Report tokens whose key is gone with a null value instead of failing
    #[arg(long)]
    pub mark_unresolved: bool,
}

pub fn execute(args: IndexColumnDiffArgs, db: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !db.exists() {
        return Err(ExError::new(ExErrorKind::NotFound)
            .with_op("open_store")
            .with_message(format!(
                "no store at {}; import a seed first",
                db.display()
            ))
            .into());
    }
    let catalog = SqliteCatalog::open(db)?;
    let options = if args.mark_unresolved {
        DiffOptions::mark_unresolved()
    } else {
        DiffOptions::default()
    };

    if args.stream {
        return stream_report(&catalog, &args, &options);
    }

    let command = EngineCommand::IndexColumnDiff {
        table: args.table.clone(),
        name: args.name.clone(),
        options,
    };

    if args.envelope {
        let response = Response::capture(|| {
            let EngineCommandResult::IndexColumnDiff(result) =
                apply_stored_command(command, &catalog)?;
            Ok(result.report)
        });
        print_json(&response.to_json(), args.pretty)?;
        if response.is_success() {
            return Ok(());
        }
        return Err(response.header.message.unwrap_or_default().into());
    }

    let EngineCommandResult::IndexColumnDiff(result) = apply_stored_command(command, &catalog)?;
    print_json(&result.report, args.pretty)
}

fn stream_report(
    catalog: &SqliteCatalog,
    args: &IndexColumnDiffArgs,
    options: &DiffOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let mut writer = JsonStreamWriter::new(BufWriter::new(stdout.lock()));
    let engine = catalog.diff_engine();

    let built = index_column_diff(
        catalog,
        &engine,
        &args.table,
        &args.name,
        options,
        &mut writer,
    );
    let finished = built.and_then(|_| writer.finish());
    match finished {
        Ok(mut out) => {
            writeln!(out)?;
            out.flush()?;
            Ok(())
        }
        Err(e) => {
            // Whatever was already streamed is not a report
            println!();
            Err(e.into())
        }
    }
}

fn print_json(value: &Value, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
