//! mysqlprobe CLI entry point.

use clap::Parser;

use mysqlprobe::{Args, execute, init_logging};

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    // Every outcome, including dial and read failures, is a successful run:
    // the report's `ok`/`mysql` fields carry the result.
    println!("{}", execute(&args));
}
