use clap::Parser;
use std::io;

use gzcors::args::Args;
use gzcors::logging::setup_logging;
use gzcors::server::start_server;

fn main() -> io::Result<()> {
    let args = Args::parse();
    setup_logging();
    start_server(args.into_config()?)
}
