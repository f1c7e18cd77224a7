use ext2tools::{error::die, ops, Session};
use std::env;
use std::process::exit;

fn main() {
    let bin = "make-directory";
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {bin} <image> <path>");
        exit(1);
    }
    run(&args[1], &args[2]).unwrap_or_else(|e| die(bin, &e));
}

fn run(image: &str, path: &str) -> Result<(), ext2tools::Error> {
    let mut session = Session::open(image)?;
    ops::make_directory(&mut session, path)?;
    session.flush()?;
    Ok(())
}
