use ext2tools::{error::die, ops, Session};
use std::env;
use std::process::exit;

fn main() {
    let bin = "hard-link";
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: {bin} <image> <target> <new-path>");
        exit(1);
    }
    run(&args[1], &args[2], &args[3]).unwrap_or_else(|e| die(bin, &e));
}

fn run(image: &str, target: &str, new_path: &str) -> Result<(), ext2tools::Error> {
    let mut session = Session::open(image)?;
    ops::hard_link(&mut session, target, new_path)?;
    session.flush()?;
    Ok(())
}
