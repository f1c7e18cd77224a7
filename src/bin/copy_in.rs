use ext2tools::{error::die, ops, Session};
use std::env;
use std::process::exit;

fn main() {
    let bin = "copy-in";
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: {bin} <image> <native-path> <image-path>");
        exit(1);
    }
    run(&args[1], &args[2], &args[3]).unwrap_or_else(|e| die(bin, &e));
}

fn run(image: &str, native_path: &str, image_path: &str) -> Result<(), ext2tools::Error> {
    let mut session = Session::open(image)?;
    ops::copy_in(&mut session, native_path, image_path)?;
    session.flush()?;
    Ok(())
}
