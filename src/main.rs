use tsh::Shell;

fn main() {
    env_logger::init();
    let mut shell = Shell::default();
    if let Err(e) = shell.repl() {
        eprintln!("tsh: {}", e);
        std::process::exit(1);
    }
}
