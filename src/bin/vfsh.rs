use std::{
    fs::File,
    io::{self, BufRead, BufReader, IsTerminal, Write},
};

use ramvfs::{
    fs::Vfs,
    shell::{Flow, Shell},
};

fn usage() -> ! {
    eprintln!("vfsh [script]");
    std::process::exit(1);
}

fn main() {
    env_logger::init();

    let mut script_path = None;
    let args = std::env::args().skip(1);
    for arg in args {
        if script_path.is_none() {
            script_path = Some(arg);
        } else {
            eprintln!("vfsh: too many arguments");
            usage();
        }
    }

    let (input, interactive): (Box<dyn BufRead>, bool) = match &script_path {
        Some(path) => match File::open(path) {
            Ok(file) => (Box::new(BufReader::new(file)), false),
            Err(e) => {
                eprintln!("vfsh: failed to open script {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => {
            let stdin = io::stdin();
            let interactive = stdin.is_terminal();
            (Box::new(stdin.lock()), interactive)
        }
    };

    if let Err(e) = run(input, interactive) {
        eprintln!("vfsh: {}", e);
        std::process::exit(1);
    }
}

fn run(mut input: Box<dyn BufRead>, interactive: bool) -> io::Result<()> {
    let mut vfs = Vfs::new();
    let mut shell = Shell::new(&vfs);
    let mut stdout = io::stdout().lock();

    if interactive {
        write!(stdout, "$ ")?;
        stdout.flush()?;
    }

    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim_end_matches(['\n', '\r']);
                if shell.execute(&mut vfs, line, &mut stdout)? == Flow::Exit {
                    break;
                }
            }
            Err(_) => {
                log::debug!("rejected line {}: {:?}", line_no, buf);
                eprintln!("vfsh: invalid UTF-8 on line {}", line_no);
            }
        }

        if interactive {
            write!(stdout, "$ ")?;
            stdout.flush()?;
        }
    }

    stdout.flush()
}
