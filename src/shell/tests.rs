use std::io;

use crate::fs::{README_CONTENT, README_NAME};

use super::*;

struct Session {
    vfs: Vfs,
    shell: Shell,
}

impl Session {
    fn new() -> Self {
        let vfs = Vfs::new();
        let shell = Shell::new(&vfs);
        Self { vfs, shell }
    }

    /// Runs a line and returns its output.
    fn run(&mut self, line: &str) -> String {
        let mut out = Vec::new();
        let flow = self.shell.execute(&mut self.vfs, line, &mut out).unwrap();
        assert_eq!(flow, Flow::Continue);
        String::from_utf8(out).unwrap()
    }
}

fn errno_message(err: fs::Error) -> String {
    io::Error::from_raw_os_error(err.into()).to_string()
}

#[test]
fn test_ls_root() {
    let mut session = Session::new();
    session.run("mkdir docs");
    let out = session.run("ls");
    assert_eq!(out, format!("{}\ndocs/\n", README_NAME));
}

#[test]
fn test_cat_readme() {
    let mut session = Session::new();
    let out = session.run(&format!("cat /{}", README_NAME));
    assert_eq!(out.as_bytes(), README_CONTENT);
}

#[test]
fn test_echo_and_cat() {
    let mut session = Session::new();
    assert_eq!(session.run("echo hello world"), "hello world\n");
    assert_eq!(session.run("echo hello world > greeting.txt"), "");
    assert_eq!(session.run("cat greeting.txt"), "hello world\n");

    let id = session.vfs.resolve("greeting.txt", session.vfs.root()).unwrap();
    assert_eq!(session.vfs.node_size(id).unwrap(), 12);
}

#[test]
fn test_touch() {
    let mut session = Session::new();
    session.run("echo keep > a.txt");
    session.run("touch a.txt");
    assert_eq!(session.run("cat a.txt"), "keep\n");

    session.run("touch b.txt");
    assert_eq!(session.run("cat b.txt"), "");
    assert_eq!(session.run("stat b.txt"), "  Path: /b.txt\n  Type: file\n  Size: 0\n  Slot: 3\n");
}

#[test]
fn test_cd_and_pwd() {
    let mut session = Session::new();
    session.run("mkdir docs");
    session.run("mkdir docs/notes");
    session.run("cd docs/notes");
    assert_eq!(session.run("pwd"), "/docs/notes\n");

    session.run("cd ..");
    assert_eq!(session.run("pwd"), "/docs\n");

    session.run("cd");
    assert_eq!(session.run("pwd"), "/\n");
}

#[test]
fn test_cd_into_file() {
    let mut session = Session::new();
    let out = session.run(&format!("cd {}", README_NAME));
    assert_eq!(
        out,
        format!(
            "cd: {}: {}\n",
            README_NAME,
            errno_message(fs::Error::NotADirectory)
        )
    );
    assert_eq!(session.run("pwd"), "/\n");
}

#[test]
fn test_rmdir_not_empty() {
    let mut session = Session::new();
    session.run("mkdir a");
    session.run("touch a/b.txt");

    let out = session.run("rmdir a");
    assert_eq!(
        out,
        format!("rmdir: a: {}\n", errno_message(fs::Error::NotEmpty))
    );

    session.run("rm a/b.txt");
    assert_eq!(session.run("rmdir a"), "");
    assert_eq!(session.run("ls"), format!("{}\n", README_NAME));
}

#[test]
fn test_removed_cwd_falls_back_to_root() {
    let mut session = Session::new();
    session.run("mkdir a");
    session.run("cd a");
    assert_eq!(session.run("rmdir ../a"), "");
    assert_eq!(session.run("pwd"), "/\n");
    assert_eq!(session.shell.cwd(), session.vfs.root());
}

#[test]
fn test_echo_error_names_target() {
    let mut session = Session::new();
    let out = session.run("echo text > missing/file.txt");
    assert_eq!(
        out,
        format!(
            "echo: missing/file.txt: {}\n",
            errno_message(fs::Error::NotFound)
        )
    );
}

#[test]
fn test_stat_dir() {
    let mut session = Session::new();
    session.run("mkdir docs");
    session.run("touch docs/a");
    assert_eq!(
        session.run("stat /docs"),
        "  Path: /docs\n  Type: directory\n  Entries: 1\n  Slot: 2\n"
    );
}

#[test]
fn test_df() {
    let mut session = Session::new();
    assert_eq!(session.run("df"), "Nodes: 2/32 used, 30 free\n");
    session.run("mkdir docs");
    assert_eq!(session.run("df"), "Nodes: 3/32 used, 29 free\n");
}

#[test]
fn test_missing_operand() {
    let mut session = Session::new();
    for command in ["cat", "touch", "rm", "stat", "mkdir", "rmdir"] {
        assert_eq!(
            session.run(command),
            format!("{}: missing operand\n", command)
        );
    }
}

#[test]
fn test_unknown_command() {
    let mut session = Session::new();
    assert_eq!(session.run("format c:"), "format: command not found\n");
    assert_eq!(session.run("   "), "");
}

#[test]
fn test_exit() {
    let mut session = Session::new();
    let mut out = Vec::new();
    let flow = session
        .shell
        .execute(&mut session.vfs, "exit", &mut out)
        .unwrap();
    assert_eq!(flow, Flow::Exit);
}

#[test]
fn test_help_lists_commands() {
    let mut session = Session::new();
    let out = session.run("help");
    for command in ["ls", "cat", "touch", "rm", "echo", "stat", "df", "pwd", "cd", "mkdir", "rmdir"] {
        assert!(out.contains(command), "help must mention {}", command);
    }
}

#[test]
fn test_echo_single_redirect() {
    let mut session = Session::new();
    let out = session.run("echo x > b > c");
    assert_eq!(
        out,
        format!("echo: b > c: {}\n", errno_message(fs::Error::InvalidName))
    );
    assert_eq!(session.run("ls"), format!("{}\n", README_NAME));
}

#[test]
fn test_about() {
    let mut session = Session::new();
    assert_eq!(
        session.run("about"),
        format!("ramvfs shell {}\n", env!("CARGO_PKG_VERSION"))
    );
    assert!(session.run("help").contains("about"));
}
