// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("forager")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Forager Contributors")
        .about("AUR helper with local install tracking and update detection")
        .arg(
            Arg::new("install")
                .short('i')
                .long("install")
                .value_name("PKG")
                .help("Install a package from the AUR"),
        )
        .arg(
            Arg::new("remove")
                .short('r')
                .long("remove")
                .value_name("PKG")
                .help("Remove an installed package"),
        )
        .arg(
            Arg::new("search")
                .short('s')
                .long("search")
                .value_name("QUERY")
                .help("Search the AUR by substring"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("List tracked packages"),
        )
        .arg(
            Arg::new("upgrade")
                .short('u')
                .long("upgrade")
                .action(ArgAction::SetTrue)
                .help("Upgrade all tracked packages (runs a system upgrade first)"),
        )
        .arg(
            Arg::new("names_only")
                .short('n')
                .long("names-only")
                .action(ArgAction::SetTrue)
                .help("Print matching package names only (with --search)"),
        )
        .arg(
            Arg::new("no_sysupgrade")
                .long("no-sysupgrade")
                .action(ArgAction::SetTrue)
                .help("Skip the system upgrade step (with --upgrade)"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer)
        .expect("Failed to render man page");

    let man_path = man_dir.join("forager.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
