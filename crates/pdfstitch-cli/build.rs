use clap::CommandFactory;

#[allow(dead_code)]
#[path = "src/cli.rs"]
mod cli;

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir =
        std::path::PathBuf::from(std::env::var_os("OUT_DIR").ok_or(std::io::ErrorKind::NotFound)?);
    let cmd = cli::Cli::command();

    // One page for the tool and one per subcommand, e.g. pdfstitch-info.1
    for sub in cmd.get_subcommands() {
        let name = format!("pdfstitch-{}", sub.get_name());
        render(sub.clone().name(name.clone()), &out_dir.join(format!("{name}.1")))?;
    }
    render(cmd, &out_dir.join("pdfstitch.1"))
}

fn render(cmd: clap::Command, path: &std::path::Path) -> std::io::Result<()> {
    let man = clap_mangen::Man::new(cmd);
    let mut buffer: Vec<u8> = Default::default();
    man.render(&mut buffer)?;
    std::fs::write(path, buffer)
}
