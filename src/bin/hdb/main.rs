use anyhow::Result;
use clap::Parser;

mod cli;
mod cmd_create;
mod cmd_get;
mod cmd_put;
mod cmd_rehash;
mod cmd_stats;
mod util;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Create {
            path,
            key_len,
            bucket_bits,
            data_len,
        } => cmd_create::exec(path, key_len, bucket_bits, data_len),

        cli::Cmd::Put {
            path,
            key,
            value,
            on_duplicate,
        } => cmd_put::exec(path, key, value, on_duplicate),

        cli::Cmd::Get { path, key, all } => cmd_get::exec(path, key, all),

        cli::Cmd::Stats { path, json, dump } => cmd_stats::exec(path, json, dump),

        cli::Cmd::Rehash { path, bucket_bits } => cmd_rehash::exec(path, bucket_bits),
    }
}
