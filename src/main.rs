use std::env;

use anyhow::bail;
use scribble::Config;

fn main() -> anyhow::Result<()> {
    let config = match &*env::args_os().skip(1).collect::<Vec<_>>() {
        [] => Config::default(),
        [path] => Config::load(path)?,
        _ => {
            bail!("usage: {} [config.toml]", env!("CARGO_PKG_NAME"));
        }
    };

    scribble::run(config)
}
