use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cfg = keyrium::config::Config::parse();
    if cfg.wipe {
        return keyrium::wipe(cfg);
    }
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(keyrium::run(cfg))
}
