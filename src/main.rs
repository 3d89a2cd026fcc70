use ftpaccounts::run;

fn main() -> anyhow::Result<()> {
    // One connection, one statement at a time: no need for worker threads.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run())
}
