use anyhow::anyhow;
use ixa_contagion::runner::run_with_args;

fn main() -> anyhow::Result<()> {
    let context = run_with_args().map_err(|e| anyhow!("{e}"))?;
    let statistics = context.statistics();
    println!(
        "{} infections={} recoveries={} deaths={}",
        context.summary(),
        statistics.total_infections(),
        statistics.total_recoveries(),
        statistics.total_deaths()
    );
    Ok(())
}
